//! Handler-boundary error type.
//!
//! Every collaborator failure ends up here and becomes exactly one complete
//! HTML response; the cause is logged and echoed in the page body.

use askama::Template;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use db::DbError;

use crate::views::ErrorTemplate;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Pool, statement or name failure (500).
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// Template rendering failed (500).
    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    /// Form body could not be read or a field could not be used (500).
    #[error("invalid form: {0}")]
    InvalidForm(String),

    /// No route matched (404).
    #[error("no such route: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Render(_) | Self::InvalidForm(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::InvalidForm(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", message);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", message);
        }

        let page = ErrorTemplate {
            title: format!("Error {}", status.as_u16()),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message: message.clone(),
        }
        .render();

        error_response(status, message, page)
    }
}

/// HTML error page, or the bare message as plain text if the page did not render.
fn error_response(status: StatusCode, message: String, page: askama::Result<String>) -> Response {
    match page {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("error page failed to render: {}", e);
            (status, message).into_response()
        }
    }
}
