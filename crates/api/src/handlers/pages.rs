//! Wiki page handlers: index, render, create, save, delete.
//!
//! Each handler runs acquire → statement → release inside one repository
//! call, then renders or redirects.  Any failure is returned as an
//! [`ApiError`] and becomes a single complete error response.

use axum::{
    extract::{rejection::FormRejection, Form, Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use db::repository::pages as page_repo;

use super::AppState;
use crate::error::ApiError;
use crate::markup;
use crate::views::{self, wiki_path, IndexTemplate, PageLink, PageTemplate};

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(rename = "newPage", default)]
    pub new_page: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub id: String,
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidForm(format!("invalid page id '{raw}'")))
}

/// GET / - list every page
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let names = page_repo::list_names(&state.pool).await?;

    views::render(IndexTemplate {
        title: "Wiki home".to_string(),
        pages: names.into_iter().map(PageLink::new).collect(),
    })
}

/// GET /wiki/{page} - render a page, or an editable blank if it does not exist
pub async fn render(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Html<String>, ApiError> {
    let source = page_repo::fetch(&state.pool, &page).await?;
    let content = markup::to_html(&source.content);

    views::render(PageTemplate {
        title: page,
        id: source.id,
        new_page: source.is_new(),
        raw_content: source.content,
        content,
        timestamp: Utc::now().to_rfc2822(),
    })
}

/// POST /create - route to the named page; nothing is written here
pub async fn create(form: Result<Form<CreateForm>, FormRejection>) -> Result<Redirect, ApiError> {
    let Form(form) = form?;
    if form.name.is_empty() {
        return Ok(Redirect::to("/"));
    }
    Ok(Redirect::to(&wiki_path(&form.name)))
}

/// POST /save - insert or update, decided by the form's `newPage` flag
pub async fn save(
    State(state): State<AppState>,
    form: Result<Form<SaveForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Form(form) = form?;
    if form.new_page == "yes" {
        let id = page_repo::create(&state.pool, &form.title, &form.markdown).await?;
        info!(id, title = %form.title, "page created");
    } else {
        let id = parse_id(&form.id)?;
        page_repo::update(&state.pool, id, &form.markdown).await?;
        info!(id, title = %form.title, "page updated");
    }

    Ok(Redirect::to(&wiki_path(&form.title)))
}

/// POST /delete - remove a page by id
pub async fn delete(
    State(state): State<AppState>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Form(form) = form?;
    let id = parse_id(&form.id)?;
    page_repo::delete_by_id(&state.pool, id).await?;
    info!(id, "page deleted");

    Ok(Redirect::to("/"))
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_owned())
}
