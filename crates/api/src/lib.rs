//! `api` crate — the wiki's HTTP surface.
//!
//! Routes:
//!   GET    /
//!   GET    /wiki/{page}
//!   POST   /create
//!   POST   /save
//!   POST   /delete
//!
//! [`boot::BootSequencer`] prepares the schema and only then binds the
//! listener.

pub mod boot;
pub mod error;
pub mod handlers;
pub mod markup;
pub mod views;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use db::DbPool;

pub use boot::{BootError, BootSequencer, BootState, ReadyServer};
pub use error::ApiError;
pub use handlers::AppState;

use handlers::pages;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Build the router with every wiki route.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/wiki/{page}", get(pages::render))
        .route("/create", post(pages::create))
        .route("/save", post(pages::save))
        .route("/delete", post(pages::delete))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Boot and serve until Ctrl+C / SIGTERM.
pub async fn serve(pool: DbPool, config: ServerConfig) -> Result<(), BootError> {
    BootSequencer::new().boot(pool, &config).await?.run().await
}
