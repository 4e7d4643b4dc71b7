//! Request handlers and the state they share.

pub mod pages;


use db::DbPool;

/// Per-router state. Each handler leases its own connections from `pool`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}
