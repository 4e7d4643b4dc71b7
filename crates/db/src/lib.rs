//! `db` crate — pure persistence layer.
//!
//! Provides the leased connection pool, the idempotent schema initializer and
//! the page repository.  No HTTP or rendering concerns live here.

pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use models::{PageSource, EMPTY_PAGE_MARKDOWN, NEW_PAGE_ID};
pub use pool::{DbPool, Lease, PoolConfig};
pub use schema::ensure_schema;
