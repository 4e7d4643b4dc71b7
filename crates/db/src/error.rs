//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No connection could be leased (store unreachable, pool closed, timeout).
    #[error("connection pool error: {0}")]
    Pool(#[source] sqlx::Error),

    /// A statement failed while holding a leased connection.
    #[error("statement error: {0}")]
    Statement(#[from] sqlx::Error),

    /// Boot-time DDL failure.
    #[error("schema preparation failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("a page named '{0}' already exists")]
    DuplicateName(String),

    #[error("page name must not be empty")]
    InvalidName,
}
