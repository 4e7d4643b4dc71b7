//! Page CRUD operations.

use tracing::{instrument, warn};

use crate::{models::PageSource, DbError, DbPool};

/// Return every page name, sorted ascending by byte order.
#[instrument(skip(pool))]
pub async fn list_names(pool: &DbPool) -> Result<Vec<String>, DbError> {
    let mut conn = pool.acquire().await?;
    let result = sqlx::query_scalar::<_, String>("SELECT name FROM pages")
        .fetch_all(&mut *conn)
        .await;
    conn.release();

    let mut names = result?;
    names.sort();
    Ok(names)
}

/// Look up a page by name.
///
/// A miss is not an error: it yields [`PageSource::new_page`].
#[instrument(skip(pool))]
pub async fn fetch(pool: &DbPool, name: &str) -> Result<PageSource, DbError> {
    let mut conn = pool.acquire().await?;
    let result = sqlx::query_as::<_, PageSource>("SELECT id, content FROM pages WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await;
    conn.release();

    Ok(result?.unwrap_or_else(PageSource::new_page))
}

/// Insert a new page and return its store-assigned id.
///
/// # Errors
/// - [`DbError::InvalidName`] if `name` is empty (no connection is leased).
/// - [`DbError::DuplicateName`] if a page with `name` already exists.
#[instrument(skip(pool, content))]
pub async fn create(pool: &DbPool, name: &str, content: &str) -> Result<i64, DbError> {
    if name.is_empty() {
        return Err(DbError::InvalidName);
    }

    let mut conn = pool.acquire().await?;
    let result = sqlx::query("INSERT INTO pages (name, content) VALUES (?, ?)")
        .bind(name)
        .bind(content)
        .execute(&mut *conn)
        .await;
    conn.release();

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(DbError::DuplicateName(name.to_owned()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Replace the content of page `id`.
///
/// An id that matches no row is reported as success.
#[instrument(skip(pool, content))]
pub async fn update(pool: &DbPool, id: i64, content: &str) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    let result = sqlx::query("UPDATE pages SET content = ? WHERE id = ?")
        .bind(content)
        .bind(id)
        .execute(&mut *conn)
        .await;
    conn.release();

    if result?.rows_affected() == 0 {
        warn!(id, "update matched no page");
    }
    Ok(())
}

/// Permanently delete page `id`.
#[instrument(skip(pool))]
pub async fn delete_by_id(pool: &DbPool, id: i64) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    let result = sqlx::query("DELETE FROM pages WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await;
    conn.release();

    if result?.rows_affected() == 0 {
        warn!(id, "delete matched no page");
    }
    Ok(())
}
