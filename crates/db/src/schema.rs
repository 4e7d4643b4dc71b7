//! Idempotent schema preparation, run once per boot.

use tracing::{error, info};

use crate::{DbError, DbPool};

const CREATE_PAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT    NOT NULL UNIQUE CHECK (length(name) > 0),
    content TEXT    NOT NULL
)
"#;

/// Create the `pages` table if it is absent.
///
/// One lease, one DDL statement, released regardless of outcome.  Failures are
/// logged and returned without retry; the caller treats them as fatal.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await.map_err(|e| {
        error!("Could not open a database connection: {e}");
        e
    })?;

    let result = sqlx::query(CREATE_PAGES_TABLE).execute(&mut *conn).await;
    conn.release();

    match result {
        Ok(_) => {
            info!("Database schema ready");
            Ok(())
        }
        Err(e) => {
            error!("Database preparation error: {e}");
            Err(DbError::Schema(e))
        }
    }
}
