//! SQLite connection pool with leased connections.
//!
//! Every database operation takes exactly one [`Lease`] from the pool and hands
//! it back before reporting its own result.  The pool counts leases that are
//! still out so callers (and tests) can check that nothing was leaked.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::DbError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Fixed pool settings, chosen at construction.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How long `acquire` may wait before failing with [`DbError::Pool`].
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:wiki.db".to_string(),
            max_connections: 30,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// DbPool
// ---------------------------------------------------------------------------

/// Shared handle to the bounded connection pool.
///
/// Cheap to clone; all clones lease from the same pool and share one
/// outstanding-lease counter.
#[derive(Debug, Clone)]
pub struct DbPool {
    inner: SqlitePool,
    leases: Arc<AtomicUsize>,
}

impl DbPool {
    /// Open a pool against `config.database_url`, creating the database file if
    /// it does not exist yet.
    pub async fn connect(config: &PoolConfig) -> Result<Self, DbError> {
        info!(
            "Connecting to database (max_connections={})",
            config.max_connections
        );
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(DbError::Pool)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(DbError::Pool)?;

        Ok(Self::from_pool(pool))
    }

    /// Single-connection in-memory database.
    ///
    /// The connection is never recycled, otherwise the database would vanish
    /// with it.
    pub async fn in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(DbError::Pool)?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(inner: SqlitePool) -> Self {
        Self {
            inner,
            leases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lease one connection, waiting until one is free.
    pub async fn acquire(&self) -> Result<Lease, DbError> {
        let conn = self.inner.acquire().await.map_err(DbError::Pool)?;
        let outstanding = self.leases.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(outstanding, "connection leased");
        Ok(Lease {
            conn,
            leases: Arc::clone(&self.leases),
        })
    }

    /// Number of leases handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.leases.load(Ordering::SeqCst)
    }

    /// Close the pool; every later `acquire` fails.
    pub async fn close(&self) {
        self.inner.close().await;
    }
}

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

/// A connection owned by exactly one in-flight operation.
///
/// Returned to the pool by [`Lease::release`] or when dropped.  `release`
/// consumes the lease, so it cannot run twice for the same connection.
pub struct Lease {
    conn: PoolConnection<Sqlite>,
    leases: Arc<AtomicUsize>,
}

impl Lease {
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for Lease {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let outstanding = self.leases.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(outstanding, "connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lease_is_counted_until_released() {
        let pool = DbPool::in_memory().await.expect("pool");
        assert_eq!(pool.outstanding(), 0);

        let lease = pool.acquire().await.expect("acquire");
        assert_eq!(pool.outstanding(), 1);

        lease.release();
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn dropped_lease_is_released() {
        let pool = DbPool::in_memory().await.expect("pool");
        {
            let mut lease = pool.acquire().await.expect("acquire");
            let one: (i64,) = sqlx::query_as("SELECT 1")
                .fetch_one(&mut *lease)
                .await
                .expect("query");
            assert_eq!(one.0, 1);
        }
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn acquire_after_close_is_a_pool_error() {
        let pool = DbPool::in_memory().await.expect("pool");
        pool.close().await;

        let result = pool.acquire().await;
        assert!(matches!(result, Err(DbError::Pool(_))));
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn single_connection_pool_hands_out_one_lease_at_a_time() {
        let pool = DbPool::in_memory().await.expect("pool");
        let first = pool.acquire().await.expect("first");

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|lease| lease.release()) })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        first.release();
        waiter.await.expect("join").expect("second acquire");
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn default_config_matches_cli_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 30);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    }
}
