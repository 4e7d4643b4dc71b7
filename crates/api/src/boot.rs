//! Two-phase startup: prepare the schema, then bind the HTTP listener.
//!
//! The listener is never bound unless the schema step succeeded, so no
//! page-editing request can reach a store without its table.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use db::{ensure_schema, DbError, DbPool};

use crate::{build_router, AppState, ServerConfig};

// ---------------------------------------------------------------------------
// State and errors
// ---------------------------------------------------------------------------

/// Process-wide boot phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    /// Schema not yet confirmed.
    Preparing,
    /// Listener bound and accepting connections.
    Ready,
    /// Terminal; the process should exit non-zero.
    Failed,
}

impl std::fmt::Display for BootState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preparing => write!(f, "preparing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("schema preparation failed: {0}")]
    Schema(#[source] DbError),

    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("http server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ---------------------------------------------------------------------------
// BootSequencer
// ---------------------------------------------------------------------------

/// Runs the boot phases in order and publishes the current [`BootState`].
pub struct BootSequencer {
    state: watch::Sender<BootState>,
}

impl Default for BootSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BootSequencer {
    pub fn new() -> Self {
        let (state, _) = watch::channel(BootState::Preparing);
        Self { state }
    }

    pub fn state(&self) -> BootState {
        *self.state.borrow()
    }

    /// Watch boot transitions.
    pub fn subscribe(&self) -> watch::Receiver<BootState> {
        self.state.subscribe()
    }

    /// Prepare the schema, then bind the listener.
    ///
    /// # Errors
    /// - [`BootError::Schema`] if the DDL step fails; nothing is bound.
    /// - [`BootError::Bind`] if the listener cannot be bound.
    pub async fn boot(&self, pool: DbPool, config: &ServerConfig) -> Result<ReadyServer, BootError> {
        let result = start(pool, config).await;
        let next = match &result {
            Ok(_) => BootState::Ready,
            Err(e) => {
                error!("Boot failed: {e}");
                BootState::Failed
            }
        };
        self.state.send_replace(next);
        result
    }
}

async fn start(pool: DbPool, config: &ServerConfig) -> Result<ReadyServer, BootError> {
    info!("Preparing database schema");
    ensure_schema(&pool).await.map_err(BootError::Schema)?;

    let addr = config.bind_addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| BootError::Bind { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| BootError::Bind { addr, source })?;
    info!("Http server running on {local_addr}");

    Ok(ReadyServer {
        listener,
        router: build_router(AppState::new(pool)),
        local_addr,
    })
}

// ---------------------------------------------------------------------------
// ReadyServer
// ---------------------------------------------------------------------------

/// A bound listener plus its router, ready to serve.
pub struct ReadyServer {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
}

impl ReadyServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), BootError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, signal: F) -> Result<(), BootError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(BootError::Serve)?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn loopback(port: u16) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], port)),
        }
    }

    /// A port that was free a moment ago.
    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn starts_in_preparing() {
        assert_eq!(BootSequencer::new().state(), BootState::Preparing);
    }

    #[tokio::test]
    async fn schema_failure_never_binds_listener() {
        let pool = DbPool::in_memory().await.unwrap();
        pool.close().await;

        let port = free_port();
        let sequencer = BootSequencer::new();
        let result = sequencer.boot(pool, &loopback(port)).await;

        assert!(matches!(result, Err(BootError::Schema(_))));
        assert_eq!(sequencer.state(), BootState::Failed);
        assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
    }

    #[tokio::test]
    async fn bind_failure_is_reported_after_schema() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let pool = DbPool::in_memory().await.unwrap();
        let sequencer = BootSequencer::new();
        let result = sequencer.boot(pool.clone(), &loopback(port)).await;

        assert!(matches!(result, Err(BootError::Bind { .. })));
        assert_eq!(sequencer.state(), BootState::Failed);
        // The schema phase did run.
        assert!(db::repository::pages::list_names(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ready_server_answers_http() {
        let pool = DbPool::in_memory().await.unwrap();
        let sequencer = BootSequencer::new();
        let mut states = sequencer.subscribe();

        let server = sequencer.boot(pool, &loopback(0)).await.unwrap();
        assert_eq!(sequencer.state(), BootState::Ready);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), BootState::Ready);

        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async {
            let _ = stopped.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let response = String::from_utf8_lossy(&response);
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("Wiki home"));

        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
