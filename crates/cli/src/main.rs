//! `wiki` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   — prepare the schema, then start the HTTP server.
//! - `migrate` — prepare the schema only.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::ServerConfig;
use db::{DbPool, PoolConfig};

#[derive(Parser)]
#[command(name = "wiki", about = "A minimal markdown wiki", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the wiki server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Create the pages table if it does not exist.
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:wiki.db")]
    database_url: String,

    /// Upper bound on pooled connections.
    #[arg(long, default_value_t = 30)]
    max_connections: u32,

    /// Seconds a request may wait for a free connection.
    #[arg(long, default_value_t = 30)]
    acquire_timeout_secs: u64,
}

impl From<DatabaseArgs> for PoolConfig {
    fn from(args: DatabaseArgs) -> Self {
        Self {
            database_url: args.database_url,
            max_connections: args.max_connections,
            acquire_timeout: Duration::from_secs(args.acquire_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve { bind, database } => {
            info!("Starting wiki server on {bind}");
            let pool = DbPool::connect(&database.into())
                .await
                .context("failed to connect to database")?;
            api::serve(pool, ServerConfig { bind_addr: bind })
                .await
                .context("server did not start")?;
        }
        Command::Migrate { database } => {
            let config = PoolConfig::from(database);
            info!("Preparing schema in {}", config.database_url);
            let pool = DbPool::connect(&PoolConfig {
                max_connections: 1,
                ..config
            })
            .await
            .context("failed to connect to database")?;
            db::ensure_schema(&pool).await.context("schema preparation failed")?;
            info!("Schema ready");
        }
    }
    Ok(())
}
