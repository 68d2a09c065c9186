//! Circuit Tracer Leaderboard Server
//!
//! Serves the shared per-circuit top-10 lists over HTTP.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use circuit_tracer::network::{LeaderboardServer, ServerConfig};
use circuit_tracer::{LEADERBOARD_SIZE, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    info!("Circuit Tracer leaderboard v{}", VERSION);
    info!("Records directory: {}", config.records_dir.display());
    info!("Leaderboard size: {}", LEADERBOARD_SIZE);

    std::fs::create_dir_all(&config.records_dir)
        .with_context(|| format!("creating records directory {}", config.records_dir.display()))?;

    let server = Arc::new(LeaderboardServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await.context("leaderboard server failed")?;
    info!("Server stopped");
    Ok(())
}
