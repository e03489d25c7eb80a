//! CoA Daemon - streams synthetic pipeline metrics to WebSocket subscribers.

use anyhow::{Context, Result};
use coad::config::Config;
use coad::{server, state};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("[BOOT] CoA Daemon v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let interval = config.broadcast.interval();
    let addr = config.listen_addr().context("Failed to resolve listen address")?;
    info!(
        "[BOOT] Config loaded (port {}, interval {} ms)",
        config.server.port,
        interval.as_millis()
    );

    let listener = server::bind(addr).await?;
    let state = state::create_shared_state(interval);

    info!("[READY] coad operational");
    server::run(listener, state, shutdown_signal()).await?;

    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
