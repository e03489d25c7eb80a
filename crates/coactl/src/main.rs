//! CoA Control - CLI client for the CoA metrics pipeline.

use anyhow::Result;
use clap::Parser;
use coactl::cli::{Cli, Commands};
use coactl::commands;
use coactl::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default; RUST_LOG=debug for stream and assistant tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load();

    match cli.command {
        Commands::Watch { url, count } => commands::watch(&config, url, count).await,
        Commands::Ask {
            question,
            url,
            offline,
        } => commands::ask(&config, question, url, offline).await,
        Commands::Chat { url, offline } => commands::chat(&config, url, offline).await,
        Commands::Sample { json } => commands::sample(json),
    }
}
