//! Oblige server binary
//!
//! Starts the HTTP server for document upload, obligation extraction and
//! legislation discovery.

use anyhow::Context;
use clap::Parser;
use oblige_server::{config::ServerConfig, init_tracing, start_server};
use std::path::PathBuf;
use tracing::warn;

/// Extract compliance obligations from legislation PDFs
#[derive(Debug, Parser)]
#[command(name = "oblige-server", version, about)]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(long, env = "OBLIGE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            warn!("No config file specified, using default development configuration");
            warn!("Usage: oblige-server --config <path-to-config.toml>");
            let mut config = ServerConfig::default_test_config();
            config.apply_overrides(|name| std::env::var(name).ok())?;
            config.validate()?;
            config
        }
    };

    start_server(config).await?;

    Ok(())
}
