//! Oblige Server
//!
//! HTTP front end for the extraction-and-persistence pipeline. Wires the
//! filesystem blob store, the OpenAI-compatible completer and the `lopdf`
//! page extractor into a `Pipeline` and serves it with axum.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use oblige_extractor::LopdfExtractor;
use oblige_llm::{LlmError, OpenAiCompleter};
use oblige_pipeline::Pipeline;
use oblige_store::{FsBlobStore, UrlSigner};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Completion client could not be built
    #[error("Completion client error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build application state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let signer = Arc::new(UrlSigner::new(
        &config.presign.secret,
        &config.server.public_base_url,
    ));

    let store = FsBlobStore::new(config.bucket_dir()).with_signer(signer.clone());

    if config.llm.api_key.is_empty() {
        warn!("No API key configured, completion calls will be rejected upstream");
    }
    let completer = OpenAiCompleter::with_timeout(
        &config.llm.endpoint,
        &config.llm.api_key,
        Duration::from_secs(config.llm.timeout_secs),
    )?;

    let pipeline = Pipeline::new(
        Arc::new(store),
        Arc::new(LopdfExtractor),
        Arc::new(completer),
        config.extractor_config(),
        config.pipeline_config(),
    );

    Ok(AppState {
        pipeline: Arc::new(pipeline),
        signer,
        max_upload_bytes: config.server.max_upload_bytes,
    })
}

/// Start the HTTP server
///
/// Builds the pipeline from configuration and serves it until the
/// process exits.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Oblige server");
    info!("Bind address: {}", config.bind_addr());
    info!("Bucket directory: {}", config.bucket_dir().display());
    info!(
        model = %config.llm.model,
        window = config.llm.legislation_window_chars,
        "Completion settings"
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
