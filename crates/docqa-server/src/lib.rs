//! DocQA Server
//!
//! HTTP API for uploading documents and asking questions about them.
//! Accounts authenticate with bearer tokens; every document and history
//! entry is visible only to its owner.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod handlers;
pub mod session;

use config::ServerConfig;
use docqa_llm::ChatCompletionsProvider;
use docqa_store::SqliteStore;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] docqa_store::StoreError),

    /// Inference provider could not be created
    #[error("Inference provider error: {0}")]
    Llm(#[from] docqa_llm::LlmError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides `default_level`. Calling this more than once is harmless.
pub fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init();
}

/// Build the application state from configuration
///
/// Opens the database, prepares the upload directory and creates the
/// inference provider.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let store = SqliteStore::open(&config.database_path)?;
    let provider = ChatCompletionsProvider::new(config.inference.clone())?;
    if config.inference.resolve_api_key().is_none() {
        tracing::warn!(
            "No inference API key configured (set inference.api_key or {})",
            docqa_llm::settings::API_KEY_ENV
        );
    }

    Ok(AppState::new(config, store, Arc::new(provider))?)
}

/// Start the HTTP server
///
/// Initializes state from configuration and serves until the process exits.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing("info");

    info!("Starting DocQA server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path.display());
    info!("Upload directory: {}", config.upload_dir.display());
    info!("Model: {} at {}", config.inference.model, config.inference.endpoint);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
