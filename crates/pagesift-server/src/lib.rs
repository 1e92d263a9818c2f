//! Pagesift Server
//!
//! HTTP front end for the render → reduce → extract pipeline. A single
//! headless browser is launched at startup and shared by every request.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use pagesift_extractor::{Extractor, ExtractorError, PromptTemplate};
use pagesift_llm::{LlmError, OpenAiProvider};
use pagesift_render::{ChromeLauncher, RenderError, RenderSession};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Browser could not be started
    #[error("Browser error: {0}")]
    Render(#[from] RenderError),

    /// Prompt could not be loaded
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// LLM client could not be built
    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        warn!("tracing subscriber already installed");
    }
}

/// Start the HTTP server
///
/// Launches the browser, loads the prompt and serves until Ctrl-C. The
/// browser is released after the server stops.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();
    config.validate()?;

    info!("Starting Pagesift");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {}", config.model);
    info!(
        "Navigation timeout: {}ms, LLM timeout: {}ms",
        config.render.navigation_timeout_ms, config.extractor.llm_timeout_ms
    );

    let template = PromptTemplate::from_file(&config.prompt_file)?;
    info!("Loaded prompt from {}", config.prompt_file.display());

    let mut provider = OpenAiProvider::new(&config.openai_api_key, &config.model)?
        .with_timeout(config.extractor.llm_timeout());
    if let Some(base_url) = &config.api_base_url {
        provider = provider.with_base_url(base_url);
    }
    let extractor = Extractor::new(provider, template, config.extractor.clone());

    let session = RenderSession::new(
        ChromeLauncher::new(config.launch.clone()),
        config.render.clone(),
    );
    session.ensure_ready().await?;

    let state = AppState::new(session, extractor);
    let session = std::sync::Arc::clone(&state.session);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()));

    session.shutdown().await;
    info!("Pagesift stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
