//! Folio Server
//!
//! HTTP front end for the portfolio Q&A engine. Loads the knowledge file at
//! startup, serves `POST /ask`, `GET /health` and `GET /schema/qa`, and runs
//! the session sweeper alongside.

#![warn(missing_docs)]

pub mod bootstrap;
pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Knowledge file failed to load
    #[error("Knowledge base error: {0}")]
    Load(#[from] folio_store::LoadError),

    /// Model or embedding backend could not be set up
    #[error("Backend error: {0}")]
    Backend(#[from] folio_llm::LlmError),

    /// Engine rejected its configuration
    #[error("Engine error: {0}")]
    Engine(#[from] folio_engine::EngineError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Initialize logging to stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Start the HTTP server
///
/// Builds the engine, starts the session sweeper and serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Folio server");
    info!("Knowledge file: {}", config.knowledge_path.display());
    info!("Model backend: {:?}", config.backend.kind);

    let engine = Arc::new(bootstrap::build_engine(&config).await?);

    // Sweeper stops when the server does
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let sweeper = tokio::spawn(engine.sweeper().run_until(async {
        let _ = stop_rx.await;
    }));

    let app = create_router(AppState {
        engine: Arc::clone(&engine),
    });

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()));

    stop_sweeper(stop_tx, sweeper).await;
    info!("Server stopped. Final metrics:\n{}", engine.metrics().summary());

    served
}

/// Signal the sweeper and wait for it; returns false if the task panicked
async fn stop_sweeper(stop: oneshot::Sender<()>, sweeper: JoinHandle<()>) -> bool {
    let _ = stop.send(());
    match sweeper.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Session sweeper task failed: {}", e);
            false
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_error_messages() {
        let err = ServerError::from(folio_store::LoadError::Empty);
        assert!(err.to_string().starts_with("Knowledge base error"));
    }

    #[tokio::test]
    async fn test_stop_sweeper_waits_for_clean_exit() {
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _ = rx.await;
        });
        assert!(stop_sweeper(tx, task).await);
    }

    #[tokio::test]
    async fn test_stop_sweeper_survives_panicked_task() {
        let (tx, _rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async {
            panic!("sweeper crashed");
        });
        assert!(!stop_sweeper(tx, task).await);
    }
}
