//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// CLI settings error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server configuration file error
    #[error("Server configuration error: {0}")]
    ServerConfig(#[from] folio_server::config::ConfigError),

    /// Knowledge file failed to load
    #[error("{0}")]
    Load(#[from] folio_store::LoadError),

    /// Engine could not be built
    #[error("Startup error: {0}")]
    Startup(#[from] folio_server::ServerError),

    /// Engine rejected the question
    #[error("{0}")]
    Engine(#[from] folio_engine::EngineError),

    /// Line editor error
    #[error("Editor error: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
