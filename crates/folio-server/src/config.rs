//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, knowledge file, model
//! backend, optional embeddings and the engine policy.

use folio_engine::EngineConfig;
use folio_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which embedding backend to use for semantic retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    /// Ollama embeddings API
    Ollama,
    /// Local feature-hashing embedder
    Hashed,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend kind
    pub kind: EmbeddingKind,

    /// Ollama base URL
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Ollama embedding model (e.g., "nomic-embed-text")
    #[serde(default)]
    pub model: String,

    /// Buckets for the hashed embedder
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Client-side timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_endpoint() -> String {
    folio_llm::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_dimension() -> usize {
    folio_store::embedding::DEFAULT_DIMENSION
}

fn default_embedding_timeout() -> u64 {
    10
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Knowledge file (.json or .toml)
    pub knowledge_path: PathBuf,

    /// Model backend (default: offline echo)
    #[serde(default)]
    pub backend: BackendConfig,

    /// Semantic retrieval (default: lexical only)
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,

    /// Engine policy
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    ///
    /// A relative `knowledge_path` is resolved against the config file's
    /// directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;

        if config.knowledge_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.knowledge_path = dir.join(&config.knowledge_path);
            }
        }

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields and the engine policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("knowledge_path".to_string()));
        }
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::MissingField("bind_address".to_string()));
        }
        self.engine.validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            knowledge_path: PathBuf::from("data/portfolio.toml"),
            backend: BackendConfig::echo(),
            embedding: None,
            engine: EngineConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
