//! Backend selection from configuration

use crate::{HttpBackend, LlmError, MockBackend, OllamaBackend};
use folio_domain::ModelBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which model backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server
    Ollama,
    /// Endpoint speaking the engine's JSON contract
    Http,
    /// Offline echo of the grounding context (demos and smoke tests)
    Echo,
}

/// Model backend configuration
///
/// ```toml
/// [backend]
/// kind = "ollama"
/// endpoint = "http://localhost:11434"
/// model = "llama3.1"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind
    pub kind: BackendKind,

    /// Base URL (Ollama) or full request URL (HTTP)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name, required for Ollama
    #[serde(default)]
    pub model: String,

    /// Client-side timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding a bearer token for the HTTP backend
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_endpoint() -> String {
    crate::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    crate::http::DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    /// Offline echo backend configuration
    pub fn echo() -> Self {
        Self {
            kind: BackendKind::Echo,
            endpoint: default_endpoint(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
            api_key_env: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::echo()
    }
}

/// Construct the configured backend
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn ModelBackend>, LlmError> {
    if config.timeout_secs == 0 {
        return Err(LlmError::Config("timeout_secs must be greater than 0".to_string()));
    }

    let backend: Arc<dyn ModelBackend> = match config.kind {
        BackendKind::Ollama => Arc::new(OllamaBackend::with_timeout(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs,
        )?),
        BackendKind::Http => {
            let mut backend = HttpBackend::with_timeout(config.endpoint.clone(), config.timeout_secs)?;
            if let Some(var) = &config.api_key_env {
                let token = std::env::var(var).map_err(|_| {
                    LlmError::Config(format!("Environment variable {} is not set", var))
                })?;
                backend = backend.with_bearer_token(token);
            }
            Arc::new(backend)
        }
        BackendKind::Echo => Arc::new(MockBackend::echo()),
    };

    info!(
        "Using {} model backend at {}",
        backend.name(),
        if config.kind == BackendKind::Echo { "(local)" } else { config.endpoint.as_str() }
    );

    Ok(backend)
}
