//! Configuration for the Q&A engine
//!
//! Retrieval policy, model-call budget, session bounds and input limits.
//! Every section has defaults, so a TOML file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retrieval scoring policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Upper bound on entries handed to the composer
    /// Default: 8
    pub max_results: usize,

    /// Entries must score strictly above this to be retrieved
    /// Default: 0.15
    pub min_relevance: f32,

    /// Weight of lexical term overlap in the blended score
    /// Default: 0.7
    pub lexical_weight: f32,

    /// Weight of embedding cosine similarity in the blended score
    /// Default: 0.3
    pub semantic_weight: f32,

    /// Timeout for embedding the query (in milliseconds)
    /// Default: 2000
    pub embedding_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: 8,
            min_relevance: 0.15,
            lexical_weight: 0.7,
            semantic_weight: 0.3,
            embedding_timeout_ms: 2_000,
        }
    }
}

impl RetrievalConfig {
    /// Get the query embedding timeout as Duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }
}

/// Model call budget and prompt history window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Hard timeout per model attempt (in milliseconds)
    /// Default: 10000
    pub model_timeout_ms: u64,

    /// Retries after a transient failure
    /// Default: 1
    pub max_retries: u32,

    /// Base delay for exponential backoff between attempts (in milliseconds)
    /// Default: 500
    pub backoff_base_ms: u64,

    /// Most recent turns included in the prompt
    /// Default: 10
    pub history_turns: usize,

    /// Character budget for prompt history
    /// Default: 4000
    pub history_chars: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            model_timeout_ms: 10_000,
            max_retries: 1,
            backoff_base_ms: 500,
            history_turns: 10,
            history_chars: 4_000,
        }
    }
}

impl ComposerConfig {
    /// Get the per-attempt model timeout as Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// Session bounds and expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stored turns per session before FIFO eviction
    /// Default: 40
    pub max_turns: usize,

    /// Stored characters per session before FIFO eviction
    /// Default: 16000
    pub max_chars: usize,

    /// Inactivity after which a session expires (in seconds)
    /// Default: 1800 (30 minutes)
    pub idle_timeout_secs: u64,

    /// How often the sweeper removes expired sessions (in seconds)
    /// Default: 60
    pub sweep_interval_secs: u64,

    /// Expired session ids remembered so they are never reused
    /// Default: 4096
    pub retired_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 40,
            max_chars: 16_000,
            idle_timeout_secs: 1_800,
            sweep_interval_secs: 60,
            retired_capacity: 4_096,
        }
    }
}

impl SessionConfig {
    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Configuration for the Q&A engine
///
/// # Examples
///
/// ```
/// use folio_engine::EngineConfig;
///
/// let config = EngineConfig::from_toml(r#"
///     max_query_chars = 500
///
///     [retrieval]
///     max_results = 4
/// "#).unwrap();
///
/// assert_eq!(config.max_query_chars, 500);
/// assert_eq!(config.retrieval.max_results, 4);
/// assert_eq!(config.composer.max_retries, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Retrieval policy
    pub retrieval: RetrievalConfig,

    /// Model call budget
    pub composer: ComposerConfig,

    /// Session bounds
    pub session: SessionConfig,

    /// Longest accepted user message (in characters)
    /// Default: 1000
    pub max_query_chars: usize,

    /// Total deadline for one ask (in milliseconds)
    /// Default: 15000
    pub ask_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            composer: ComposerConfig::default(),
            session: SessionConfig::default(),
            max_query_chars: 1_000,
            ask_timeout_ms: 15_000,
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML string, filling gaps with defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Get the total ask deadline as Duration
    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let r = &self.retrieval;
        if r.max_results == 0 {
            return Err("retrieval.max_results must be greater than 0".to_string());
        }
        if !(0.0..1.0).contains(&r.min_relevance) {
            return Err("retrieval.min_relevance must be in [0.0, 1.0)".to_string());
        }
        if r.lexical_weight < 0.0 || r.semantic_weight < 0.0 {
            return Err("retrieval weights must not be negative".to_string());
        }
        if r.lexical_weight + r.semantic_weight <= 0.0 {
            return Err("retrieval weights must not both be 0".to_string());
        }
        if r.embedding_timeout_ms == 0 {
            return Err("retrieval.embedding_timeout_ms must be greater than 0".to_string());
        }

        if self.composer.model_timeout_ms == 0 {
            return Err("composer.model_timeout_ms must be greater than 0".to_string());
        }

        let s = &self.session;
        if s.max_turns < 2 {
            return Err("session.max_turns must be at least 2".to_string());
        }
        if s.idle_timeout_secs == 0 {
            return Err("session.idle_timeout_secs must be greater than 0".to_string());
        }
        if s.sweep_interval_secs == 0 {
            return Err("session.sweep_interval_secs must be greater than 0".to_string());
        }

        if self.max_query_chars == 0 {
            return Err("max_query_chars must be greater than 0".to_string());
        }
        if self.max_query_chars > s.max_chars {
            return Err(format!(
                "max_query_chars ({}) must not exceed session.max_chars ({})",
                self.max_query_chars, s.max_chars
            ));
        }
        if self.ask_timeout_ms == 0 {
            return Err("ask_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.retrieval.max_results, 8);
        assert_eq!(config.composer.model_timeout(), Duration::from_secs(10));
        assert_eq!(config.ask_timeout(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let config = ComposerConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(500));
        assert_eq!(config.backoff(2), Duration::from_millis(1000));
        assert_eq!(config.backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = EngineConfig::default();
        config.session.idle_timeout_secs = 60;
        config.retrieval.min_relevance = 0.25;

        let toml_str = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.retrieval.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.retrieval.lexical_weight = 0.0;
        config.retrieval.semantic_weight = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.retrieval.min_relevance = 1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.max_query_chars = config.session.max_chars + 1;
        let err = config.validate().unwrap_err();
        assert!(err.contains("session.max_chars"));

        let mut config = EngineConfig::default();
        config.session.max_turns = 1;
        assert!(config.validate().is_err());
    }
}
