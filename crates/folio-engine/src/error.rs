//! Error types for the engine

use thiserror::Error;

/// The caller sent something the engine won't process
///
/// Reported immediately: no retrieval, no model call, no session change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// Nothing left after trimming whitespace and control characters
    #[error("Message is empty")]
    Empty,

    /// Message exceeds the configured maximum
    #[error("Message too long: {len} chars (max: {max})")]
    TooLong {
        /// Length in characters
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Errors visible to callers of the engine
///
/// Backend trouble never shows up here; it becomes a refusal answer instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Caller error
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The model cited entries that weren't in the retrieved context
///
/// Recovered locally by stripping the citations; only logged and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Model cited entries outside the retrieved context: {}", stripped.join(", "))]
pub struct GroundingViolation {
    /// Citations that were removed
    pub stripped: Vec<String>,
}
