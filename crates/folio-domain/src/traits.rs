//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the engine and the model services
//! it calls. Implementations live in `folio-llm` and `folio-store`.

use crate::Turn;
use async_trait::async_trait;
use std::fmt;

/// One knowledge entry as presented to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingItem {
    /// Entry id the model may cite
    pub id: String,

    /// Entry title
    pub title: String,

    /// Entry body, possibly annotated with category and dates
    pub body: String,
}

/// A single grounded-answer request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Rules restricting the answer to the grounding context
    pub system_instructions: String,

    /// Entries the answer may draw on, most relevant first
    pub grounding_context: Vec<GroundingItem>,

    /// Prior conversation, oldest first
    pub history: Vec<Turn>,

    /// The visitor's question
    pub query: String,
}

/// A well-formed model reply
///
/// Backends only hand out this type once the raw payload has been parsed; a
/// payload that doesn't fit becomes [`BackendError::Malformed`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelReply {
    /// Answer text
    pub text: String,

    /// Entry ids the model claims to have used
    pub cited_ids: Vec<String>,

    /// The model itself declined to answer
    pub declined: bool,
}

/// Failure talking to a model or embedding backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Network failure, timeout, 5xx or rate limiting; worth one retry
    Transient(String),

    /// The backend answered but the payload didn't fit the reply contract
    Malformed(String),

    /// The backend refused the request (bad model name, 4xx); retrying won't help
    Rejected(String),
}

impl BackendError {
    /// Whether the failure may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Transient(_))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transient(msg) => write!(f, "Transient backend error: {}", msg),
            BackendError::Malformed(msg) => write!(f, "Malformed backend response: {}", msg),
            BackendError::Rejected(msg) => write!(f, "Backend rejected request: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Trait for the language-model backend
///
/// Implemented by the infrastructure layer (folio-llm). Implementations perform a
/// single attempt; timeouts and retries belong to the caller.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short name for logs ("ollama", "http", "mock")
    fn name(&self) -> &str;

    /// Produce a grounded reply for `request`
    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, BackendError>;
}

/// Trait for text embedding backends
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed `text` into a dense vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}
