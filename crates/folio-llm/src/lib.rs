//! Folio Model Backend Layer
//!
//! Pluggable implementations of the `ModelBackend` and `EmbeddingBackend`
//! traits from `folio-domain`.
//!
//! # Backends
//!
//! - `MockBackend`: Deterministic scripted backend for tests and demos
//! - `OllamaBackend`: Local Ollama chat API in JSON mode
//! - `HttpBackend`: Any endpoint that speaks the engine's JSON contract
//! - `OllamaEmbedder`: Ollama embeddings for semantic retrieval
//!
//! Every backend makes a single attempt per call and reports failures as
//! `BackendError`; timeouts and retries are the composer's job.
//!
//! # Examples
//!
//! ```
//! use folio_domain::{GroundingItem, ModelBackend, ModelRequest};
//! use folio_llm::MockBackend;
//!
//! # tokio_test_block_on(async {
//! let backend = MockBackend::echo();
//! let request = ModelRequest {
//!     system_instructions: String::new(),
//!     grounding_context: vec![GroundingItem {
//!         id: "p1".into(),
//!         title: "Chat App".into(),
//!         body: "Streaming chat".into(),
//!     }],
//!     history: vec![],
//!     query: "What did you build?".into(),
//! };
//! let reply = backend.complete(&request).await.unwrap();
//! assert!(reply.text.contains("Chat App"));
//! assert_eq!(reply.cited_ids, vec!["p1"]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod http;
pub mod ollama;
pub mod reply;

use async_trait::async_trait;
use folio_domain::{BackendError, ModelBackend, ModelReply, ModelRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use config::{build_backend, BackendConfig, BackendKind};
pub use http::HttpBackend;
pub use ollama::{OllamaBackend, OllamaEmbedder};

/// Errors constructing or configuring a backend
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Invalid backend configuration
    #[error("Backend configuration error: {0}")]
    Config(String),
}

/// What a [`MockBackend`] does on a call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with the grounding titles and bodies, citing every grounding id
    Echo,
    /// Return this reply
    Reply(ModelReply),
    /// Fail with this error
    Fail(BackendError),
    /// Never complete
    Hang,
}

/// Mock backend for deterministic testing
///
/// Queued behaviors are consumed one per call; once the queue is empty every
/// call uses the default behavior. Clones share the queue and counters.
///
/// # Examples
///
/// ```
/// use folio_domain::BackendError;
/// use folio_llm::{MockBackend, MockBehavior};
///
/// let backend = MockBackend::echo();
/// backend.push(MockBehavior::Fail(BackendError::Transient("503".into())));
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_behavior: MockBehavior,
    queue: Arc<Mutex<VecDeque<MockBehavior>>>,
    call_count: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<ModelRequest>>>,
}

impl MockBackend {
    /// Create a backend with a default behavior
    pub fn new(default_behavior: MockBehavior) -> Self {
        Self {
            default_behavior,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Echo the grounding back, citing all of it
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Always return `reply`
    pub fn replying(reply: ModelReply) -> Self {
        Self::new(MockBehavior::Reply(reply))
    }

    /// Always fail with `error`
    pub fn failing(error: BackendError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    /// Never answer
    pub fn hanging() -> Self {
        Self::new(MockBehavior::Hang)
    }

    /// Queue a one-off behavior for the next call
    pub fn push(&self, behavior: MockBehavior) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(behavior);
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_behavior(&self) -> MockBehavior {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_behavior.clone())
    }
}

/// Build the reply an echoing backend gives for `request`
pub fn echo_reply(request: &ModelRequest) -> ModelReply {
    if request.grounding_context.is_empty() {
        return ModelReply {
            text: "I don't have any portfolio details about that.".to_string(),
            cited_ids: Vec::new(),
            declined: false,
        };
    }

    let text = request
        .grounding_context
        .iter()
        .map(|g| format!("{}: {}", g.title, g.body))
        .collect::<Vec<_>>()
        .join(" ");

    ModelReply {
        text,
        cited_ids: request.grounding_context.iter().map(|g| g.id.clone()).collect(),
        declined: false,
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        match self.next_behavior() {
            MockBehavior::Echo => Ok(echo_reply(request)),
            MockBehavior::Reply(reply) => Ok(reply),
            MockBehavior::Fail(error) => Err(error),
            MockBehavior::Hang => std::future::pending::<Result<ModelReply, BackendError>>().await,
        }
    }
}
