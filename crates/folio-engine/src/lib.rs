//! Folio Engine
//!
//! Answers visitor questions about the portfolio owner, grounded in the
//! knowledge store.
//!
//! # Architecture
//!
//! ```text
//! message → QaEngine → Retriever (KnowledgeStore) → Composer (history, ModelBackend) → session
//! ```
//!
//! # Key Features
//!
//! - **Grounding**: answers may only cite entries retrieved for the question
//! - **Bounded latency**: per-attempt model timeout, one retry with backoff, total ask deadline
//! - **Sessions**: bounded FIFO history, idle expiry, per-session serialization
//! - **Degradation**: backend trouble becomes a refusal answer, never an error
//!
//! # Example Usage
//!
//! ```no_run
//! use folio_domain::SessionId;
//! use folio_engine::{EngineConfig, QaEngine};
//! use folio_llm::OllamaBackend;
//! use folio_store::KnowledgeStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(KnowledgeStore::from_path("portfolio.toml")?);
//! let backend = Arc::new(OllamaBackend::new("http://localhost:11434", "llama3.1")?);
//! let engine = QaEngine::new(store, backend, EngineConfig::default())?;
//!
//! let reply = engine.ask(&SessionId::generate(), "What have you built with Rust?").await?;
//! println!("{}", reply.answer.text);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod composer;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod prompt;
pub mod retriever;
pub mod session;
pub mod session_store;
pub mod sweeper;

pub use composer::{Composer, Composition, CompositionOutcome, APOLOGY_MESSAGE, FALLBACK_MESSAGE};
pub use config::{ComposerConfig, EngineConfig, RetrievalConfig, SessionConfig};
pub use engine::{QaEngine, Reply, NO_ANSWER_PLACEHOLDER};
pub use error::{EngineError, GroundingViolation, InvalidInputError};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use prompt::PromptBuilder;
pub use retriever::Retriever;
pub use session::{ConversationSession, SessionLimits, SessionState};
pub use session_store::{Checkout, SessionHandle, SessionStore};
pub use sweeper::SessionSweeper;
