//! Folio Domain Layer
//!
//! Core value types and trait boundaries for the portfolio Q&A engine. Like every
//! layer above it, this crate depends on nothing heavier than `uuid` and
//! `async-trait`; storage, HTTP and orchestration live in other crates.
//!
//! ## Key Concepts
//!
//! - **PortfolioEntry**: One immutable fact about the portfolio owner (project,
//!   experience, education or skill)
//! - **RetrievedContext**: The ranked, bounded set of entries grounding one answer
//! - **Turn**: One message in a conversation
//! - **Answer**: The structured reply handed back to the chat UI
//! - **ModelBackend / EmbeddingBackend**: Contracts for the external model services

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod answer;
pub mod clock;
pub mod context;
pub mod entry;
pub mod session;
pub mod text;
pub mod traits;
pub mod turn;

// Re-exports for convenience
pub use answer::Answer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{RetrievedContext, ScoredEntry};
pub use entry::{Category, EntryId, PartialDate, PortfolioEntry};
pub use session::SessionId;
pub use traits::{BackendError, EmbeddingBackend, GroundingItem, ModelBackend, ModelReply, ModelRequest};
pub use turn::{Role, Turn};
