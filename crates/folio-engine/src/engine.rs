//! The public Q&A engine
//!
//! Validates the message, finds the session, retrieves, composes and records
//! the exchange. Only invalid input is reported as an error; every other
//! failure reaches the caller as a refusal answer.

use crate::composer::{Composer, CompositionOutcome, APOLOGY_MESSAGE};
use crate::config::EngineConfig;
use crate::error::{EngineError, InvalidInputError};
use crate::metrics::EngineMetrics;
use crate::retriever::Retriever;
use crate::session_store::SessionStore;
use crate::sweeper::SessionSweeper;
use folio_domain::{
    Answer, Clock, EmbeddingBackend, ModelBackend, SessionId, SystemClock, Turn,
};
use folio_store::KnowledgeStore;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Stored as the assistant turn when no answer could be given
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer available)";

/// The answer to one ask, with the session it was recorded in
///
/// `session_id` differs from the requested id when that session had expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Session the exchange was recorded in
    pub session_id: SessionId,
    /// The answer
    pub answer: Answer,
}

/// Portfolio question answering over a knowledge store and a model backend
///
/// # Examples
///
/// ```
/// use folio_domain::{Category, PortfolioEntry, SessionId};
/// use folio_engine::{EngineConfig, QaEngine};
/// use folio_llm::MockBackend;
/// use folio_store::KnowledgeStore;
/// use std::sync::Arc;
///
/// # tokio_test_block_on(async {
/// let entry = PortfolioEntry::new("p1", Category::Project, "Chat App", "Built with streaming inference")
///     .with_tags(["ai", "web"]);
/// let store = Arc::new(KnowledgeStore::from_entries("1", None, vec![entry]).unwrap());
/// let engine = QaEngine::new(store, Arc::new(MockBackend::echo()), EngineConfig::default()).unwrap();
///
/// let reply = engine.ask(&SessionId::from("visitor-1"), "What AI projects have you built?").await.unwrap();
/// assert!(reply.answer.text.contains("Chat App"));
/// assert!(!reply.answer.refused);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct QaEngine {
    store: Arc<KnowledgeStore>,
    retriever: Retriever,
    composer: Composer,
    sessions: Arc<SessionStore>,
    metrics: Arc<EngineMetrics>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl QaEngine {
    /// Create an engine on the system clock
    pub fn new(
        store: Arc<KnowledgeStore>,
        backend: Arc<dyn ModelBackend>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        Self::with_clock(store, backend, config, Arc::new(SystemClock))
    }

    /// Create an engine on an injected clock
    pub fn with_clock(
        store: Arc<KnowledgeStore>,
        backend: Arc<dyn ModelBackend>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;

        let retriever = Retriever::new(&store, config.retrieval.clone());
        let mut composer = Composer::new(backend, config.composer.clone());
        if let Some(owner) = store.owner() {
            composer = composer.with_owner(owner.name.clone());
        }
        let sessions = Arc::new(SessionStore::new(&config.session, Arc::clone(&clock)));

        info!(
            "Q&A engine ready over {} entries (knowledge version {})",
            store.len(),
            store.version()
        );

        Ok(Self {
            store,
            retriever,
            composer,
            sessions,
            metrics: Arc::new(EngineMetrics::new()),
            clock,
            config,
        })
    }

    /// Enable semantic retrieval
    pub async fn with_embedder(mut self, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        self.retriever = self.retriever.with_embedder(embedder).await;
        self
    }

    /// Check and clean a user message
    ///
    /// Control characters other than newlines and tabs are removed and
    /// surrounding whitespace trimmed; the result must be non-empty and no
    /// longer than the configured maximum.
    pub fn validate_input(&self, user_text: &str) -> Result<String, InvalidInputError> {
        let cleaned: String = user_text
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            return Err(InvalidInputError::Empty);
        }

        let len = cleaned.chars().count();
        if len > self.config.max_query_chars {
            return Err(InvalidInputError::TooLong {
                len,
                max: self.config.max_query_chars,
            });
        }

        Ok(cleaned.to_string())
    }

    /// Answer one message within a session
    ///
    /// Both turns of the exchange are recorded together once the answer is
    /// known, so a dropped future leaves the session untouched. Refusals are
    /// recorded with a placeholder assistant turn. The ask deadline runs from
    /// the call, including any wait behind an earlier ask in the same session;
    /// an ask that never got the session records nothing.
    ///
    /// # Errors
    ///
    /// Only [`EngineError::InvalidInput`]; nothing is retrieved, composed or
    /// recorded in that case.
    pub async fn ask(&self, session_id: &SessionId, user_text: &str) -> Result<Reply, EngineError> {
        let deadline = Instant::now() + self.config.ask_timeout();
        let arrived_ms = self.clock.now_ms();
        self.metrics.record_ask();

        let text = match self.validate_input(user_text) {
            Ok(text) => text,
            Err(e) => {
                self.metrics.record_invalid_input();
                debug!("Rejected message for session {}: {}", session_id, e);
                return Err(e.into());
            }
        };

        let checkout = self.sessions.checkout(session_id);
        if checkout.created {
            self.metrics.record_session_created();
        }
        if let Some(expired) = &checkout.replaced {
            self.metrics.record_sessions_expired(1);
            info!("Session {} expired, continuing as {}", expired, checkout.id);
        }

        // Waiting behind another ask in the same session counts against the deadline
        let mut session = match timeout_at(deadline, checkout.handle.lock()).await {
            Ok(session) => session,
            Err(_) => {
                warn!(
                    "Session {} stayed busy past {:?}",
                    checkout.id,
                    self.config.ask_timeout()
                );
                self.metrics.record_timeout();
                self.metrics.record_answer(true);
                return Ok(Reply {
                    session_id: checkout.id,
                    answer: Answer::refusal(APOLOGY_MESSAGE),
                });
            }
        };
        let history = session.history(
            self.config.composer.history_turns,
            self.config.composer.history_chars,
        );

        let composed = timeout_at(deadline, async {
            let context = self
                .retriever
                .retrieve(&text, self.config.retrieval.max_results)
                .await;
            self.composer.compose_detailed(&text, &context, &history).await
        })
        .await;

        let answer = match composed {
            Ok(composition) => {
                if composition.violation.is_some() {
                    self.metrics.record_grounding_violation();
                }
                if composition.outcome == CompositionOutcome::BackendFailure {
                    self.metrics.record_backend_failure();
                }
                composition.answer
            }
            Err(_) => {
                warn!(
                    "Ask in session {} exceeded {:?}",
                    checkout.id,
                    self.config.ask_timeout()
                );
                self.metrics.record_timeout();
                Answer::refusal(APOLOGY_MESSAGE)
            }
        };
        self.metrics.record_answer(answer.refused);

        let assistant_text = if answer.refused {
            NO_ANSWER_PLACEHOLDER.to_string()
        } else {
            answer.text.clone()
        };
        session.append_exchange(
            Turn::user(text, arrived_ms),
            Turn::assistant(assistant_text, self.clock.now_ms()),
        );

        Ok(Reply {
            session_id: checkout.id,
            answer,
        })
    }

    /// Stored history of a live session, oldest first
    pub async fn history(&self, session_id: &SessionId) -> Option<Vec<Turn>> {
        let handle = self.sessions.get(session_id)?;
        let session = handle.lock().await;
        Some(session.turns().cloned().collect())
    }

    /// A sweeper for this engine's sessions, on the configured interval
    pub fn sweeper(&self) -> SessionSweeper {
        SessionSweeper::new(
            Arc::clone(&self.sessions),
            Arc::clone(&self.metrics),
            self.config.session.sweep_interval(),
        )
    }

    /// Knowledge store
    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    /// Retriever
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Live sessions
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Counters
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// Configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
