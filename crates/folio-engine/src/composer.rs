//! Grounded answer composition
//!
//! The composer turns a question, its retrieved context and recent history
//! into one model request, and shapes whatever comes back into an [`Answer`].
//! It never fails: exhausted retries, rejections and malformed replies all
//! become refusals.

use crate::config::ComposerConfig;
use crate::error::GroundingViolation;
use crate::prompt::PromptBuilder;
use folio_domain::{
    Answer, BackendError, EntryId, ModelBackend, ModelReply, ModelRequest, RetrievedContext, Turn,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the model couldn't be reached or answered nonsense
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I can't answer that right now. Please try again in a moment.";

/// Shown when every citation the model made had to be discarded
pub const FALLBACK_MESSAGE: &str = "I couldn't find anything in the portfolio that answers that. \
     Try asking about specific projects, experience, education or skills.";

/// How a composition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionOutcome {
    /// Answer backed by at least one retrieved entry
    Grounded,
    /// Citation-free answer the model didn't decline (greetings, scope explanations)
    Generic,
    /// The model declined to answer
    Declined,
    /// All citations were outside the context
    GroundingRefusal,
    /// Retries exhausted, rejected or malformed reply
    BackendFailure,
}

/// An answer together with how it was reached
#[derive(Debug, Clone)]
pub struct Composition {
    /// The answer for the caller
    pub answer: Answer,
    /// How composition ended
    pub outcome: CompositionOutcome,
    /// Citations stripped from the model reply, if any
    pub violation: Option<GroundingViolation>,
    /// Model calls made
    pub attempts: u32,
}

/// Dispatches grounded-answer requests to a model backend
pub struct Composer {
    backend: Arc<dyn ModelBackend>,
    config: ComposerConfig,
    owner: Option<String>,
}

impl Composer {
    /// Create a composer over `backend`
    pub fn new(backend: Arc<dyn ModelBackend>, config: ComposerConfig) -> Self {
        Self {
            backend,
            config,
            owner: None,
        }
    }

    /// Name the portfolio owner in the prompt
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Model call budget in use
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose an answer
    pub async fn compose(&self, query: &str, context: &RetrievedContext, history: &[Turn]) -> Answer {
        self.compose_detailed(query, context, history).await.answer
    }

    /// Compose an answer, reporting how it was reached
    pub async fn compose_detailed(
        &self,
        query: &str,
        context: &RetrievedContext,
        history: &[Turn],
    ) -> Composition {
        let request = PromptBuilder::new(query, context)
            .with_history(history.to_vec())
            .with_owner(self.owner.as_deref())
            .build();

        let (result, attempts) = self.call_with_retry(&request).await;

        match result {
            Ok(reply) => {
                let (answer, outcome, violation) = enforce_grounding(reply, context);
                Composition {
                    answer,
                    outcome,
                    violation,
                    attempts,
                }
            }
            Err(e) => {
                warn!(
                    "Model backend {} failed after {} attempt(s): {}",
                    self.backend.name(),
                    attempts,
                    e
                );
                Composition {
                    answer: Answer::refusal(APOLOGY_MESSAGE),
                    outcome: CompositionOutcome::BackendFailure,
                    violation: None,
                    attempts,
                }
            }
        }
    }

    /// One attempt plus up to `max_retries` retries on transient failure
    ///
    /// Every attempt is bounded by the model timeout; an attempt that runs
    /// out of time counts as transient.
    async fn call_with_retry(&self, request: &ModelRequest) -> (Result<ModelReply, BackendError>, u32) {
        let max_attempts = self.config.max_retries + 1;
        let mut attempts = 0;

        loop {
            if attempts > 0 {
                let delay = self.config.backoff(attempts);
                debug!("Retrying model call in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
            attempts += 1;

            let error = match tokio::time::timeout(
                self.config.model_timeout(),
                self.backend.complete(request),
            )
            .await
            {
                Ok(Ok(reply)) => return (Ok(reply), attempts),
                Ok(Err(e)) if !e.is_transient() => return (Err(e), attempts),
                Ok(Err(e)) => e,
                Err(_) => BackendError::Transient(format!(
                    "Model call timed out after {:?}",
                    self.config.model_timeout()
                )),
            };

            warn!("Model attempt {}/{} failed: {}", attempts, max_attempts, error);
            if attempts >= max_attempts {
                return (Err(error), attempts);
            }
        }
    }
}

/// Shape a model reply into an answer whose citations lie inside `context`
fn enforce_grounding(
    reply: ModelReply,
    context: &RetrievedContext,
) -> (Answer, CompositionOutcome, Option<GroundingViolation>) {
    let (kept, stripped): (Vec<String>, Vec<String>) = reply
        .cited_ids
        .into_iter()
        .partition(|id| context.contains(id));

    let violation = if stripped.is_empty() {
        None
    } else {
        let violation = GroundingViolation { stripped };
        warn!("{}", violation);
        Some(violation)
    };

    if reply.declined {
        info!("Model declined to answer");
        return (Answer::refusal(reply.text), CompositionOutcome::Declined, violation);
    }

    if kept.is_empty() && violation.is_some() {
        return (
            Answer::refusal(FALLBACK_MESSAGE),
            CompositionOutcome::GroundingRefusal,
            violation,
        );
    }

    let cited: BTreeSet<EntryId> = kept.into_iter().map(EntryId::from).collect();
    let outcome = if cited.is_empty() {
        CompositionOutcome::Generic
    } else {
        CompositionOutcome::Grounded
    };

    (Answer::grounded(reply.text, cited), outcome, violation)
}
