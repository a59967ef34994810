//! Retrieved context - the grounding set for one request

use crate::{EntryId, PortfolioEntry};
use std::sync::Arc;

/// An entry paired with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// Shared reference into the knowledge store
    pub entry: Arc<PortfolioEntry>,

    /// Blended relevance, higher is better
    pub score: f32,
}

/// Ranked entries for one query, relevance descending
///
/// Created per query and never persisted. An empty context means no grounding
/// is available.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    hits: Vec<ScoredEntry>,
}

impl RetrievedContext {
    /// Wrap already ranked hits
    pub fn new(hits: Vec<ScoredEntry>) -> Self {
        Self { hits }
    }

    /// Context with no grounding
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ranked hits
    pub fn hits(&self) -> &[ScoredEntry] {
        &self.hits
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when nothing scored above the relevance threshold
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Whether `id` is part of this context
    pub fn contains(&self, id: &str) -> bool {
        self.hits.iter().any(|h| h.entry.id.as_str() == id)
    }

    /// Entry ids in rank order
    pub fn ids(&self) -> Vec<EntryId> {
        self.hits.iter().map(|h| h.entry.id.clone()).collect()
    }
}
