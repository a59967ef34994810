//! Relevance ranking over the knowledge store
//!
//! Entries are tokenised once, when the retriever is built. A query is scored
//! against every entry by weighted term overlap, optionally blended with
//! embedding cosine similarity, then ranked and cut to the configured bound.

use crate::config::RetrievalConfig;
use folio_domain::text::terms;
use folio_domain::{EmbeddingBackend, PortfolioEntry, RetrievedContext, ScoredEntry};
use folio_store::embedding::cosine_similarity;
use folio_store::KnowledgeStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

const TITLE_WEIGHT: f32 = 2.0;
const TAG_WEIGHT: f32 = 2.0;
const BODY_WEIGHT: f32 = 1.0;
const CATEGORY_WEIGHT: f32 = 1.0;
const MAX_TERM_WEIGHT: f32 = 2.0;

/// An entry with its precomputed term sets
struct IndexedEntry {
    entry: Arc<PortfolioEntry>,
    title_terms: HashSet<String>,
    body_terms: HashSet<String>,
    tag_terms: HashSet<String>,
    category_terms: HashSet<String>,
    vector: Option<Vec<f32>>,
}

impl IndexedEntry {
    fn new(entry: Arc<PortfolioEntry>) -> Self {
        let tag_terms = entry.tags.iter().flat_map(|t| terms(t)).collect();
        Self {
            title_terms: terms(&entry.title).into_iter().collect(),
            body_terms: terms(&entry.body).into_iter().collect(),
            category_terms: terms(entry.category.as_str()).into_iter().collect(),
            tag_terms,
            vector: None,
            entry,
        }
    }

    /// Heaviest field a term appears in, 0 if none
    fn term_weight(&self, term: &str) -> f32 {
        if self.title_terms.contains(term) {
            TITLE_WEIGHT
        } else if self.tag_terms.contains(term) {
            TAG_WEIGHT
        } else if self.body_terms.contains(term) {
            BODY_WEIGHT
        } else if self.category_terms.contains(term) {
            CATEGORY_WEIGHT
        } else {
            0.0
        }
    }

    fn lexical_score(&self, query_terms: &[String]) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let matched: f32 = query_terms.iter().map(|t| self.term_weight(t)).sum();
        matched / (query_terms.len() as f32 * MAX_TERM_WEIGHT)
    }

    fn embedding_text(&self) -> String {
        let tags: Vec<&str> = self.entry.tags.iter().map(String::as_str).collect();
        format!(
            "{} {} {} {}",
            self.entry.title,
            self.entry.category.as_str(),
            tags.join(" "),
            self.entry.body
        )
    }
}

/// Ranks knowledge entries against a query
///
/// # Examples
///
/// ```
/// use folio_domain::{Category, PortfolioEntry};
/// use folio_engine::{RetrievalConfig, Retriever};
/// use folio_store::KnowledgeStore;
///
/// # tokio_test_block_on(async {
/// let entry = PortfolioEntry::new("p1", Category::Project, "Chat App", "Built with streaming inference")
///     .with_tags(["ai", "web"]);
/// let store = KnowledgeStore::from_entries("1", None, vec![entry]).unwrap();
/// let retriever = Retriever::new(&store, RetrievalConfig::default());
///
/// let context = retriever.retrieve("What AI projects have you built?", 8).await;
/// assert!(context.contains("p1"));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Retriever {
    entries: Vec<IndexedEntry>,
    embedder: Option<Arc<dyn EmbeddingBackend>>,
    config: RetrievalConfig,
}

impl Retriever {
    /// Build a lexical-only retriever over every entry in `store`
    pub fn new(store: &KnowledgeStore, config: RetrievalConfig) -> Self {
        let entries = store.load().iter().cloned().map(IndexedEntry::new).collect();
        Self {
            entries,
            embedder: None,
            config,
        }
    }

    /// Add semantic scoring
    ///
    /// Embeds every entry up front. If any entry fails to embed the retriever
    /// stays lexical-only rather than scoring entries unevenly.
    pub async fn with_embedder(mut self, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        let mut vectors = Vec::with_capacity(self.entries.len());
        for indexed in &self.entries {
            let text = indexed.embedding_text();
            match tokio::time::timeout(self.config.embedding_timeout(), embedder.embed(&text)).await {
                Ok(Ok(vector)) => vectors.push(vector),
                Ok(Err(e)) => {
                    warn!(
                        "Embedding entry {} failed, using lexical retrieval only: {}",
                        indexed.entry.id, e
                    );
                    return self;
                }
                Err(_) => {
                    warn!(
                        "Embedding entry {} timed out, using lexical retrieval only",
                        indexed.entry.id
                    );
                    return self;
                }
            }
        }

        for (indexed, vector) in self.entries.iter_mut().zip(vectors) {
            indexed.vector = Some(vector);
        }
        debug!("Embedded {} knowledge entries", self.entries.len());
        self.embedder = Some(embedder);
        self
    }

    /// Whether semantic scoring is active
    pub fn has_embeddings(&self) -> bool {
        self.embedder.is_some()
    }

    /// Retrieval policy in use
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Rank entries against `query`
    ///
    /// Returns at most `max_results` hits (further capped by the configured
    /// maximum), relevance descending with ties broken by id. Entries scoring
    /// at or below the minimum relevance are dropped, so an unrelated query
    /// yields an empty context.
    pub async fn retrieve(&self, query: &str, max_results: usize) -> RetrievedContext {
        let query_terms = dedup(terms(query));
        let query_vector = self.embed_query(query).await;
        let limit = max_results.min(self.config.max_results);

        let mut hits: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|indexed| ScoredEntry {
                entry: Arc::clone(&indexed.entry),
                score: self.score(indexed, &query_terms, query_vector.as_deref()),
            })
            .filter(|hit| hit.score > self.config.min_relevance)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        hits.truncate(limit);

        debug!(
            "Retrieved {} entries for {} query terms{}",
            hits.len(),
            query_terms.len(),
            if query_vector.is_some() { " (semantic)" } else { "" }
        );

        RetrievedContext::new(hits)
    }

    fn score(&self, indexed: &IndexedEntry, query_terms: &[String], query_vector: Option<&[f32]>) -> f32 {
        let lexical = indexed.lexical_score(query_terms);
        match (query_vector, indexed.vector.as_deref()) {
            (Some(q), Some(v)) => {
                let semantic = cosine_similarity(q, v).max(0.0);
                let total = self.config.lexical_weight + self.config.semantic_weight;
                (self.config.lexical_weight * lexical + self.config.semantic_weight * semantic) / total
            }
            _ => lexical,
        }
    }

    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        match tokio::time::timeout(self.config.embedding_timeout(), embedder.embed(query)).await {
            Ok(Ok(vector)) => Some(vector),
            Ok(Err(e)) => {
                debug!("Query embedding failed, scoring lexically: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Query embedding timed out after {:?}, scoring lexically",
                    self.config.embedding_timeout()
                );
                None
            }
        }
    }
}

fn dedup(mut query_terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    query_terms.retain(|t| seen.insert(t.clone()));
    query_terms
}
