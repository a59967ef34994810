//! Offline text embeddings for semantic retrieval
//!
//! The [`HashedEmbedder`] projects normalised terms into a fixed number of
//! buckets (feature hashing). It needs no model files or network, is fully
//! deterministic, and texts that share vocabulary land close together, which
//! is enough to exercise the retriever's semantic blend without a remote
//! embedding service.
//!
//! # Examples
//!
//! ```
//! use folio_store::embedding::{cosine_similarity, HashedEmbedder};
//!
//! let model = HashedEmbedder::new(256);
//! let a = model.embed_text("streaming chat application").unwrap();
//! let b = model.embed_text("a chat app with streaming").unwrap();
//! let c = model.embed_text("database indexing").unwrap();
//!
//! assert_eq!(a.len(), 256);
//! assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
//! ```

use async_trait::async_trait;
use folio_domain::text::terms;
use folio_domain::{BackendError, EmbeddingBackend};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default number of hash buckets
pub const DEFAULT_DIMENSION: usize = 384;

/// Deterministic feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    /// Create an embedder with `dimension` buckets (minimum 1)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, term: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        term.hash(&mut hasher);
        let hash = hasher.finish();

        // Low bits pick the bucket, one high bit the sign, so collisions cancel
        // out on average instead of piling up.
        let index = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    /// Embed synchronously
    ///
    /// Fails for text with no meaningful terms (empty or stopwords only).
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let terms = terms(text);
        if terms.is_empty() {
            return Err(BackendError::Rejected(
                "Text has no terms to embed".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for term in &terms {
            let (index, sign) = self.bucket(term);
            embedding[index] += sign;
        }

        // Normalize to unit length for cosine similarity
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingBackend for HashedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        self.embed_text(text)
    }
}

/// Cosine similarity between two vectors
///
/// Returns a value in `[-1, 1]`; vectors of different length or zero magnitude
/// score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_deterministic() {
        let model = HashedEmbedder::new(384);
        let text = "Distributed systems engineer";
        assert_eq!(model.embed_text(text).unwrap(), model.embed_text(text).unwrap());
    }

    #[test]
    fn test_embedding_dimension() {
        let model = HashedEmbedder::new(128);
        assert_eq!(model.embed_text("rust").unwrap().len(), 128);
        assert_eq!(model.dimension(), 128);
        assert_eq!(HashedEmbedder::new(0).dimension(), 1);
    }

    #[test]
    fn test_embedding_normalized() {
        let model = HashedEmbedder::default();
        let embedding = model.embed_text("kubernetes operators in go").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_stopword_only_text_rejected() {
        let model = HashedEmbedder::default();
        assert!(model.embed_text("what is it").is_err());
        assert!(model.embed_text("").is_err());
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let model = HashedEmbedder::default();
        let query = model.embed_text("machine learning projects").unwrap();
        let related = model.embed_text("A machine learning project for images").unwrap();
        let unrelated = model.embed_text("Bakery point of sale").unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let vec = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec, &vec) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(similarity.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[tokio::test]
    async fn test_embedding_backend_impl() {
        let model = HashedEmbedder::new(64);
        let vector = model.embed("rust services").await.unwrap();
        assert_eq!(vector.len(), 64);
    }
}
