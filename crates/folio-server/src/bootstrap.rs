//! Engine construction from server configuration

use crate::config::{EmbeddingConfig, EmbeddingKind, ServerConfig};
use crate::ServerError;
use folio_domain::EmbeddingBackend;
use folio_engine::QaEngine;
use folio_llm::{build_backend, OllamaEmbedder};
use folio_store::embedding::HashedEmbedder;
use folio_store::KnowledgeStore;
use std::sync::Arc;
use tracing::info;

/// Construct the configured embedding backend
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingBackend>, ServerError> {
    let embedder: Arc<dyn EmbeddingBackend> = match config.kind {
        EmbeddingKind::Hashed => Arc::new(HashedEmbedder::new(config.dimension)),
        EmbeddingKind::Ollama => Arc::new(OllamaEmbedder::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs,
        )?),
    };
    info!("Semantic retrieval enabled ({:?} embeddings)", config.kind);
    Ok(embedder)
}

/// Load the knowledge file and build a ready engine
///
/// A knowledge file that fails to load is fatal.
pub async fn build_engine(config: &ServerConfig) -> Result<QaEngine, ServerError> {
    let store = Arc::new(KnowledgeStore::from_path(&config.knowledge_path)?);
    let backend = build_backend(&config.backend)?;
    let engine = QaEngine::new(store, backend, config.engine.clone())?;

    match &config.embedding {
        Some(embedding) => Ok(engine.with_embedder(build_embedder(embedding)?).await),
        None => Ok(engine),
    }
}
