//! Ollama Provider Implementation
//!
//! Grounded answers via Ollama's `/api/chat` in JSON mode, and embeddings via
//! `/api/embeddings`, for running the portfolio assistant on a local model.
//!
//! # Examples
//!
//! ```no_run
//! use folio_llm::OllamaBackend;
//!
//! let backend = OllamaBackend::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::http::{build_client, request_error, status_error, DEFAULT_TIMEOUT_SECS};
use crate::reply::parse_reply;
use crate::LlmError;
use async_trait::async_trait;
use folio_domain::{
    BackendError, EmbeddingBackend, GroundingItem, ModelBackend, ModelReply, ModelRequest, Role,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama chat backend for local LLM inference
///
/// Performs exactly one HTTP attempt per call; the composer owns retries.
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: &'static str,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// Response from Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

/// Render grounding entries as a plain-text block for the system message
fn render_context(items: &[GroundingItem]) -> String {
    if items.is_empty() {
        return "Context entries: none.".to_string();
    }

    let mut out = String::from("Context entries:\n");
    for item in items {
        out.push_str(&format!("[{}] {}\n{}\n\n", item.id, item.title, item.body));
    }
    out.trim_end().to_string()
}

fn build_messages(request: &ModelRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);

    messages.push(ChatMessage {
        role: "system",
        content: format!(
            "{}\n\n{}",
            request.system_instructions,
            render_context(&request.grounding_context)
        ),
    });

    for turn in &request.history {
        messages.push(ChatMessage {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: turn.text.clone(),
        });
    }

    messages.push(ChatMessage {
        role: "user",
        content: request.query.clone(),
    });

    messages
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a backend with a custom client-side timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::Config("Ollama model name is required".to_string()));
        }

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model,
            client: build_client(timeout_secs)?,
            temperature: 0.2,
        })
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, BackendError> {
        let url = format!("{}/api/chat", self.endpoint);

        let body = OllamaChatRequest {
            model: &self.model,
            messages: build_messages(request),
            stream: false,
            format: "json",
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        let chat: OllamaChatResponse = response.json().await.map_err(request_error)?;
        debug!(
            "Ollama model {} replied with {} chars",
            self.model,
            chat.message.content.len()
        );

        parse_reply(&chat.message.content)
    }
}

/// Ollama embeddings backend
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create an embedder using `model` (e.g., "nomic-embed-text")
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::Config("Embedding model name is required".to_string()));
        }

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model,
            client: build_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let body = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text));
        }

        let parsed: OllamaEmbeddingResponse = response.json().await.map_err(request_error)?;
        if parsed.embedding.is_empty() {
            return Err(BackendError::Malformed("Empty embedding".to_string()));
        }
        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::Turn;

    fn request() -> ModelRequest {
        ModelRequest {
            system_instructions: "Answer only from context.".to_string(),
            grounding_context: vec![GroundingItem {
                id: "p1".to_string(),
                title: "Chat App".to_string(),
                body: "Built with streaming inference".to_string(),
            }],
            history: vec![Turn::user("hi", 1), Turn::assistant("hello!", 2)],
            query: "What AI projects have you built?".to_string(),
        }
    }

    #[test]
    fn test_ollama_backend_creation() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.1").unwrap();
        assert_eq!(backend.endpoint, "http://localhost:11434");
        assert_eq!(backend.model(), "llama3.1");
    }

    #[test]
    fn test_model_required() {
        assert!(matches!(
            OllamaBackend::new(DEFAULT_ENDPOINT, " "),
            Err(LlmError::Config(_))
        ));
        assert!(OllamaEmbedder::new(DEFAULT_ENDPOINT, "", 5).is_err());
    }

    #[test]
    fn test_messages_layout() {
        let messages = build_messages(&request());
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("[p1] Chat App"));
        assert!(messages[0].content.starts_with("Answer only from context."));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "What AI projects have you built?");
    }

    #[test]
    fn test_render_empty_context() {
        assert_eq!(render_context(&[]), "Context entries: none.");
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_complete_integration() {
        let backend = OllamaBackend::new(DEFAULT_ENDPOINT, "llama3.1").unwrap();
        if let Ok(reply) = backend.complete(&request()).await {
            assert!(!reply.text.is_empty());
        }
    }

    #[tokio::test]
    async fn test_ollama_unreachable_is_transient() {
        let backend = OllamaBackend::with_timeout("http://127.0.0.1:1", "llama3.1", 2).unwrap();
        let result = backend.complete(&request()).await;
        assert!(matches!(result, Err(BackendError::Transient(_))));
    }
}
