//! HTTP request handlers for the Q&A service.
//!
//! Implements the ask, health and structured-data endpoints using axum.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use folio_domain::{Answer, SessionId};
use folio_engine::{EngineError, QaEngine};
use folio_store::schema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The engine answering questions
    pub engine: Arc<QaEngine>,
}

/// Ask request
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    /// Session to continue; a new one is started when absent
    #[serde(default)]
    pub session_id: Option<String>,
    /// The visitor's message
    pub message: String,
}

/// Answer as sent to the chat UI
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerBody {
    /// Answer text
    pub text: String,
    /// Entries the answer relies on
    pub cited_entry_ids: Vec<String>,
    /// The engine declined to answer
    pub refused: bool,
}

impl From<Answer> for AnswerBody {
    fn from(answer: Answer) -> Self {
        Self {
            text: answer.text,
            cited_entry_ids: answer.cited_entry_ids.iter().map(|id| id.to_string()).collect(),
            refused: answer.refused,
        }
    }
}

/// Ask response
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// Session the exchange was recorded in; send it with the next message
    pub session_id: String,
    /// The answer
    pub answer: AnswerBody,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Knowledge base version
    pub knowledge_version: String,
    /// Number of knowledge entries
    pub entries: usize,
    /// Live chat sessions
    pub live_sessions: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Longest session id a client may supply
pub const MAX_SESSION_ID_CHARS: usize = 128;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request field
    BadRequest(String),
    /// Engine error
    Engine(EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Engine(e @ EngineError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

/// POST /ask - Answer one message
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let session_id = match request.session_id {
        Some(id) if id.chars().count() > MAX_SESSION_ID_CHARS => {
            return Err(AppError::BadRequest(format!(
                "Session id too long (max: {} chars)",
                MAX_SESSION_ID_CHARS
            )));
        }
        Some(id) if !id.trim().is_empty() => SessionId::from(id),
        _ => SessionId::generate(),
    };

    let reply = state.engine.ask(&session_id, &request.message).await?;

    Ok(Json(AskResponse {
        session_id: reply.session_id.to_string(),
        answer: reply.answer.into(),
    }))
}

/// GET /health - Service health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let store = state.engine.store();

    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        knowledge_version: store.version().to_string(),
        entries: store.len(),
        live_sessions: state.engine.sessions().len(),
    })
}

/// GET /schema/qa - FAQPage JSON-LD for search engines
async fn qa_schema(State(state): State<AppState>) -> Response {
    let page = schema::qa_page(state.engine.store());
    (
        [(axum::http::header::CONTENT_TYPE, "application/ld+json")],
        Json(page),
    )
        .into_response()
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/ask", post(ask))
        .route("/health", get(health_check))
        .route("/schema/qa", get(qa_schema))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use folio_domain::{Category, PortfolioEntry};
    use folio_engine::EngineConfig;
    use folio_llm::MockBackend;
    use folio_store::KnowledgeStore;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let store = KnowledgeStore::from_entries(
            "1",
            None,
            vec![PortfolioEntry::new("p1", Category::Project, "Chat App", "Streaming chat")],
        )
        .unwrap();
        let engine = QaEngine::new(
            Arc::new(store),
            Arc::new(MockBackend::echo()),
            EngineConfig::default(),
        )
        .unwrap();

        AppState {
            engine: Arc::new(engine),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ask() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message": "tell me about the chat app"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ask_blank_message_is_bad_request() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"session_id": "s1", "message": "   "}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_oversized_session_id_is_bad_request() {
        let state = create_test_state();
        let body = serde_json::json!({
            "session_id": "s".repeat(MAX_SESSION_ID_CHARS + 1),
            "message": "tell me about the chat app",
        });

        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_ask_session_id_at_limit_is_accepted() {
        let body = serde_json::json!({
            "session_id": "s".repeat(MAX_SESSION_ID_CHARS),
            "message": "tell me about the chat app",
        });

        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = create_router(create_test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
