//! Integration tests for the Q&A service

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use folio_engine::NO_ANSWER_PLACEHOLDER;
use folio_llm::BackendKind;
use folio_server::{
    bootstrap::build_engine,
    config::{EmbeddingKind, ServerConfig},
    handlers::{create_router, AppState, AskResponse, ErrorResponse, HealthCheckResponse},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

/// Helper to create test application state over the sample portfolio
async fn create_test_state() -> AppState {
    let mut config = ServerConfig::default_test_config();
    config.knowledge_path = repo_file("data/portfolio.toml");

    AppState {
        engine: Arc::new(build_engine(&config).await.unwrap()),
    }
}

async fn post_ask(state: AppState, body: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_router(create_test_state().await);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthCheckResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.knowledge_version, "2024.06");
    assert_eq!(health.entries, 7);
    assert_eq!(health.live_sessions, 0);
}

#[tokio::test]
async fn test_ask_returns_grounded_answer() {
    let state = create_test_state().await;

    let (status, body) = post_ask(state, r#"{"message": "What AI projects have you built?"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let reply: AskResponse = serde_json::from_slice(&body).unwrap();
    assert!(!reply.session_id.is_empty());
    assert!(!reply.answer.refused);
    assert!(reply.answer.text.contains("Chat App"));
    assert!(reply.answer.cited_entry_ids.contains(&"p-chat".to_string()));
}

#[tokio::test]
async fn test_ask_continues_session() {
    let state = create_test_state().await;

    let (_, body) = post_ask(state.clone(), r#"{"session_id": "visitor-1", "message": "rust"}"#).await;
    let first: AskResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(first.session_id, "visitor-1");

    let (_, body) = post_ask(state.clone(), r#"{"session_id": "visitor-1", "message": "go"}"#).await;
    let second: AskResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(second.session_id, "visitor-1");

    let history = state
        .engine
        .history(&"visitor-1".into())
        .await
        .unwrap();
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|t| t.text != NO_ANSWER_PLACEHOLDER));
}

#[tokio::test]
async fn test_ask_empty_message_is_bad_request() {
    let state = create_test_state().await;

    let (status, body) = post_ask(state.clone(), r#"{"message": ""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(error.error.contains("empty"));
    assert!(state.engine.sessions().is_empty());
}

#[tokio::test]
async fn test_ask_malformed_body_is_rejected() {
    let state = create_test_state().await;

    let (status, _) = post_ask(state, r#"{"text": "wrong field"}"#).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_schema_endpoint() {
    let app = create_router(create_test_state().await);

    let request = Request::builder()
        .method("GET")
        .uri("/schema/qa")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/ld+json"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(page["@type"], "FAQPage");
    assert_eq!(page["mainEntity"].as_array().unwrap().len(), 7);
}

#[test]
fn test_sample_config_file() {
    let config = ServerConfig::from_file(repo_file("config/folio.toml")).unwrap();

    assert_eq!(config.bind_port, 8080);
    assert_eq!(config.backend.kind, BackendKind::Ollama);
    assert_eq!(config.embedding.unwrap().kind, EmbeddingKind::Hashed);
    assert!(config.knowledge_path.exists());
}
