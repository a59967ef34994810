//! Generic HTTP backend
//!
//! Posts the grounded-answer request as JSON to any endpoint that answers with
//! `{ "text": ..., "citedIds": [...] }`. This is the adapter for hosted model
//! gateways that already speak the engine's contract.

use crate::reply::parse_reply;
use crate::LlmError;
use async_trait::async_trait;
use folio_domain::{BackendError, ModelBackend, ModelReply, ModelRequest};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default client-side timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGrounding<'a> {
    id: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTurn<'a> {
    role: &'static str,
    text: &'a str,
    timestamp: u64,
}

/// Request body in the engine's wire shape
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    system_instructions: &'a str,
    grounding_context: Vec<WireGrounding<'a>>,
    history: Vec<WireTurn<'a>>,
    query: &'a str,
}

impl<'a> From<&'a ModelRequest> for WireRequest<'a> {
    fn from(request: &'a ModelRequest) -> Self {
        Self {
            system_instructions: &request.system_instructions,
            grounding_context: request
                .grounding_context
                .iter()
                .map(|g| WireGrounding {
                    id: &g.id,
                    title: &g.title,
                    body: &g.body,
                })
                .collect(),
            history: request
                .history
                .iter()
                .map(|t| WireTurn {
                    role: t.role.as_str(),
                    text: &t.text,
                    timestamp: t.timestamp_ms,
                })
                .collect(),
            query: &request.query,
        }
    }
}

/// Map a non-success HTTP status to a backend error
///
/// 5xx, 408 and 429 are worth retrying; everything else is a rejection.
pub(crate) fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = format!("HTTP {}: {}", status, body.trim());
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        BackendError::Transient(message)
    } else {
        BackendError::Rejected(message)
    }
}

/// Map a transport failure to a backend error
pub(crate) fn request_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Malformed(format!("Failed to decode response: {}", e))
    } else if e.is_builder() {
        BackendError::Rejected(format!("Invalid request: {}", e))
    } else {
        BackendError::Transient(format!("Request failed: {}", e))
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Client(e.to_string()))
}

/// Backend speaking the engine's own JSON contract over HTTP
pub struct HttpBackend {
    url: String,
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpBackend {
    /// Create a backend posting to `url`
    pub fn new(url: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a backend with a custom client-side timeout
    pub fn with_timeout(url: impl Into<String>, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            url: url.into(),
            client: build_client(timeout_secs)?,
            bearer_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait]
impl ModelBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, BackendError> {
        let body = WireRequest::from(request);

        let mut builder = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(request_error)?;
        let status = response.status();
        let text = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        debug!("HTTP backend replied with {} bytes", text.len());
        parse_reply(&text)
    }
}
