//! Outbound message exchange with the chat endpoint.
//!
//! The wire contract is a single JSON POST per user message:
//!
//! ```text
//! POST <endpoint_url>
//! Content-Type: application/json
//!
//! {"SessionId": "sess_abc", "Query": "Price?"}
//! ```
//!
//! answered by a JSON object carrying the reply text in `response`.
//!
//! - [`Transport`]: The async seam the controller sends through
//! - [`HttpTransport`]: `reqwest` implementation
//! - [`ChatError`]: Every way an exchange can fail

pub mod http;

pub use http::HttpTransport;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Session correlating the user's queries.
    #[serde(rename = "SessionId")]
    pub session_id: String,
    /// Trimmed user text.
    #[serde(rename = "Query")]
    pub query: String,
}

/// Reply body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text, displayed verbatim.
    pub response: String,
    /// Session echo from the backend, if any. Any JSON type is accepted.
    #[serde(rename = "SessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<serde_json::Value>,
}

impl ChatReply {
    /// Build a reply carrying only the text.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: None,
        }
    }

    /// Validate a raw JSON body against the reply schema.
    pub fn from_json(body: &[u8]) -> Result<Self, ChatError> {
        serde_json::from_slice(body).map_err(|e| ChatError::Protocol(e.to_string()))
    }
}

/// Failure of a single exchange.
///
/// All variants are collapsed into one user-visible error entry; the detail
/// only reaches the logs.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Network, DNS or connection failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status.
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// Body was not JSON or did not match the reply schema.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// No reply arrived within the configured timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The request was cancelled before a reply arrived.
    #[error("request cancelled")]
    Cancelled,
}

/// Sends one chat request and resolves with the endpoint's reply.
///
/// Implementations perform exactly one call per invocation and never retry.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// POST `request` as JSON to `url`.
    async fn post(&self, url: &str, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}
