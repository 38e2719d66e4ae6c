//! HTTP transport backed by `reqwest`.

use url::Url;

use super::{ChatError, ChatReply, ChatRequest, Transport};

/// Posts chat requests over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use chatbot_widget::transport::{ChatRequest, HttpTransport, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new();
/// let reply = transport
///     .post(
///         "http://localhost:5000/submit_query",
///         &ChatRequest { session_id: "sess_abc".into(), query: "Hello!".into() },
///     )
///     .await?;
/// println!("{}", reply.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with a custom reqwest client.
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let url = Url::parse(url).map_err(|e| ChatError::Transport(format!("invalid URL: {e}")))?;

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Endpoint rejected chat request");
            return Err(ChatError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        ChatReply::from_json(&body)
    }
}
