//! Conversation controller: single-flight message exchange.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{
    ConversationState, ERROR_TEXT, GREETING, Message, MessageRole, PENDING_TEXT, Transcript,
};
use crate::render::{RenderEvent, Renderer};
use crate::session::Session;
use crate::transport::{ChatError, ChatReply, ChatRequest, Transport};

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT_URL: &str = "https://rk-nature-backend.onrender.com/submit_query";

/// Default upper bound on a single exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// URL the chat requests are posted to.
    pub endpoint_url: String,
    /// Time after which an unanswered request is treated as failed.
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ControllerConfig {
    /// Default settings posting to `endpoint_url`.
    pub fn with_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Self::default()
        }
    }
}

/// Why a submission was dropped without touching the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty after trimming.
    EmptyInput,
}

/// Result of [`ConversationController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SubmitOutcome {
    /// The endpoint replied; carries the appended bot message.
    Replied(Message),
    /// The exchange failed; carries the appended error message.
    Failed(Message),
    /// Nothing was appended and nothing was sent.
    Ignored(IgnoreReason),
    /// Another request is still in flight; nothing was appended or sent.
    Busy,
}

/// Drives the send/receive cycle and owns the transcript.
///
/// The controller is an explicit instance with its collaborators injected,
/// so several independent widgets can coexist. Only one request is ever in
/// flight: [`submit`](Self::submit) returns [`SubmitOutcome::Busy`] while a
/// reply is awaited.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use chatbot_widget::chat::{ControllerConfig, ConversationController};
/// use chatbot_widget::render::RecordingRenderer;
/// use chatbot_widget::session::Session;
/// use chatbot_widget::transport::HttpTransport;
///
/// # async fn example() {
/// let controller = ConversationController::initialize(
///     ControllerConfig::with_endpoint("http://localhost:5000/submit_query"),
///     Session::from_id("sess_abc"),
///     Arc::new(HttpTransport::new()),
///     Arc::new(RecordingRenderer::new()),
/// );
/// let _ = controller.submit("  Price?  ").await;
/// # }
/// ```
#[derive(Debug)]
pub struct ConversationController {
    config: ControllerConfig,
    session: Session,
    transport: Arc<dyn Transport>,
    renderer: Arc<dyn Renderer>,
    inner: Mutex<ControllerState>,
}

#[derive(Debug, Default)]
struct ControllerState {
    transcript: Transcript,
    state: ConversationState,
    /// Cancels the outstanding request, if any.
    in_flight: Option<CancellationToken>,
}

impl ConversationController {
    /// Create a controller and post the greeting.
    pub fn initialize(
        config: ControllerConfig,
        session: Session,
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let controller = Self {
            config,
            session,
            transport,
            renderer,
            inner: Mutex::new(ControllerState::default()),
        };

        let mut events = Vec::new();
        {
            let mut inner = controller.lock();
            controller.append(&mut inner, &mut events, MessageRole::Bot, GREETING);
        }
        controller.notify(events);

        tracing::info!(
            name: "chat.initialized",
            session_id = %controller.session,
            endpoint = %controller.config.endpoint_url,
            "Chat controller initialized"
        );
        controller
    }

    /// Send `raw_text` to the endpoint and record the outcome.
    ///
    /// The returned future resolves once the reply, failure, timeout or
    /// cancellation has been written to the transcript. Dropping it early
    /// resolves the exchange as cancelled.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let query = raw_text.trim();
        if query.is_empty() {
            tracing::debug!(session_id = %self.session, "Ignoring empty input");
            return SubmitOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let mut events = Vec::new();
        let token = {
            let mut inner = self.lock();
            if inner.state.awaiting_reply {
                tracing::debug!(
                    session_id = %self.session,
                    "Submit rejected, a reply is still pending"
                );
                return SubmitOutcome::Busy;
            }

            self.append(&mut inner, &mut events, MessageRole::User, query);
            self.append(&mut inner, &mut events, MessageRole::Pending, PENDING_TEXT);
            inner.state.awaiting_reply = true;
            events.push(RenderEvent::StateChanged(inner.state));

            let token = CancellationToken::new();
            inner.in_flight = Some(token.clone());
            token
        };
        self.notify(events);

        let request = ChatRequest {
            session_id: self.session.id().to_string(),
            query: query.to_string(),
        };

        tracing::info!(
            name: "chat.request.sent",
            session_id = %self.session,
            query_length = query.len(),
            "Sending chat request"
        );

        let mut guard = InFlight {
            controller: self,
            armed: true,
        };
        let result = self.exchange(&request, &token).await;
        guard.armed = false;

        self.resolve(result)
    }

    /// Cancel the outstanding request, if any.
    ///
    /// The pending [`submit`](Self::submit) resolves through the failure path.
    /// Returns `false` when nothing was in flight.
    pub fn cancel(&self) -> bool {
        let inner = self.lock();
        match inner.in_flight.as_ref() {
            Some(token) => {
                tracing::info!(session_id = %self.session, "Cancelling chat request");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Copy of the current transcript.
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }

    /// Current request state.
    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.lock().state
    }

    /// Session the controller sends with.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// URL requests are posted to.
    #[must_use]
    pub fn endpoint_url(&self) -> &str {
        &self.config.endpoint_url
    }

    /// Controller settings.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn exchange(
        &self,
        request: &ChatRequest,
        token: &CancellationToken,
    ) -> Result<ChatReply, ChatError> {
        let timeout = self.config.request_timeout;
        let post = self.transport.post(&self.config.endpoint_url, request);

        tokio::select! {
            () = token.cancelled() => Err(ChatError::Cancelled),
            outcome = tokio::time::timeout(timeout, post) => match outcome {
                Ok(result) => result,
                Err(_elapsed) => Err(ChatError::Timeout(timeout)),
            },
        }
    }

    fn resolve(&self, result: Result<ChatReply, ChatError>) -> SubmitOutcome {
        let mut events = Vec::new();
        let mut inner = self.lock();

        if let Some(id) = inner.transcript.remove_pending() {
            events.push(RenderEvent::Removed(id));
        }
        inner.state.awaiting_reply = false;
        inner.in_flight = None;
        events.push(RenderEvent::StateChanged(inner.state));

        let outcome = match result {
            Ok(reply) => {
                tracing::info!(
                    name: "chat.reply.received",
                    session_id = %self.session,
                    reply_length = reply.response.len(),
                    "Received chat reply"
                );
                SubmitOutcome::Replied(self.append(
                    &mut inner,
                    &mut events,
                    MessageRole::Bot,
                    reply.response,
                ))
            }
            Err(e) => {
                tracing::warn!(
                    name: "chat.request.failed",
                    session_id = %self.session,
                    error = %e,
                    "Chat request failed"
                );
                SubmitOutcome::Failed(self.append(
                    &mut inner,
                    &mut events,
                    MessageRole::Error,
                    ERROR_TEXT,
                ))
            }
        };

        drop(inner);
        self.notify(events);
        outcome
    }

    /// Append to the transcript and queue the notification.
    ///
    /// A repeated typing indicator is not re-announced.
    fn append(
        &self,
        inner: &mut ControllerState,
        events: &mut Vec<RenderEvent>,
        role: MessageRole,
        text: impl Into<String>,
    ) -> Message {
        let repeated = role == MessageRole::Pending && inner.transcript.pending().is_some();
        let message = inner.transcript.append(role, text);
        if repeated {
            return message;
        }

        tracing::debug!(
            session_id = %self.session,
            sequence = message.sequence,
            role = ?message.role,
            "Appended message"
        );
        events.push(RenderEvent::Appended(message.clone()));
        message
    }

    /// Deliver queued notifications. Must be called with the state unlocked.
    fn notify(&self, events: Vec<RenderEvent>) {
        for event in events {
            match event {
                RenderEvent::Appended(message) => self.renderer.on_message_appended(&message),
                RenderEvent::Removed(id) => self.renderer.on_message_removed(id),
                RenderEvent::StateChanged(state) => self.renderer.on_state_changed(state),
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolves the exchange as cancelled if the submit future is dropped.
struct InFlight<'a> {
    controller: &'a ConversationController,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.controller.resolve(Err(ChatError::Cancelled));
        }
    }
}
