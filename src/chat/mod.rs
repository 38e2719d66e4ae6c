//! Conversation model and controller.
//!
//! This module owns everything the widget knows about a conversation: the
//! message model, the append-only [`Transcript`] and the
//! [`ConversationController`] that drives the send/receive cycle.
//!
//! # Message roles
//!
//! - [`MessageRole::User`]: text typed by the visitor
//! - [`MessageRole::Bot`]: greeting and replies from the endpoint
//! - [`MessageRole::Error`]: a failed exchange
//! - [`MessageRole::Pending`]: the transient typing indicator

pub mod controller;
pub mod transcript;

pub use controller::{ConversationController, ControllerConfig, IgnoreReason, SubmitOutcome};
pub use transcript::Transcript;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting shown as the first transcript entry.
pub const GREETING: &str = "Hi 👋 How can I help you?";

/// Text of the typing indicator.
pub const PENDING_TEXT: &str = "Typing...";

/// Text shown when an exchange fails. The failure detail is only logged.
pub const ERROR_TEXT: &str = "Error: Could not get response";

/// Category of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Greeting or reply from the endpoint.
    Bot,
    /// Failed exchange.
    Error,
    /// Typing indicator while a reply is awaited.
    Pending,
}

/// Identifier of a transcript entry, equal to its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position in append order. Never reused, even after removal.
    pub sequence: u64,
    /// Category of the entry.
    pub role: MessageRole,
    /// Displayed text.
    pub text: String,
    /// Time the entry was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Identifier used for removal notifications.
    #[must_use]
    pub fn id(&self) -> MessageId {
        MessageId(self.sequence)
    }
}

/// Observable request state of a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Whether a reply is currently awaited.
    pub awaiting_reply: bool,
}
