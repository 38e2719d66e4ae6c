//! Append-only conversation transcript.

use chrono::Utc;

use super::{Message, MessageId, MessageRole};

/// Ordered list of messages shown to the user.
///
/// Entries are only ever appended, except for the single typing indicator,
/// which may be removed. Sequence numbers strictly increase in append order
/// and are never reused.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_sequence: u64,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a copy of it.
    ///
    /// At most one typing indicator exists: appending a
    /// [`MessageRole::Pending`] entry while one is present returns the
    /// existing indicator unchanged.
    pub fn append(&mut self, role: MessageRole, text: impl Into<String>) -> Message {
        if role == MessageRole::Pending
            && let Some(existing) = self.pending()
        {
            return existing.clone();
        }

        let message = Message {
            sequence: self.next_sequence,
            role,
            text: text.into(),
            created_at: Utc::now(),
        };
        self.next_sequence += 1;
        self.messages.push(message.clone());
        message
    }

    /// Remove the typing indicator, returning its id if one was present.
    pub fn remove_pending(&mut self) -> Option<MessageId> {
        let index = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::Pending)?;
        Some(self.messages.remove(index).id())
    }

    /// The current typing indicator, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Pending)
    }

    /// All messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message still present.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the transcript has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over messages in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
