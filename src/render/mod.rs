//! Presentation collaborators driven by the controller.
//!
//! The controller never lays anything out itself. It reports transcript and
//! state changes to a [`Renderer`], which is free to draw them however the
//! host environment requires.
//!
//! - [`TerminalRenderer`]: line-oriented output for the terminal host
//! - [`RecordingRenderer`]: keeps every notification, for embedders and tests

mod terminal;

pub use terminal::{TerminalChrome, TerminalRenderer};

use std::sync::Mutex;

use crate::chat::{ConversationState, Message, MessageId};

/// Receives transcript and state notifications.
///
/// Calls arrive synchronously in mutation order, after the controller has
/// released its state, so an implementation may read the controller back
/// while drawing. Removals only ever target the trailing typing indicator.
pub trait Renderer: Send + Sync + std::fmt::Debug {
    /// A message was appended to the transcript.
    fn on_message_appended(&self, message: &Message);

    /// The message with `id` was removed from the transcript.
    fn on_message_removed(&self, id: MessageId);

    /// The request state changed.
    fn on_state_changed(&self, state: ConversationState);
}

/// A single renderer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// See [`Renderer::on_message_appended`].
    Appended(Message),
    /// See [`Renderer::on_message_removed`].
    Removed(MessageId),
    /// See [`Renderer::on_state_changed`].
    StateChanged(ConversationState),
}

/// Renderer that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notifications received so far.
    #[must_use]
    pub fn events(&self) -> Vec<RenderEvent> {
        self.lock().clone()
    }

    /// Replay the notifications into the list of messages currently displayed.
    #[must_use]
    pub fn visible(&self) -> Vec<Message> {
        let mut visible: Vec<Message> = Vec::new();
        for event in self.lock().iter() {
            match event {
                RenderEvent::Appended(message) => visible.push(message.clone()),
                RenderEvent::Removed(id) => visible.retain(|m| m.id() != *id),
                RenderEvent::StateChanged(_) => {}
            }
        }
        visible
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RenderEvent>> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Renderer for RecordingRenderer {
    fn on_message_appended(&self, message: &Message) {
        self.lock().push(RenderEvent::Appended(message.clone()));
    }

    fn on_message_removed(&self, id: MessageId) {
        self.lock().push(RenderEvent::Removed(id));
    }

    fn on_state_changed(&self, state: ConversationState) {
        self.lock().push(RenderEvent::StateChanged(state));
    }
}
