//! Line-oriented renderer for terminal hosts.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Renderer;
use crate::chat::{ConversationState, Message, MessageId, MessageRole};

const RESET: &str = "\x1b[0m";
const CLEAR_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K\r";

/// Static text framing the chat panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalChrome {
    /// Panel title.
    pub title: String,
    /// Line shown under the title.
    pub subtitle: String,
    /// Attribution line under the transcript.
    pub footer: String,
}

impl Default for TerminalChrome {
    fn default() -> Self {
        Self {
            title: "Chat with RK Nature".to_string(),
            subtitle: "We are online!".to_string(),
            footer: "Powered by R K Nature".to_string(),
        }
    }
}

/// Draws the transcript as one line per message.
///
/// The panel can be closed, in which case notifications are still tracked
/// but nothing is drawn until it is reopened. Reopening redraws every
/// message currently in the transcript.
pub struct TerminalRenderer<W> {
    chrome: TerminalChrome,
    ansi: bool,
    inner: Mutex<TerminalState<W>>,
}

struct TerminalState<W> {
    out: W,
    open: bool,
    history: Vec<Message>,
    /// The typing indicator is the last line on screen.
    indicator_drawn: bool,
    awaiting_reply: bool,
}

impl<W> fmt::Debug for TerminalRenderer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("chrome", &self.chrome)
            .field("ansi", &self.ansi)
            .finish()
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Create a closed panel writing to `out`.
    pub fn new(out: W, chrome: TerminalChrome, ansi: bool) -> Self {
        Self {
            chrome,
            ansi,
            inner: Mutex::new(TerminalState {
                out,
                open: false,
                history: Vec::new(),
                indicator_drawn: false,
                awaiting_reply: false,
            }),
        }
    }

    /// Open or close the panel. Returns the new state.
    pub fn set_open(&self, open: bool) -> bool {
        let mut state = self.lock();
        if state.open == open {
            return open;
        }
        state.open = open;

        let mut frame = String::new();
        if open {
            frame.push_str(&format!(
                "── {} · {} ──\n",
                self.chrome.title, self.chrome.subtitle
            ));
            for message in &state.history {
                frame.push_str(&self.format_line(message));
            }
            state.indicator_drawn = state
                .history
                .last()
                .is_some_and(|m| m.role == MessageRole::Pending);
        } else {
            frame.push_str(&format!("── {} ──\n💬\n", self.chrome.footer));
            state.indicator_drawn = false;
        }
        write_out(&mut state.out, &frame);
        open
    }

    /// Flip the panel between open and closed. Returns the new state.
    pub fn toggle(&self) -> bool {
        let open = self.is_open();
        self.set_open(!open)
    }

    /// Whether the panel is currently drawn.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Whether the last state notification reported an outstanding request.
    pub fn is_awaiting_reply(&self) -> bool {
        self.lock().awaiting_reply
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn format_line(&self, message: &Message) -> String {
        let (label, color) = match message.role {
            MessageRole::User => ("you", "\x1b[36m"),
            MessageRole::Bot => ("bot", "\x1b[34m"),
            MessageRole::Error => ("error", "\x1b[31m"),
            MessageRole::Pending => ("bot", "\x1b[2;3m"),
        };
        // Continuation lines line up under the first character of the text.
        let indent = " ".repeat(label.len() + 2);
        let text = message.text.replace('\n', &format!("\n{indent}"));

        if self.ansi {
            format!("{color}{label}: {text}{RESET}\n")
        } else {
            format!("{label}: {text}\n")
        }
    }
}

fn write_out<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        tracing::warn!(error = %e, "Failed to write to terminal");
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn on_message_appended(&self, message: &Message) {
        let line = self.format_line(message);
        let mut state = self.lock();
        state.history.push(message.clone());
        if state.open {
            write_out(&mut state.out, &line);
            state.indicator_drawn = message.role == MessageRole::Pending;
        }
    }

    fn on_message_removed(&self, id: MessageId) {
        let mut state = self.lock();
        state.history.retain(|m| m.id() != id);
        if state.open && state.indicator_drawn {
            if self.ansi {
                write_out(&mut state.out, CLEAR_PREVIOUS_LINE);
            }
            state.indicator_drawn = false;
        }
    }

    fn on_state_changed(&self, state: ConversationState) {
        self.lock().awaiting_reply = state.awaiting_reply;
    }
}
