//! Embeddable chat widget core.
//!
//! Relays user-typed text to a remote chat endpoint and keeps the transcript
//! a host renders. Everything environment-specific sits behind a trait, so
//! the core runs identically in a terminal, a test or any other host.
//!
//! # Architecture
//!
//! - **Session**: opaque session id kept stable per storage scope
//! - **Controller**: single-flight send/receive cycle over an append-only transcript
//! - **Transport**: one JSON POST per message, bounded by timeout and cancellation
//! - **Renderer**: reactive presentation, driven by transcript notifications
//!
//! # Modules
//!
//! - [`chat`]: Message model, transcript and conversation controller
//! - [`config`]: Layered configuration for the terminal host
//! - [`render`]: Renderer trait and terminal implementation
//! - [`session`]: Session id and storage backends
//! - [`transport`]: Wire types and HTTP transport
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatbot_widget::chat::{ControllerConfig, ConversationController};
//! use chatbot_widget::render::RecordingRenderer;
//! use chatbot_widget::session::{MemoryStorage, SessionStore};
//! use chatbot_widget::transport::HttpTransport;
//!
//! # async fn example() {
//! let session = SessionStore::new(Arc::new(MemoryStorage::new())).get_or_create();
//! let controller = ConversationController::initialize(
//!     ControllerConfig::default(),
//!     session,
//!     Arc::new(HttpTransport::new()),
//!     Arc::new(RecordingRenderer::new()),
//! );
//! let _ = controller.submit("Hello!").await;
//! # }
//! ```

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod chat;
pub mod config;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod transport;
