//! Session identifier management.
//!
//! The widget correlates every outbound query with an opaque session token.
//! The token is created lazily, persisted through a [`Storage`] backend and
//! reused for as long as that storage scope lives.
//!
//! # Architecture
//!
//! - [`Session`]: The immutable session handle
//! - [`SessionStore`]: Produces a stable [`Session`] from a storage scope
//! - [`Storage`]: Scoped key/value collaborator ([`MemoryStorage`], [`FileStorage`])
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chatbot_widget::session::{MemoryStorage, SessionStore};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let store = SessionStore::new(storage.clone());
//! let first = store.get_or_create();
//!
//! // A fresh store over the same scope sees the persisted id.
//! let second = SessionStore::new(storage).get_or_create();
//! assert_eq!(first, second);
//! ```

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{SESSION_KEY, Session, SessionStore};
