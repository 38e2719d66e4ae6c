//! Session handle and the store that produces it.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::storage::Storage;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "chatbotSessionId";

/// Prefix of generated session identifiers.
const SESSION_PREFIX: &str = "sess_";

/// Number of random base-36 characters after the prefix.
const SESSION_TOKEN_LEN: usize = 9;

/// An opaque, immutable session identifier.
///
/// The token correlates the user's queries on the backend. It is not a
/// credential and must not be treated as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    id: String,
}

impl Session {
    /// Wrap an existing identifier.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Generate a fresh random identifier (`sess_` followed by 9 base-36 chars).
    #[must_use]
    pub fn generate() -> Self {
        let mut n = Uuid::new_v4().as_u128();
        let mut token = String::with_capacity(SESSION_PREFIX.len() + SESSION_TOKEN_LEN);
        token.push_str(SESSION_PREFIX);
        for _ in 0..SESSION_TOKEN_LEN {
            let digit = (n % 36) as u32;
            n /= 36;
            token.push(char::from_digit(digit, 36).unwrap_or('0'));
        }
        Self { id: token }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Produces a stable [`Session`] for one storage scope.
///
/// Storage failures never surface to the caller. When the backend cannot be
/// read or written, the store falls back to a generated id that it keeps for
/// the rest of its lifetime. The fallback lives in the store, not in the
/// storage: a host creates one store per scope and shares it by cloning, so
/// every clone hands out the same degraded id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    storage: Arc<dyn Storage>,
    /// Id used once the backend has failed.
    fallback: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Create a store over the given storage scope.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                storage,
                fallback: Mutex::new(None),
            }),
        }
    }

    /// Return the stored session, creating and persisting one if absent.
    #[must_use]
    pub fn get_or_create(&self) -> Session {
        let mut fallback = self
            .inner
            .fallback
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(session) = fallback.as_ref() {
            return session.clone();
        }

        match self.inner.storage.get(SESSION_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => {
                tracing::debug!(session_id = %id, "Reusing stored session");
                Session::from_id(id)
            }
            Ok(_) => {
                let session = Session::generate();
                match self.inner.storage.set(SESSION_KEY, session.id()) {
                    Ok(()) => {
                        tracing::info!(
                            name: "session.created",
                            session_id = %session,
                            "Created new session"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = %session,
                            error = %e,
                            "Failed to persist session, keeping it in memory"
                        );
                        *fallback = Some(session.clone());
                    }
                }
                session
            }
            Err(e) => {
                let session = Session::generate();
                tracing::warn!(
                    session_id = %session,
                    error = %e,
                    "Session storage unavailable, using a non-persisted session"
                );
                *fallback = Some(session.clone());
                session
            }
        }
    }
}
