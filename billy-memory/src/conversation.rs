//! Bounded, best-effort conversation history on top of a [`KvStore`].
//!
//! Histories are JSON-encoded message lists under `conversation:{session}`
//! keys with a 7-day expiry refreshed on every write. Persistence is
//! best-effort: backend failures are logged and swallowed, and readers get an
//! empty history rather than an error.
//!
//! Concurrent writers to the same session are NOT serialized — both read the
//! pre-race history and the later write wins. Accepted race for this service.

use crate::traits::{KvStore, Message};
use std::sync::Arc;
use std::time::Duration;

/// Key namespace for session histories.
pub const CONVERSATION_PREFIX: &str = "conversation:";

/// Time-to-live for a session history, refreshed on every write.
pub const CONVERSATION_TTL: Duration = Duration::from_secs(86400 * 7);

/// Size-bounded, per-session message log.
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn KvStore>,
    max_history: usize,
}

impl ConversationStore {
    /// Create a store bounded at `max_history` messages per session.
    pub fn new(store: Arc<dyn KvStore>, max_history: usize) -> Self {
        Self { store, max_history }
    }

    fn key(session_id: &str) -> String {
        format!("{CONVERSATION_PREFIX}{session_id}")
    }

    /// Get the ordered history for a session.
    ///
    /// Unknown sessions and backend failures both yield an empty history.
    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        match self.store.get(&Self::key(session_id)).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(session_id, error = %e, "Discarding undecodable history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to read history");
                Vec::new()
            }
        }
    }

    /// Append a message to a session, truncating to the newest
    /// `max_history` entries and refreshing the expiry window.
    ///
    /// Write failures are logged and swallowed; the conversation continues
    /// from in-memory context for that turn.
    pub async fn add_message(&self, session_id: &str, message: Message) {
        let mut history = self.history(session_id).await;
        history.push(message);

        if history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
        }

        let raw = match serde_json::to_string(&history) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to encode history");
                return;
            }
        };

        if let Err(e) = self
            .store
            .put(&Self::key(session_id), &raw, CONVERSATION_TTL)
            .await
        {
            tracing::warn!(session_id, error = %e, "Failed to persist history");
        }
    }

    /// Delete a session's history. Idempotent.
    pub async fn clear(&self, session_id: &str) {
        if let Err(e) = self.store.delete(&Self::key(session_id)).await {
            tracing::warn!(session_id, error = %e, "Failed to clear history");
        }
    }

    /// List all session ids with a live history.
    ///
    /// Enumeration failures yield an empty list.
    pub async fn sessions(&self) -> Vec<String> {
        match self.store.list_keys(CONVERSATION_PREFIX).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|key| {
                    key.strip_prefix(CONVERSATION_PREFIX)
                        .map(|id| id.to_string())
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list sessions");
                Vec::new()
            }
        }
    }
}
