//! Conversation history storage for the Billy service.
//!
//! A session history is an ordered message log kept under a namespaced
//! key/value entry with a time-to-live. The [`ConversationStore`] wrapper
//! enforces the history bound and the best-effort degradation policy on top
//! of a pluggable [`KvStore`] backend.

#![warn(clippy::all)]

pub mod conversation;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use conversation::{ConversationStore, CONVERSATION_PREFIX, CONVERSATION_TTL};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KvStore, Message, Role};
