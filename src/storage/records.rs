//! Persisted record layout
//!
//! Three logical records live in the key-value store: the conversation
//! history (a JSON array of messages), the session identifier (a plain
//! string) and an opaque UI-state blob. Keys share a configurable prefix so
//! several widgets can share one store.

use crate::error::{ChatWidgetError, Result};
use crate::message::Message;

/// Store keys for one widget instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Conversation history record
    pub history: String,
    /// Session identifier record
    pub session_id: String,
    /// Opaque UI-visibility state record
    pub ui_state: String,
}

impl StorageKeys {
    /// Builds the key set for `prefix`
    ///
    /// # Examples
    ///
    /// ```
    /// use chatwidget::storage::StorageKeys;
    ///
    /// let keys = StorageKeys::with_prefix("chatwidget");
    /// assert_eq!(keys.history, "chatwidget.history");
    /// ```
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            history: format!("{}.history", prefix),
            session_id: format!("{}.session_id", prefix),
            ui_state: format!("{}.ui_state", prefix),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix("chatwidget")
    }
}

/// Serializes the trailing `limit` messages of `history`
///
/// Only the persisted copy is windowed; callers keep their full live view.
pub fn encode_history_window(history: &[Message], limit: usize) -> Result<String> {
    let start = history.len().saturating_sub(limit);
    serde_json::to_string(&history[start..])
        .map_err(|e| ChatWidgetError::Storage(format!("Serialization failed: {}", e)).into())
}

/// Parses a persisted history record
///
/// # Errors
///
/// Returns `ChatWidgetError::Storage` if the record is not a JSON array of
/// messages with RFC-3339 timestamps
pub fn decode_history(raw: &str) -> Result<Vec<Message>> {
    serde_json::from_str(raw)
        .map_err(|e| ChatWidgetError::Storage(format!("Deserialization failed: {}", e)).into())
}
