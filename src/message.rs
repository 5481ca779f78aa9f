//! Conversation message model
//!
//! A [`Message`] is one turn in the conversation, authored either by the
//! user or by the remote responder. Messages are immutable once created and
//! are persisted as JSON with RFC-3339 timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the widget
    User,
    /// The remote conversational endpoint
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// A single conversation entry
///
/// # Examples
///
/// ```
/// use chatwidget::message::{Message, MessageIdGenerator, Sender};
///
/// let mut ids = MessageIdGenerator::new();
/// let msg = Message::user(ids.next_id(), "Hello", None);
/// assert_eq!(msg.sender, Sender::User);
/// assert_eq!(msg.text, "Hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique ordering key, increasing in creation order
    pub id: Ulid,
    /// Raw, unformatted body
    pub text: String,
    /// Who authored the message
    pub sender: Sender,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Correlates a bot reply with the user message that triggered it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Message {
    /// Creates a user message stamped with the current time
    pub fn user(id: Ulid, text: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            request_id,
        }
    }

    /// Creates a bot message stamped with the current time
    pub fn bot(id: Ulid, text: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            request_id,
        }
    }

    /// Returns true if this message was authored by the bot
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// Monotonic message id source
///
/// ULIDs minted in the same millisecond are not ordered by default, so the
/// generator remembers the last id it handed out and increments past it
/// whenever a fresh ULID would not sort after it.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: Option<Ulid>,
}

impl MessageIdGenerator {
    /// Creates a new generator
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Produces the next id
    pub fn next_id(&mut self) -> Ulid {
        let candidate = Ulid::new();
        let id = match self.last {
            Some(prev) if candidate <= prev => prev.increment().unwrap_or(candidate),
            _ => candidate,
        };
        self.last = Some(id);
        id
    }

    /// Records an existing id so new ids sort after it
    ///
    /// Called after hydrating history so ids minted this session keep
    /// increasing even if the wall clock moved backwards since the last run.
    pub fn observe(&mut self, id: Ulid) {
        if self.last.map_or(true, |last| id > last) {
            self.last = Some(id);
        }
    }
}

/// Returns a fresh request correlation id (UUID v4)
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
