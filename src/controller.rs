//! Conversation state machine
//!
//! The controller owns the message history, the session identifier, the
//! pending flag and the opaque UI state. It is driven from a single task:
//! all state lives in cells, and no borrow is held across the one
//! suspension point (the endpoint call), so a second `submit` polled while
//! the first is in flight observes `pending` and returns immediately.
//!
//! Every append is written through to the key-value store. Only the most
//! recent `history_limit` messages are persisted; the live view keeps
//! everything appended during the session.

use crate::config::Config;
use crate::endpoint::{ChatEndpoint, ClientContext, EndpointReply, EndpointRequest};
use crate::formatter::{self, DisplayBlock, FormatterMode};
use crate::message::{new_request_id, Message, MessageIdGenerator};
use crate::storage::{decode_history, encode_history_window, KeyValueStore, StorageKeys};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reply shown when the endpoint answered without usable output
pub const EMPTY_REPLY_TEXT: &str = "Sorry, I could not process your request.";

/// Reply shown when the request failed
pub const ERROR_REPLY_TEXT: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Construction-time options for [`ConversationController`]
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Number of trailing messages written to the store
    pub history_limit: usize,
    /// Bot greeting seeded into an absent history
    pub welcome_message: Option<String>,
    /// Store keys for this widget instance
    pub keys: StorageKeys,
    /// Extra client-context strings sent with each request
    pub client_context: BTreeMap<String, String>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            history_limit: 100,
            welcome_message: None,
            keys: StorageKeys::default(),
            client_context: BTreeMap::new(),
        }
    }
}

impl ControllerOptions {
    /// Builds options from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            history_limit: config.conversation.history_limit,
            welcome_message: config.conversation.seed_message().map(str::to_string),
            keys: StorageKeys::with_prefix(&config.storage.key_prefix),
            client_context: config.endpoint.client_context.clone(),
        }
    }
}

/// Why a submit call did nothing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty after trimming
    #[error("the message is empty")]
    EmptyInput,
    /// A request is already in flight
    #[error("a previous message is still waiting for a reply")]
    Pending,
}

/// Result of [`ConversationController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was appended and no request was issued
    Ignored(IgnoreReason),
    /// The request settled; both appended messages are returned
    Settled {
        /// The user's message
        user: Message,
        /// The bot's reply, fallback or error text
        reply: Message,
    },
}

/// Owns one conversation and mediates every change to it
pub struct ConversationController<E, S> {
    endpoint: E,
    store: S,
    options: ControllerOptions,
    session_id: String,
    history: RefCell<Vec<Message>>,
    pending: Cell<bool>,
    ui_state: RefCell<Option<serde_json::Value>>,
    ids: RefCell<MessageIdGenerator>,
}

impl<E: ChatEndpoint, S: KeyValueStore> ConversationController<E, S> {
    /// Creates a controller and hydrates it from `store`
    ///
    /// # Examples
    ///
    /// ```
    /// use chatwidget::controller::{ControllerOptions, ConversationController};
    /// use chatwidget::endpoint::HttpEndpoint;
    /// use chatwidget::config::EndpointConfig;
    /// use chatwidget::storage::MemoryStore;
    ///
    /// # fn main() -> chatwidget::error::Result<()> {
    /// let endpoint = HttpEndpoint::new(&EndpointConfig::default())?;
    /// let options = ControllerOptions {
    ///     welcome_message: Some("Hello!".to_string()),
    ///     ..Default::default()
    /// };
    /// let controller = ConversationController::new(endpoint, MemoryStore::new(), options);
    /// assert_eq!(controller.history().len(), 1);
    /// assert!(!controller.is_pending());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(endpoint: E, store: S, options: ControllerOptions) -> Self {
        let mut controller = Self {
            endpoint,
            store,
            options,
            session_id: String::new(),
            history: RefCell::new(Vec::new()),
            pending: Cell::new(false),
            ui_state: RefCell::new(None),
            ids: RefCell::new(MessageIdGenerator::new()),
        };
        controller.hydrate();
        controller
    }

    /// Loads history, session id and UI state from the store
    fn hydrate(&mut self) {
        let keys = self.options.keys.clone();

        let history = match self.store.get(&keys.history) {
            Ok(Some(raw)) => match decode_history(&raw) {
                Ok(messages) => {
                    tracing::debug!(count = messages.len(), "Hydrated conversation history");
                    messages
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable history record: {}", e);
                    if let Err(e) = self.store.remove(&keys.history) {
                        tracing::warn!("Failed to remove history record: {}", e);
                    }
                    Vec::new()
                }
            },
            Ok(None) => self.seed_history(),
            Err(e) => {
                tracing::warn!("Failed to read history, starting fresh: {}", e);
                self.seed_history()
            }
        };

        {
            let ids = self.ids.get_mut();
            for message in &history {
                ids.observe(message.id);
            }
        }
        *self.history.get_mut() = history;

        self.session_id = match self.store.get(&keys.session_id) {
            Ok(Some(id)) if !id.trim().is_empty() => id,
            other => {
                if let Err(e) = other {
                    tracing::warn!("Failed to read session id: {}", e);
                }
                let id = uuid::Uuid::new_v4().to_string();
                if let Err(e) = self.store.set(&keys.session_id, &id) {
                    tracing::warn!("Failed to persist session id: {}", e);
                }
                tracing::info!(session_id = %id, "Started new session");
                id
            }
        };

        *self.ui_state.get_mut() = match self.store.get(&keys.ui_state) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable UI state: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read UI state: {}", e);
                None
            }
        };
    }

    fn seed_history(&mut self) -> Vec<Message> {
        match self.options.welcome_message.clone() {
            Some(welcome) => {
                let id = self.ids.get_mut().next_id();
                vec![Message::bot(id, welcome, None)]
            }
            None => Vec::new(),
        }
    }

    /// Submits user input and waits for the reply to settle
    ///
    /// Blank input, or input arriving while a request is in flight, is
    /// ignored. Otherwise exactly one user message and one bot message are
    /// appended. Endpoint failures become the fixed error reply; this call
    /// itself never fails.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let prompt = raw_text.trim();
        if prompt.is_empty() {
            tracing::debug!("Ignoring empty input");
            return SubmitOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        if self.pending.get() {
            tracing::debug!("Ignoring input while a request is pending");
            return SubmitOutcome::Ignored(IgnoreReason::Pending);
        }

        let request_id = new_request_id();
        let user = Message::user(self.next_id(), prompt, Some(request_id.clone()));
        self.append(user.clone());
        self.pending.set(true);

        let request = EndpointRequest {
            prompt: prompt.to_string(),
            request_id: request_id.clone(),
            session_id: self.session_id.clone(),
            timestamp: user.timestamp,
            client_context: ClientContext::current(self.options.client_context.clone()),
        };

        tracing::debug!(request_id = %request_id, "Dispatching request");
        let reply_text = match self.endpoint.send(&request).await {
            Ok(EndpointReply::Output(text)) => text,
            Ok(EndpointReply::Empty) => {
                tracing::warn!(request_id = %request_id, "Endpoint returned no output");
                EMPTY_REPLY_TEXT.to_string()
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, "Request failed: {:#}", e);
                ERROR_REPLY_TEXT.to_string()
            }
        };

        let reply = Message::bot(self.next_id(), reply_text, Some(request_id.clone()));
        self.append(reply.clone());
        self.pending.set(false);
        tracing::debug!(request_id = %request_id, "Request settled");

        SubmitOutcome::Settled { user, reply }
    }

    /// Snapshot of the live history
    pub fn history(&self) -> Vec<Message> {
        self.history.borrow().clone()
    }

    /// True while a request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Stable session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Most recent bot message, if any
    pub fn last_bot_message(&self) -> Option<Message> {
        self.history
            .borrow()
            .iter()
            .rev()
            .find(|m| m.is_bot())
            .cloned()
    }

    /// Empties the conversation and removes the persisted record
    ///
    /// The session id survives.
    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
        if let Err(e) = self.store.remove(&self.options.keys.history) {
            tracing::warn!("Failed to remove history record: {}", e);
        }
        tracing::info!("Cleared conversation history");
    }

    /// Opaque UI state as last stored
    pub fn ui_state(&self) -> Option<serde_json::Value> {
        self.ui_state.borrow().clone()
    }

    /// Replaces and persists the opaque UI state
    pub fn set_ui_state(&self, value: serde_json::Value) {
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&self.options.keys.ui_state, &raw) {
                    tracing::warn!("Failed to persist UI state: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize UI state: {}", e),
        }
        *self.ui_state.borrow_mut() = Some(value);
    }

    /// Formats a message for display
    pub fn render_message(&self, message: &Message, mode: FormatterMode) -> Vec<DisplayBlock> {
        formatter::format(&message.text, mode)
    }

    fn next_id(&self) -> ulid::Ulid {
        self.ids.borrow_mut().next_id()
    }

    fn append(&self, message: Message) {
        self.history.borrow_mut().push(message);
        self.persist_history();
    }

    fn persist_history(&self) {
        let encoded = {
            let history = self.history.borrow();
            encode_history_window(&history, self.options.history_limit)
        };
        let result =
            encoded.and_then(|raw| self.store.set(&self.options.keys.history, &raw));
        if let Err(e) = result {
            tracing::warn!("Failed to persist history: {}", e);
        }
    }
}
