//! chatwidget - chat widget core library
//!
//! This library provides the core of a chat client for a remote
//! conversational endpoint: the conversation state machine, the reply
//! formatter, persistence, and a terminal display layer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `controller`: Conversation state machine (submit, hydrate, persistence)
//! - `formatter`: Reply text to display blocks (line rules and markdown)
//! - `endpoint`: Conversational endpoint abstraction and HTTP implementation
//! - `storage`: Key-value persistence (sled, in-memory)
//! - `display`: Terminal rendering, syntax highlighting, clipboard
//! - `message`: Message model and id generation
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatwidget::controller::{ControllerOptions, ConversationController};
//! use chatwidget::endpoint::HttpEndpoint;
//! use chatwidget::storage::SledStore;
//! use chatwidget::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/chatwidget.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let controller = ConversationController::new(
//!         HttpEndpoint::new(&config.endpoint)?,
//!         SledStore::open_default()?,
//!         ControllerOptions::from_config(&config),
//!     );
//!     controller.submit("What are your opening hours?").await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod endpoint;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod message;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use controller::{ConversationController, SubmitOutcome};
pub use error::{ChatWidgetError, Result};
pub use formatter::{format, DisplayBlock, FormatterMode};
pub use message::{Message, Sender};

#[cfg(test)]
pub mod test_utils;
