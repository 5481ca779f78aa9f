//! Display layer
//!
//! Consumes formatter output and renders it to the terminal, plus the copy
//! affordance for whole messages.

pub mod clipboard;
pub mod highlight;
pub mod terminal;

pub use clipboard::{copy_message, Clipboard, SystemClipboard};
pub use highlight::{Highlighter, HighlighterRegistry, SyntectHighlighter};
pub use terminal::TerminalRenderer;
