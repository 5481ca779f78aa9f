//! Copy-to-clipboard affordance

use crate::error::{ChatWidgetError, Result};
use crate::message::Message;

/// Destination for copied message text
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard {
    /// True if the clipboard can accept writes
    fn is_available(&self) -> bool {
        true
    }

    /// Replaces the clipboard contents with `text`
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard backed by `arboard`
///
/// Initialization can fail on headless hosts; the clipboard then reports
/// every write as an error instead of failing construction.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    /// Connects to the system clipboard
    pub fn new() -> Self {
        let inner = arboard::Clipboard::new().ok();
        if inner.is_none() {
            tracing::warn!("Failed to initialize clipboard support");
        }
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| ChatWidgetError::Clipboard("Clipboard not available".to_string()))?;

        clipboard.set_text(text.to_string()).map_err(|e| {
            ChatWidgetError::Clipboard(format!("Failed to set clipboard text: {}", e))
        })?;
        Ok(())
    }
}

/// Copies the raw text of `message`, returning whether it succeeded
///
/// Failure is logged and never surfaced; copying is best-effort.
pub fn copy_message(clipboard: &mut dyn Clipboard, message: &Message) -> bool {
    if !clipboard.is_available() {
        tracing::warn!("Copy to clipboard skipped: no clipboard available");
        return false;
    }
    match clipboard.write_text(&message.text) {
        Ok(()) => {
            tracing::debug!(chars = message.text.len(), "Copied message to clipboard");
            true
        }
        Err(e) => {
            tracing::warn!("Copy to clipboard failed: {}", e);
            false
        }
    }
}
