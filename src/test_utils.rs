//! Test utilities for chatwidget
//!
//! This module provides common test utilities including temporary store
//! management, message fixtures, and assertion helpers.

use crate::config::Config;
use crate::message::{Message, MessageIdGenerator};
use crate::storage::SledStore;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Open a sled store inside a fresh temporary directory
///
/// The `TempDir` is returned too so the caller keeps the directory alive.
pub fn temp_store() -> (SledStore, TempDir) {
    let dir = temp_dir();
    let store = SledStore::open(dir.path().join("state")).expect("Failed to open test store");
    (store, dir)
}

/// Build an alternating user/bot conversation of `turns` exchanges
pub fn conversation(turns: usize) -> Vec<Message> {
    let mut ids = MessageIdGenerator::new();
    let mut messages = Vec::with_capacity(turns * 2);
    for i in 0..turns {
        let request_id = Some(format!("req-{}", i));
        messages.push(Message::user(ids.next_id(), format!("question {}", i), request_id.clone()));
        messages.push(Message::bot(ids.next_id(), format!("answer {}", i), request_id));
    }
    messages
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration pointing storage at `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(dir.path().join("state"));
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
endpoint:
  url: https://bot.example.com/webhook/chat
  timeout_seconds: 10
  headers:
    X-Widget-Key: test
conversation:
  history_limit: 20
  seed_welcome: false
display:
  formatter: lines
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FormatterMode;
    use crate::message::Sender;
    use crate::error::ChatWidgetError;
    use crate::storage::KeyValueStore;

    #[test]
    fn test_temp_store_is_usable() {
        let (store, dir) = temp_store();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(dir.path().join("state").exists());
    }

    #[test]
    fn test_conversation_alternates_and_correlates() {
        let messages = conversation(3);
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[0].request_id, messages[1].request_id);
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(ChatWidgetError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: crate::error::Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.conversation.history_limit, 20);
        assert_eq!(config.display.formatter, FormatterMode::Lines);
        assert!(config.conversation.seed_message().is_none());
    }

    #[test]
    fn test_test_config_points_at_dir() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert_eq!(config.storage.path, Some(dir.path().join("state")));
    }
}
