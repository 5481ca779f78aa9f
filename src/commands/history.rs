use crate::cli::HistoryCommand;
use crate::commands::open_store;
use crate::config::Config;
use crate::display::TerminalRenderer;
use crate::error::Result;
use crate::message::Message;
use crate::storage::{decode_history, KeyValueStore, StorageKeys};
use colored::Colorize;

/// Handle history commands
///
/// Reads the store directly so inspecting history never seeds or rewrites it.
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = open_store(config)?;
    let keys = StorageKeys::with_prefix(&config.storage.key_prefix);

    match command {
        HistoryCommand::Show { limit, raw } => {
            let Some(record) = store.get(&keys.history)? else {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            };

            let messages = decode_history(&record)?;
            let shown = tail(&messages, limit);

            if raw {
                println!("{}", serde_json::to_string_pretty(shown)?);
                return Ok(());
            }

            let renderer = TerminalRenderer::from_config(&config.display);
            println!(
                "\nConversation History ({} of {} messages):\n",
                shown.len(),
                messages.len()
            );
            for message in shown {
                println!("{}\n", renderer.render_message(message));
            }
        }
        HistoryCommand::Clear => {
            store.remove(&keys.history)?;
            println!("{}", "Deleted conversation history".green());
        }
    }

    Ok(())
}

/// The last `limit` messages, or all of them
fn tail(messages: &[Message], limit: Option<usize>) -> &[Message] {
    let start = limit.map_or(0, |n| messages.len().saturating_sub(n));
    &messages[start..]
}
