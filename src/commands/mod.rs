/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    — Interactive chat session
- `send`    — One-shot submit
- `session` — Session id inspection
- `render`  — Format arbitrary text through the reply formatter
- `history` — Inspect or clear the persisted conversation

The handlers are thin: they wire configuration into the controller, the
store and the terminal renderer.
*/

use crate::config::Config;
use crate::controller::{ControllerOptions, ConversationController};
use crate::display::TerminalRenderer;
use crate::endpoint::HttpEndpoint;
use crate::error::Result;
use crate::message::Message;
use crate::storage::SledStore;

// History inspection commands
pub mod history;

// Special commands parser for the chat loop
pub mod special_commands;

/// Controller type used by the CLI
pub type CliController = ConversationController<HttpEndpoint, SledStore>;

/// Opens the configured conversation store
///
/// # Errors
///
/// Returns an error if the store cannot be opened
pub fn open_store(config: &Config) -> Result<SledStore> {
    match &config.storage.path {
        Some(path) => SledStore::open(path),
        None => SledStore::open_default(),
    }
}

/// Builds a controller wired to the configured endpoint and store
///
/// # Errors
///
/// Returns an error if the HTTP client or the store cannot be created
pub fn build_controller(config: &Config) -> Result<CliController> {
    let endpoint = HttpEndpoint::new(&config.endpoint)?;
    let store = open_store(config)?;
    tracing::debug!(
        endpoint = %endpoint.url(),
        store = %store.path().display(),
        "Building conversation controller"
    );
    Ok(ConversationController::new(
        endpoint,
        store,
        ControllerOptions::from_config(config),
    ))
}

/// Renders `message` with the blocks the controller formats for it
pub fn render_reply(
    controller: &CliController,
    renderer: &TerminalRenderer,
    message: &Message,
) -> String {
    let blocks = controller.render_message(message, renderer.mode());
    renderer.render_formatted(message, &blocks)
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Renders the stored conversation, then runs a readline loop that
    //! submits each line to the controller and renders the reply.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::controller::{IgnoreReason, SubmitOutcome};
    use crate::display::{copy_message, Clipboard, SystemClipboard};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let controller = build_controller(&config)?;
        let renderer = TerminalRenderer::from_config(&config.display);
        let mut clipboard: Option<SystemClipboard> = None;
        let mut rl = DefaultEditor::new()?;

        controller.set_ui_state(serde_json::json!({
            "open": true,
            "openedAt": chrono::Utc::now().to_rfc3339(),
        }));

        print_welcome_banner(&config);
        print_messages(&controller, &renderer, None);

        loop {
            match rl.readline(&format!("{} ", ">".green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Copy) => {
                            match controller.last_bot_message() {
                                Some(message) => {
                                    let clipboard = clipboard.get_or_insert_with(SystemClipboard::new);
                                    if !clipboard.is_available() {
                                        println!(
                                            "{}",
                                            "No system clipboard is available in this session.".yellow()
                                        );
                                    } else if copy_message(clipboard, &message) {
                                        println!("{}", "Copied last reply to clipboard.".green());
                                    } else {
                                        println!("{}", "Could not copy to clipboard.".yellow());
                                    }
                                }
                                None => println!("{}", "Nothing to copy yet.".yellow()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::Clear) => {
                            controller.clear_history();
                            println!("{}", "Conversation cleared.".green());
                            continue;
                        }
                        Ok(SpecialCommand::History(limit)) => {
                            print_messages(&controller, &renderer, limit);
                            continue;
                        }
                        Ok(SpecialCommand::Session) => {
                            println!("Session: {}", controller.session_id().cyan());
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    println!("{}", "…".dimmed());
                    match controller.submit(trimmed).await {
                        SubmitOutcome::Settled { reply, .. } => {
                            println!("{}\n", render_reply(&controller, &renderer, &reply));
                        }
                        SubmitOutcome::Ignored(IgnoreReason::Pending) => {
                            println!("{}", "Still waiting for the previous reply.".yellow());
                        }
                        SubmitOutcome::Ignored(IgnoreReason::EmptyInput) => {}
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        controller.set_ui_state(serde_json::json!({ "open": false }));
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                  chatwidget - interactive chat                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Endpoint:  {}", config.endpoint.url.cyan());
        println!("Formatter: {}", config.display.formatter);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_messages(
        controller: &CliController,
        renderer: &TerminalRenderer,
        limit: Option<usize>,
    ) {
        let history = controller.history();
        let start = limit.map_or(0, |n| history.len().saturating_sub(n));
        for message in &history[start..] {
            println!("{}\n", render_reply(controller, renderer, message));
        }
    }
}

// One-shot send handler
pub mod send {
    //! Submit a single prompt and print the reply.

    use super::*;
    use crate::controller::SubmitOutcome;

    /// Send `prompt` and print the rendered reply
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is blank or the controller cannot be
    /// built. Endpoint failures are reported as the reply text, not errors.
    pub async fn run_send(config: Config, prompt: String) -> Result<()> {
        let controller = build_controller(&config)?;
        let renderer = TerminalRenderer::from_config(&config.display);

        match controller.submit(&prompt).await {
            SubmitOutcome::Settled { reply, .. } => {
                println!("{}", render_reply(&controller, &renderer, &reply));
                Ok(())
            }
            SubmitOutcome::Ignored(reason) => {
                Err(anyhow::Error::new(reason).context("Prompt was not sent"))
            }
        }
    }
}

// Session inspection handler
pub mod session {
    //! Print the session identifier.

    use super::*;

    /// Print the session id, creating one if the store has none yet
    pub fn show_session(config: &Config) -> Result<()> {
        let controller = build_controller(config)?;
        println!("{}", controller.session_id());
        Ok(())
    }
}

// Formatter debugging handler
pub mod render {
    //! Format text through the reply formatter.

    use super::*;
    use crate::error::ChatWidgetError;
    use crate::formatter::{self, FormatterMode};
    use std::io::Read;
    use std::path::PathBuf;

    /// Reads the text to render from a file, an argument or stdin
    pub fn read_input(file: Option<PathBuf>, text: Option<String>) -> Result<String> {
        if let Some(text) = text {
            return Ok(text);
        }
        if let Some(path) = file {
            return std::fs::read_to_string(&path).map_err(|e| {
                ChatWidgetError::Config(format!("Failed to read {}: {}", path.display(), e)).into()
            });
        }

        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    }

    /// Render text with the chosen (or configured) formatter
    pub fn run_render(
        config: &Config,
        file: Option<PathBuf>,
        text: Option<String>,
        formatter: Option<FormatterMode>,
    ) -> Result<()> {
        let input = read_input(file, text)?;
        let mut display = config.display.clone();
        if let Some(mode) = formatter {
            display.formatter = mode;
        }

        let renderer = TerminalRenderer::from_config(&display);
        let blocks = formatter::format(&input, renderer.mode());
        tracing::debug!(blocks = blocks.len(), mode = %renderer.mode(), "Formatted input");
        println!("{}", renderer.render_blocks(&blocks));
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_store_uses_configured_path() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("state"));

        let store = open_store(&config).unwrap();
        assert_eq!(store.path(), dir.path().join("state"));
    }

    #[test]
    fn test_render_reply_formats_through_controller() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("state"));
        config.display.formatter = crate::formatter::FormatterMode::Lines;
        config.display.syntax_highlighting = false;

        let controller = build_controller(&config).unwrap();
        let renderer = TerminalRenderer::from_config(&config.display);
        let reply = Message::bot(ulid::Ulid::new(), "Plan | Price", None);

        let out = render_reply(&controller, &renderer, &reply);
        assert!(out.contains("Bot"));
        assert!(out.contains("Plan"));
        assert!(!out.contains("Plan | Price"));
    }

    #[tokio::test]
    async fn test_send_blank_prompt_reports_reason() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("state"));

        let err = send::run_send(config, "   ".to_string()).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Prompt was not sent"));
        assert!(message.contains("the message is empty"));
        assert!(!message.contains("Configuration"));
    }

    #[test]
    fn test_build_controller_seeds_welcome() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("state"));

        let controller = build_controller(&config).unwrap();
        assert!(!controller.session_id().is_empty());
        let history = controller.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Hi there! How can I help you today?");
    }
}
