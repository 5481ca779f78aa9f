//! Special commands parser for interactive chat
//!
//! Lines starting with `/` are handled locally instead of being sent to the
//! endpoint. Commands are case-insensitive; `exit` and `quit` also work
//! without the slash. A leading word that looks like a path (`/etc/hosts`)
//! or a lone `/` is ordinary text.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Commands handled by the chat loop itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,

    /// Copy the most recent bot reply to the clipboard
    Copy,

    /// Clear the conversation (the session id survives)
    Clear,

    /// Re-render the conversation, optionally only the last N messages
    History(Option<usize>),

    /// Show the session identifier
    Session,

    /// Leave the chat
    Exit,

    /// Not a special command; send the input to the endpoint
    None,
}

/// Parse a user input line into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/command` and
/// `CommandError::UnsupportedArgument` for a bad argument.
///
/// # Examples
///
/// ```
/// use chatwidget::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/copy").unwrap(), SpecialCommand::Copy);
/// assert_eq!(
///     parse_special_command("/history 5").unwrap(),
///     SpecialCommand::History(Some(5))
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    if command.len() == 1 || command[1..].contains('/') {
        return Ok(SpecialCommand::None);
    }

    match (command, arg) {
        ("/help" | "/?", None) => Ok(SpecialCommand::Help),
        ("/copy", None) => Ok(SpecialCommand::Copy),
        ("/clear", None) => Ok(SpecialCommand::Clear),
        ("/session", None) => Ok(SpecialCommand::Session),
        ("/exit" | "/quit", None) => Ok(SpecialCommand::Exit),
        ("/history", None) => Ok(SpecialCommand::History(None)),
        ("/history", Some(n)) => match n.parse::<usize>() {
            Ok(count) if count > 0 => Ok(SpecialCommand::History(Some(count))),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/history".to_string(),
                arg: n.to_string(),
            }),
        },
        (
            cmd @ ("/help" | "/?" | "/copy" | "/clear" | "/session" | "/exit" | "/quit"),
            Some(arg),
        ) => Err(CommandError::UnsupportedArgument {
            command: cmd.to_string(),
            arg: arg.to_string(),
        }),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the chat command reference
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /help           - Show this help
  /copy           - Copy the last reply to the clipboard
  /clear          - Clear the conversation (keeps the session id)
  /history [N]    - Show the conversation, or only the last N messages
  /session        - Show the session id
  /exit, exit     - Leave the chat (Ctrl-D also works)

Anything else is sent to the endpoint. Lines that start with a path
(/etc/hosts is missing) are sent as text; any other unknown /word is
reported so typos are not sent by accident.
"#
    );
}
