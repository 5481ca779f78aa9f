//! Command-line interface definition for chatwidget
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot sends, history and
//! session inspection, and formatter debugging.

use crate::formatter::FormatterMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chatwidget - terminal chat client for a remote conversational endpoint
///
/// Sends what you type to the configured endpoint and renders the replies,
/// keeping the conversation across restarts.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatwidget")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/chatwidget.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the endpoint URL from config
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the conversation store location
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatwidget
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send one message and print the reply
    Send {
        /// Text to send
        #[arg(short, long, value_parser = parse_prompt)]
        prompt: String,
    },

    /// Inspect or clear the persisted conversation
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Print the session identifier
    Session,

    /// Format text through the reply formatter and print it
    Render {
        /// File to read the text from
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Text to format (reads stdin when neither --file nor --text is given)
        #[arg(short, long)]
        text: Option<String>,

        /// Formatter to use (lines, markdown); defaults to the configured one
        #[arg(long)]
        formatter: Option<FormatterMode>,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// Show persisted messages
    Show {
        /// Only show the most recent N messages
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the stored JSON instead of rendering
        #[arg(long)]
        raw: bool,
    },

    /// Delete the persisted conversation (the session id is kept)
    Clear,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/chatwidget.yaml".to_string()),
            verbose: false,
            endpoint: None,
            storage_path: None,
            command: Commands::Session,
        }
    }
}

fn parse_prompt(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("prompt cannot be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}
