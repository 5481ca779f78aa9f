//! chatwidget - terminal chat client
//!
#![doc = "chatwidget - terminal chat client"]
#![doc = "Main entry point for the chatwidget application."]

use anyhow::Result;

use chatwidget::cli::{Cli, Commands};
use chatwidget::commands;
use chatwidget::config::Config;
use chatwidget::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/chatwidget.yaml");
    let config = Config::load(config_path, &cli)?;

    // Initialize tracing once the logging section is known
    init_logging(&config.logging, cli.verbose)?;
    tracing::debug!("Loaded configuration from {}", config_path);

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Send { prompt } => {
            tracing::info!("Sending one-shot prompt");
            commands::send::run_send(config, prompt).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Session => {
            commands::session::show_session(&config)?;
            Ok(())
        }
        Commands::Render {
            file,
            text,
            formatter,
        } => {
            commands::render::run_render(&config, file, text, formatter)?;
            Ok(())
        }
    }
}
