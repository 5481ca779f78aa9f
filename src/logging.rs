//! Structured logging setup
//!
//! Logs go to stderr so rendered conversation output on stdout stays clean.
//! `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("chatwidget={}", level)
}

/// Installs the global tracing subscriber
///
/// # Errors
///
/// Returns an error if the level is not a valid filter directive or a
/// subscriber is already installed
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config, verbose)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    } else {
        let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    }

    Ok(())
}
