//! Configuration management for chatwidget
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatWidgetError, Result};
use crate::formatter::FormatterMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure for chatwidget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote conversational endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Conversation lifecycle settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Persistent storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reply rendering settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL the prompt is POSTed to
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// HTTP client timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Static headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Extra client-context strings sent with every request
    #[serde(default)]
    pub client_context: BTreeMap<String, String>,
}

fn default_endpoint_url() -> String {
    "http://localhost:5678/webhook/chat".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_seconds: default_timeout(),
            headers: BTreeMap::new(),
            client_context: BTreeMap::new(),
        }
    }
}

/// Conversation lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of trailing messages kept in the persisted history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Bot greeting used to seed an empty history
    #[serde(default = "default_welcome_message")]
    pub welcome_message: Option<String>,

    /// Whether an empty history is seeded with the welcome message
    #[serde(default = "default_seed_welcome")]
    pub seed_welcome: bool,
}

fn default_history_limit() -> usize {
    100
}

fn default_welcome_message() -> Option<String> {
    Some("Hi there! How can I help you today?".to_string())
}

fn default_seed_welcome() -> bool {
    true
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            welcome_message: default_welcome_message(),
            seed_welcome: default_seed_welcome(),
        }
    }
}

impl ConversationConfig {
    /// The greeting to seed with, if seeding is enabled
    pub fn seed_message(&self) -> Option<&str> {
        if self.seed_welcome {
            self.welcome_message.as_deref().filter(|m| !m.trim().is_empty())
        } else {
            None
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database location; defaults to the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Prefix shared by all persisted keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    "chatwidget".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key_prefix: default_key_prefix(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Which formatter turns reply text into display blocks
    #[serde(default)]
    pub formatter: FormatterMode,

    /// Highlight fenced code blocks tagged with a language
    #[serde(default = "default_syntax_highlighting")]
    pub syntax_highlighting: bool,

    /// Syntect theme used for code blocks
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_syntax_highlighting() -> bool {
    true
}

fn default_theme() -> String {
    "base16-eighties.dark".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            formatter: FormatterMode::default(),
            syntax_highlighting: default_syntax_highlighting(),
            theme: default_theme(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON-formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatWidgetError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatWidgetError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("CHATWIDGET_ENDPOINT_URL") {
            self.endpoint.url = url;
        }

        if let Ok(timeout) = std::env::var("CHATWIDGET_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.endpoint.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATWIDGET_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(limit) = std::env::var("CHATWIDGET_HISTORY_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.conversation.history_limit = value;
            } else {
                tracing::warn!("Invalid CHATWIDGET_HISTORY_LIMIT: {}", limit);
            }
        }

        if let Ok(welcome) = std::env::var("CHATWIDGET_WELCOME_MESSAGE") {
            self.conversation.welcome_message = Some(welcome);
        }

        if let Ok(path) = std::env::var("CHATWIDGET_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: CHATWIDGET_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(formatter) = std::env::var("CHATWIDGET_FORMATTER") {
            match formatter.parse::<FormatterMode>() {
                Ok(mode) => self.display.formatter = mode,
                Err(_) => {
                    tracing::warn!("Invalid formatter: {}, using default", formatter);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.endpoint {
            tracing::debug!("Endpoint override from CLI: {}", url);
            self.endpoint.url = url.clone();
        }

        if let Some(path) = &cli.storage_path {
            tracing::debug!("Storage path override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.trim().is_empty() {
            return Err(ChatWidgetError::Config("endpoint.url cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.endpoint.url).map_err(|e| {
            ChatWidgetError::Config(format!("Invalid endpoint.url {}: {}", self.endpoint.url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ChatWidgetError::Config(format!(
                "endpoint.url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.endpoint.timeout_seconds == 0 {
            return Err(ChatWidgetError::Config(
                "endpoint.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.conversation.history_limit == 0 {
            return Err(ChatWidgetError::Config(
                "conversation.history_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.key_prefix.trim().is_empty() {
            return Err(
                ChatWidgetError::Config("storage.key_prefix cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
