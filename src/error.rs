//! Error types for chatwidget
//!
//! This module defines the error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.
//!
//! Note that the conversation controller never lets these escape its public
//! operations: endpoint failures become ordinary bot messages and storage
//! failures are logged. The types here surface in configuration loading,
//! the storage backends, the HTTP endpoint, and the CLI.

use thiserror::Error;

/// Main error type for chatwidget operations
#[derive(Error, Debug)]
pub enum ChatWidgetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level endpoint failure (connection refused, timeout, etc.)
    #[error("Endpoint error: {0}")]
    Endpoint(String),

    /// Endpoint answered with a non-success HTTP status
    #[error("Endpoint returned status {status}: {body}")]
    EndpointStatus {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Endpoint response body did not have the expected JSON shape
    #[error("Malformed endpoint response: {0}")]
    MalformedResponse(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Clipboard access or write failure
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for chatwidget operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
