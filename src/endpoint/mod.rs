//! Remote conversational endpoint
//!
//! The controller talks to the endpoint through the [`ChatEndpoint`] trait.
//! A request carries the prompt plus correlation metadata; a reply is either
//! the endpoint's output text or an explicit [`EndpointReply::Empty`] when
//! the response had no usable `output` field. Transport failures, non-2xx
//! statuses and malformed bodies are all reported as errors.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod http;
pub use http::HttpEndpoint;

/// Body of the outbound POST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRequest {
    /// The user's raw text
    pub prompt: String,
    /// Correlation id shared by the user message and its reply
    pub request_id: String,
    /// Stable per-profile session identifier
    pub session_id: String,
    /// Dispatch instant, serialized as ISO-8601
    pub timestamp: DateTime<Utc>,
    /// Free-form client description for debugging on the remote side
    pub client_context: ClientContext,
}

/// Client metadata sent alongside each request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    /// Client identifier, e.g. `chatwidget/0.1.0`
    pub user_agent: String,
    /// Operating system the client runs on
    pub platform: String,
    /// Additional configured context strings
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ClientContext {
    /// Context describing this build, extended with `extra`
    pub fn current(extra: BTreeMap<String, String>) -> Self {
        Self {
            user_agent: format!("chatwidget/{}", env!("CARGO_PKG_VERSION")),
            platform: std::env::consts::OS.to_string(),
            extra,
        }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::current(BTreeMap::new())
    }
}

/// Outcome of a successful endpoint round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointReply {
    /// The endpoint produced reply text
    Output(String),
    /// The response carried no `output`, or an empty one
    Empty,
}

impl EndpointReply {
    /// Classifies an optional `output` field
    ///
    /// # Examples
    ///
    /// ```
    /// use chatwidget::endpoint::EndpointReply;
    ///
    /// assert_eq!(EndpointReply::from_output(None), EndpointReply::Empty);
    /// assert_eq!(EndpointReply::from_output(Some("".into())), EndpointReply::Empty);
    /// assert_eq!(
    ///     EndpointReply::from_output(Some("hi".into())),
    ///     EndpointReply::Output("hi".into())
    /// );
    /// ```
    pub fn from_output(output: Option<String>) -> Self {
        match output {
            Some(text) if !text.trim().is_empty() => EndpointReply::Output(text),
            _ => EndpointReply::Empty,
        }
    }
}

/// Conversational endpoint abstraction
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Sends one request and waits for it to settle
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or a body
    /// that is not the expected JSON shape
    async fn send(&self, request: &EndpointRequest) -> Result<EndpointReply>;
}

#[async_trait]
impl<T: ChatEndpoint + ?Sized> ChatEndpoint for std::sync::Arc<T> {
    async fn send(&self, request: &EndpointRequest) -> Result<EndpointReply> {
        (**self).send(request).await
    }
}
