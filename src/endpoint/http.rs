//! HTTP implementation of the conversational endpoint
//!
//! Posts the request as JSON and expects a JSON object that may carry an
//! `output` string.

use crate::config::EndpointConfig;
use crate::endpoint::{ChatEndpoint, EndpointReply, EndpointRequest};
use crate::error::{ChatWidgetError, Result};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Response body returned by the endpoint
#[derive(Debug, Deserialize)]
struct EndpointResponse {
    #[serde(default)]
    output: Option<String>,
}

/// Conversational endpoint reached over HTTP POST
///
/// # Examples
///
/// ```
/// use chatwidget::config::EndpointConfig;
/// use chatwidget::endpoint::HttpEndpoint;
///
/// let config = EndpointConfig {
///     url: "http://localhost:5678/webhook/chat".to_string(),
///     ..Default::default()
/// };
/// let endpoint = HttpEndpoint::new(&config);
/// assert!(endpoint.is_ok());
/// ```
pub struct HttpEndpoint {
    client: Client,
    url: String,
}

impl HttpEndpoint {
    /// Create a new HTTP endpoint from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a configured header is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ChatWidgetError::Config(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ChatWidgetError::Config(format!("Invalid header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("chatwidget/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ChatWidgetError::Endpoint(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized HTTP endpoint: url={}", config.url);

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// The URL requests are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatEndpoint for HttpEndpoint {
    async fn send(&self, request: &EndpointRequest) -> Result<EndpointReply> {
        tracing::debug!(
            request_id = %request.request_id,
            "Posting prompt to {}",
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to reach chat endpoint: {}", e);
                ChatWidgetError::Endpoint(format!("Failed to reach endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat endpoint returned error {}: {}", status, body);
            return Err(ChatWidgetError::EndpointStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read chat endpoint response body: {}", e);
            ChatWidgetError::Endpoint(format!("Failed to read response: {}", e))
        })?;

        let parsed: EndpointResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse chat endpoint response: {}", e);
            ChatWidgetError::MalformedResponse(e.to_string())
        })?;

        let reply = EndpointReply::from_output(parsed.output);
        if reply == EndpointReply::Empty {
            tracing::debug!(request_id = %request.request_id, "Endpoint reply had no output");
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_new_rejects_invalid_header_name() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let config = EndpointConfig {
            headers,
            ..Default::default()
        };
        assert!(HttpEndpoint::new(&config).is_err());
    }

    #[test]
    fn test_new_accepts_valid_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("x-widget-id".to_string(), "support".to_string());
        let config = EndpointConfig {
            headers,
            ..Default::default()
        };
        let endpoint = HttpEndpoint::new(&config).expect("endpoint");
        assert_eq!(endpoint.url(), config.url);
    }

    #[test]
    fn test_response_without_output_parses() {
        let parsed: EndpointResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.output.is_none());
    }

    #[test]
    fn test_response_with_non_string_output_is_malformed() {
        assert!(serde_json::from_str::<EndpointResponse>(r#"{"output": 42}"#).is_err());
    }
}
