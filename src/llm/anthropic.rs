//! Anthropic oracle client.
//!
//! Implements the LlmClient trait for Anthropic's messages API (Claude models).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::{LlmClient, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};

/// Anthropic API base URL.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic client configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Endpoint, overridable for proxies.
    pub base_url: String,
}

impl AnthropicConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the endpoint URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Anthropic oracle client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicClient {
    /// Creates a new Anthropic client with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QueryError::oracle(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Returns the configured model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Extracts the system message and converts remaining messages to Anthropic format.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system = None;
        let mut converted = Vec::new();

        for msg in messages {
            match msg.role {
                // Anthropic takes the system prompt as a top-level field.
                Role::System => system = Some(msg.content.clone()),
                Role::User | Role::Assistant => converted.push(AnthropicMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system, converted)
    }

    /// Parses an API error response.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> QueryError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return QueryError::oracle("Authentication failed. Check your ANTHROPIC_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return QueryError::oracle("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(body) {
            return QueryError::oracle(format!(
                "Anthropic API error: {}",
                error_response.error.message
            ));
        }

        QueryError::oracle(format!("Anthropic API error ({}): {}", status, body))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let (system, converted_messages) = Self::convert_messages(messages);

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            messages: converted_messages,
        };

        debug!(model = %self.config.model, "Sending Anthropic request");

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::oracle("Request timed out. Try again.")
                } else if e.is_connect() {
                    QueryError::oracle("Failed to connect to Anthropic API. Check your network.")
                } else {
                    QueryError::oracle(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::oracle(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        extract_text(&body)
    }
}

/// Concatenates the text blocks of a messages-API response body.
fn extract_text(body: &str) -> Result<String> {
    let response: AnthropicResponse = serde_json::from_str(body)
        .map_err(|e| QueryError::oracle(format!("Failed to parse response: {}", e)))?;

    let text = response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .map(|block| block.text)
        .collect::<String>();

    if text.is_empty() {
        return Err(QueryError::oracle("No response from Anthropic"));
    }

    Ok(text)
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicError,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = AnthropicConfig::new("sk-ant-test", "claude-sonnet-4-20250514");
        assert_eq!(config.api_key, "sk-ant-test");
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.base_url, ANTHROPIC_API_URL);
    }

    #[test]
    fn test_config_builders() {
        let config = AnthropicConfig::new("k", "m")
            .with_timeout(60)
            .with_max_tokens(2048)
            .with_base_url("http://localhost:9999/v1/messages");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.base_url, "http://localhost:9999/v1/messages");
    }

    #[test]
    fn test_convert_messages() {
        let messages = vec![
            Message::system("You are an expert SQL analyst."),
            Message::user("Convert this question to SQL: monthly revenue"),
            Message::assistant("{}"),
        ];

        let (system, converted) = AnthropicClient::convert_messages(&messages);

        assert_eq!(system.as_deref(), Some("You are an expert SQL analyst."));
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "assistant");
    }

    #[test]
    fn test_request_omits_missing_system() {
        let (system, messages) = AnthropicClient::convert_messages(&[Message::user("hi")]);
        let request = AnthropicRequest {
            model: "m".to_string(),
            max_tokens: 1024,
            system,
            messages,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn test_parse_error_unauthorized() {
        let error = AnthropicClient::parse_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(error.to_string().contains("Authentication failed"));
        assert_eq!(error.kind(), "oracle_unavailable");
    }

    #[test]
    fn test_parse_error_rate_limited() {
        let error = AnthropicClient::parse_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(error.to_string().contains("Rate limited"));
    }

    #[test]
    fn test_parse_error_with_message() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens too large"}}"#;
        let error = AnthropicClient::parse_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(error.to_string(), "Anthropic API error: max_tokens too large");
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"{\"sql\": "},{"type":"text","text":"\"SELECT 1\"}"}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"sql": "SELECT 1"}"#);
    }

    #[test]
    fn test_extract_text_empty_is_error() {
        let err = extract_text(r#"{"content":[]}"#).unwrap_err();
        assert_eq!(err.to_string(), "No response from Anthropic");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_oracle_error() {
        let client = AnthropicClient::new(
            AnthropicConfig::new("k", "m")
                .with_timeout(2)
                .with_base_url("http://127.0.0.1:9/v1/messages"),
        )
        .unwrap();

        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert_eq!(err.kind(), "oracle_unavailable");
    }
}
