//! Oracle client factory.
//!
//! Centralizes provider-specific logic for creating oracle clients.

use crate::error::{QueryError, Result};
use crate::llm::{
    AnthropicClient, AnthropicConfig, LlmClient, LlmProvider, MockLlmClient, OpenAiClient,
    OpenAiConfig, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS,
};

/// Settings for building an oracle client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Credential; required for every provider except `mock`.
    pub api_key: Option<String>,
    /// Model override; the provider default is used when absent.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientOptions {
    /// Options carrying only a credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Creates an oracle client for the given provider.
///
/// Credential resolution (explicit key, then environment) is done by the
/// caller; this only fails when a provider that needs a key gets none.
pub fn create_client(provider: LlmProvider, options: ClientOptions) -> Result<Box<dyn LlmClient>> {
    let model = options
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    match provider {
        LlmProvider::Anthropic => {
            let key = require_key(provider, options.api_key)?;
            let config = AnthropicConfig::new(key, model)
                .with_max_tokens(options.max_tokens)
                .with_timeout(options.timeout_secs);
            Ok(Box::new(AnthropicClient::new(config)?))
        }
        LlmProvider::OpenAi => {
            let key = require_key(provider, options.api_key)?;
            let config = OpenAiConfig::new(key, model)
                .with_max_tokens(options.max_tokens)
                .with_timeout(options.timeout_secs);
            Ok(Box::new(OpenAiClient::new(config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

fn require_key(provider: LlmProvider, api_key: Option<String>) -> Result<String> {
    api_key.filter(|key| !key.trim().is_empty()).ok_or_else(|| {
        QueryError::oracle(format!(
            "No API key configured. Set {}.",
            provider.api_key_env().unwrap_or("an API key")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_client() {
        let client = create_client(LlmProvider::Mock, ClientOptions::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_anthropic_without_key_fails() {
        let result = create_client(LlmProvider::Anthropic, ClientOptions::default());
        let err = result.err().unwrap();
        assert_eq!(err.kind(), "oracle_unavailable");
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_create_openai_with_blank_key_fails() {
        let result = create_client(LlmProvider::OpenAi, ClientOptions::with_api_key("  "));
        assert!(result.err().unwrap().to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_create_with_provided_key() {
        assert!(create_client(LlmProvider::Anthropic, ClientOptions::with_api_key("k")).is_ok());
        assert!(create_client(LlmProvider::OpenAi, ClientOptions::with_api_key("k")).is_ok());
    }
}
