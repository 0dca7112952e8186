//! Oracle integration for olist-query.
//!
//! The oracle is the external text-generation service that turns a question
//! into a candidate query. Everything provider-specific sits behind
//! [`LlmClient`]; everything question-specific (prompt, reply parsing) sits
//! behind [`Generator`].

pub mod anthropic;
pub mod factory;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use factory::{create_client, ClientOptions};
pub use generator::{Candidate, Correction, Generator, SqlGenerator};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::parse_generation_reply;
pub use prompt::{build_correction_message, build_messages, build_question_message, system_prompt};
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Default output budget per oracle call.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default oracle request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for oracle clients.
///
/// One call is one blocking round-trip. Implementations must be thread-safe
/// so independent pipeline runs can share a client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the messages and returns the reply text.
    ///
    /// Transport, authentication and rate-limit failures all come back as
    /// `QueryError::OracleUnavailable`.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Oracle provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Anthropic (Claude)
    #[default]
    Anthropic,
    /// OpenAI (GPT-4o, etc.)
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Mock => None,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "anthropic".parse::<LlmProvider>().unwrap(),
            LlmProvider::Anthropic
        );
        assert_eq!(
            "Claude".parse::<LlmProvider>().unwrap(),
            LlmProvider::Anthropic
        );
        assert_eq!(
            "OpenAI".parse::<LlmProvider>().unwrap(),
            LlmProvider::OpenAi
        );
        assert_eq!("mock".parse::<LlmProvider>().unwrap(), LlmProvider::Mock);

        let err = "ollama".parse::<LlmProvider>().unwrap_err();
        assert_eq!(err, "Unknown LLM provider: ollama");
    }

    #[test]
    fn test_provider_as_str() {
        assert_eq!(LlmProvider::Anthropic.as_str(), "anthropic");
        assert_eq!(LlmProvider::OpenAi.as_str(), "openai");
        assert_eq!(LlmProvider::Mock.as_str(), "mock");
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(format!("{}", LlmProvider::OpenAi), "openai");
    }

    #[test]
    fn test_provider_default() {
        assert_eq!(LlmProvider::default(), LlmProvider::Anthropic);
        assert_eq!(
            LlmProvider::default().default_model(),
            "claude-sonnet-4-20250514"
        );
    }

    #[test]
    fn test_provider_api_key_env() {
        assert_eq!(
            LlmProvider::Anthropic.api_key_env(),
            Some("ANTHROPIC_API_KEY")
        );
        assert_eq!(LlmProvider::OpenAi.api_key_env(), Some("OPENAI_API_KEY"));
        assert_eq!(LlmProvider::Mock.api_key_env(), None);
    }

    #[tokio::test]
    async fn test_mock_client_implements_trait() {
        let client: Box<dyn LlmClient> = Box::new(
            MockLlmClient::new().with_response("users", r#"{"sql": "SELECT 1"}"#),
        );
        let messages = vec![Message::user("Show me all users")];
        let response = client.complete(&messages).await.unwrap();
        assert!(response.contains("SELECT"));
    }
}
