//! Mock oracle client for testing.
//!
//! Replays scripted replies in order, then falls back to pattern-matched
//! replies, then to a fixed default query. Every request is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{QueryError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

const DEFAULT_REPLY: &str = r#"{"sql": "SELECT order_status, COUNT(*) AS order_count FROM olist_orders GROUP BY order_status ORDER BY order_count DESC", "explanation": "Order status distribution across all orders."}"#;

/// Mock oracle client returning canned replies.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    /// Replies consumed one per call, before anything else.
    script: Mutex<VecDeque<Result<String>>>,
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Every message list received, in order.
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the last user message contains `pattern`, the mock returns `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Queues a reply for the next unscripted call.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queues an oracle failure for the next unscripted call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(QueryError::oracle(message)));
        self
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn push(&self, reply: Result<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        self.custom_responses
            .iter()
            .find(|(pattern, _)| input_lower.contains(&pattern.to_lowercase()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| DEFAULT_REPLY.to_string())
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> &str {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }

        let scripted = self
            .script
            .lock()
            .map_err(|_| QueryError::internal("mock script lock poisoned"))?
            .pop_front();

        match scripted {
            Some(reply) => reply,
            None => Ok(self.mock_response(Self::extract_user_input(messages))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_reply_is_json() {
        let client = MockLlmClient::new();
        let reply = client.complete(&[Message::user("anything")]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert!(value["sql"].as_str().unwrap().starts_with("SELECT"));
    }

    #[tokio::test]
    async fn test_mock_custom_response_case_insensitive() {
        let client = MockLlmClient::new().with_response("Revenue", r#"{"sql": "SELECT 42"}"#);
        let reply = client
            .complete(&[Message::system("ignored"), Message::user("monthly REVENUE")])
            .await
            .unwrap();
        assert_eq!(reply, r#"{"sql": "SELECT 42"}"#);
    }

    #[tokio::test]
    async fn test_mock_script_takes_precedence_and_drains() {
        let client = MockLlmClient::new()
            .with_response("q", "pattern")
            .then_fail("down")
            .then_reply("scripted");

        assert!(client.complete(&[Message::user("q")]).await.is_err());
        assert_eq!(client.complete(&[Message::user("q")]).await.unwrap(), "scripted");
        assert_eq!(client.complete(&[Message::user("q")]).await.unwrap(), "pattern");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockLlmClient::new();
        let messages = vec![Message::system("s"), Message::user("u")];
        client.complete(&messages).await.unwrap();
        assert_eq!(client.requests(), vec![messages]);
    }
}
