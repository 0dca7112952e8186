//! Generation client.
//!
//! Turns a question (and optionally a failed attempt to repair) into a
//! candidate query with one oracle round-trip. No retries happen here.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::llm::parser::parse_generation_reply;
use crate::llm::prompt::build_messages;
use crate::llm::LlmClient;

/// A candidate query and its plain-language explanation.
///
/// `explanation` is `None` when the reply carried none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub sql: String,
    pub explanation: Option<String>,
}

impl Candidate {
    pub fn new(sql: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            explanation: Some(explanation.into()),
        }
    }

    /// A candidate whose reply had no explanation.
    pub fn unexplained(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            explanation: None,
        }
    }
}

/// The failed query and engine error handed back to the oracle for repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub previous_sql: String,
    pub error: String,
}

impl Correction {
    pub fn new(previous_sql: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            previous_sql: previous_sql.into(),
            error: error.into(),
        }
    }
}

/// Produces candidate queries for questions.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates a candidate for `question`, repairing `correction` if given.
    ///
    /// Oracle failures come back as `OracleUnavailable`, undecodable replies
    /// as `GenerationParse`.
    async fn generate(&self, question: &str, correction: Option<&Correction>)
        -> Result<Candidate>;
}

/// Generator backed by an oracle client and the Olist prompt.
#[derive(Clone)]
pub struct SqlGenerator {
    client: Arc<dyn LlmClient>,
}

impl SqlGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for SqlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlGenerator").finish_non_exhaustive()
    }
}

#[async_trait]
impl Generator for SqlGenerator {
    async fn generate(
        &self,
        question: &str,
        correction: Option<&Correction>,
    ) -> Result<Candidate> {
        let messages = build_messages(question, correction);
        debug!(correcting = correction.is_some(), "Requesting candidate query");

        let reply = self.client.complete(&messages).await?;
        parse_generation_reply(&reply)
    }
}
