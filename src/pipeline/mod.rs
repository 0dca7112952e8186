//! Question-to-result pipeline.
//!
//! [`Engine`] is the single entry point: it either runs the oracle-backed
//! [`Pipeline`] or, with no oracle credential, the [`FallbackEngine`]. Both
//! return an [`AttemptRecord`].

mod fallback;
mod orchestrator;
mod record;

pub use fallback::{select_entry, FallbackEngine, FallbackEntry, FALLBACK_LIBRARY};
pub use orchestrator::Pipeline;
pub use record::AttemptRecord;

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::SqliteClient;
use crate::error::{QueryError, Result};
use crate::llm::{create_client, ClientOptions, LlmClient, LlmProvider, SqlGenerator};
use crate::query::QueryExecutor;
use crate::safety::QueryValidator;

/// The engine answering questions for one process.
#[derive(Debug, Clone)]
pub enum Engine {
    /// Oracle-backed generation with validation and correction.
    Orchestrated(Pipeline),
    /// Canned queries, no oracle.
    Offline(FallbackEngine),
}

impl Engine {
    /// Builds the engine described by `config`.
    ///
    /// The orchestrator is chosen iff an oracle credential is available (or
    /// the provider is `mock`) and `force_offline` is false.
    pub fn from_config(config: &Config, force_offline: bool) -> Result<Self> {
        let db = Arc::new(SqliteClient::open(&config.database.path));
        let executor = QueryExecutor::new(db).with_max_rows(config.pipeline.max_rows);

        let provider = config.llm.provider()?;
        let credential = config.llm.credential();
        let use_oracle =
            !force_offline && (provider == LlmProvider::Mock || credential.is_some());

        if !use_oracle {
            info!(db = %config.database.path.display(), "Running in offline mode");
            return Ok(Self::Offline(FallbackEngine::new(executor)));
        }

        let client: Arc<dyn LlmClient> = Arc::from(create_client(
            provider,
            ClientOptions {
                api_key: credential,
                model: config.llm.model.clone(),
                max_tokens: config.llm.max_tokens,
                timeout_secs: config.llm.timeout_secs,
            },
        )?);

        info!(
            provider = %provider,
            db = %config.database.path.display(),
            "Running with oracle"
        );

        let pipeline = Pipeline::new(Arc::new(SqlGenerator::new(client)), executor)
            .with_validator(QueryValidator::new().with_strict_parse(config.safety.strict_parse))
            .with_max_retries(config.pipeline.max_retries);

        Ok(Self::Orchestrated(pipeline))
    }

    /// Answers one question.
    pub async fn process(&self, question: &str) -> AttemptRecord {
        match self {
            Self::Orchestrated(pipeline) => pipeline.process(question).await,
            Self::Offline(fallback) => fallback.process(question).await,
        }
    }

    /// True for the canned-query engine.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline(_))
    }
}

/// Trims a question and checks it is non-empty and at most `max_chars` long.
pub fn check_question(question: &str, max_chars: usize) -> Result<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(QueryError::rejected("Question cannot be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(QueryError::rejected(format!(
            "Question too long (max {max_chars} characters)"
        )));
    }
    Ok(trimmed)
}
