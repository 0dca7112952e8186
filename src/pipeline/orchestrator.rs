//! Generate, validate, execute, and correct on failure.
//!
//! The retry loop is an explicit state machine driven by a bounded `for`
//! loop. `attempts` on the record counts generation calls, so the first call
//! counts as 1 even when it fails.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_RETRIES;
use crate::error::QueryError;
use crate::llm::{Candidate, Correction, Generator};
use crate::pipeline::record::AttemptRecord;
use crate::query::{ExecutionOutcome, QueryExecutor};
use crate::safety::QueryValidator;

/// One step of the retry loop.
#[derive(Debug)]
enum State {
    Generating(Option<Correction>),
    Validating(Candidate),
    Executing(Candidate),
    Correcting { failed: Candidate, error: String },
    Done(ExecutionOutcome),
    Failed(QueryError),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::Generating(_) => "generating",
            Self::Validating(_) => "validating",
            Self::Executing(_) => "executing",
            Self::Correcting { .. } => "correcting",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }
}

/// The oracle-backed question pipeline.
#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn Generator>,
    validator: QueryValidator,
    executor: QueryExecutor,
    max_retries: u32,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("validator", &self.validator)
            .field("executor", &self.executor)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline with the lexical validator and default retry bound.
    pub fn new(generator: Arc<dyn Generator>, executor: QueryExecutor) -> Self {
        Self {
            generator,
            validator: QueryValidator::new(),
            executor,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Replaces the validator.
    pub fn with_validator(mut self, validator: QueryValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Sets how many correction rounds follow a failed execution.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the retry bound.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs one question to completion.
    ///
    /// Never fails: every error ends up in the returned record.
    pub async fn process(&self, question: &str) -> AttemptRecord {
        let mut record = AttemptRecord::new(question);
        let mut generations: u32 = 0;
        let mut corrections: u32 = 0;
        let mut state = State::Generating(None);

        // Each round is at most four transitions; two more reach a terminal state.
        let ceiling = 4 * (self.max_retries as usize + 1) + 2;

        for _ in 0..ceiling {
            debug!(state = state.name(), attempt = generations, "Pipeline step");

            state = match state {
                State::Generating(correction) => {
                    match self.generator.generate(question, correction.as_ref()).await {
                        Ok(candidate) => {
                            generations += 1;
                            record.attempts = generations;
                            record.set_candidate(&candidate);
                            State::Validating(candidate)
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::Validating(candidate) => {
                    let verdict = self.validator.validate(&candidate.sql);
                    if verdict.valid {
                        State::Executing(candidate)
                    } else {
                        let reason = verdict.reason.unwrap_or_default();
                        warn!(attempt = generations, "Candidate rejected: {}", reason);
                        let prefix = if corrections == 0 {
                            "Validation failed"
                        } else {
                            "Corrected SQL validation failed"
                        };
                        State::Failed(QueryError::rejected(format!("{prefix}: {reason}")))
                    }
                }
                State::Executing(candidate) => {
                    let outcome = self.executor.execute(&candidate.sql).await;
                    self.after_execution(candidate, outcome, generations, corrections)
                }
                State::Correcting { failed, error } => {
                    corrections += 1;
                    State::Generating(Some(Correction::new(failed.sql, error)))
                }
                State::Done(outcome) => {
                    info!(
                        attempts = generations,
                        row_count = outcome.row_count,
                        elapsed_ms = outcome.elapsed_ms,
                        "Question answered"
                    );
                    record.apply_outcome(outcome);
                    return record;
                }
                State::Failed(error) => {
                    info!(attempts = generations, kind = error.kind(), "Question failed");
                    record.fail(error);
                    return record;
                }
            };
        }

        record.fail(QueryError::internal("retry loop did not terminate"));
        record
    }

    fn after_execution(
        &self,
        candidate: Candidate,
        outcome: ExecutionOutcome,
        generations: u32,
        corrections: u32,
    ) -> State {
        if outcome.success {
            return State::Done(outcome);
        }

        if outcome.is_unreachable() {
            return State::Failed(
                outcome
                    .error
                    .unwrap_or_else(|| QueryError::connection("database unreachable")),
            );
        }

        let error = outcome
            .error_message()
            .unwrap_or_else(|| "unknown execution error".to_string());

        if corrections < self.max_retries {
            State::Correcting {
                failed: candidate,
                error,
            }
        } else {
            State::Failed(QueryError::exhausted(format!(
                "Failed after {generations} attempts: {error}"
            )))
        }
    }
}
