//! The attempt record returned for every question.

use serde::Serialize;

use crate::error::QueryError;
use crate::llm::Candidate;
use crate::query::{ExecutionOutcome, JsonRow};

/// Everything known about one question's run, success or not.
///
/// A failed record still carries the last query and explanation tried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub success: bool,
    pub question: String,
    pub sql: String,
    pub explanation: String,
    pub columns: Vec<String>,
    pub rows: Vec<JsonRow>,
    pub row_count: usize,
    pub execution_time_ms: f64,
    /// Candidates obtained from the oracle; a failed generation call does not
    /// count. Always 1 for canned queries.
    pub attempts: u32,
    pub error: Option<String>,
    /// Category slug of `error`, e.g. `execution_failed`.
    pub error_kind: Option<&'static str>,
    pub demo_mode: bool,
}

impl AttemptRecord {
    /// Starts an empty, unsuccessful record for `question`.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            success: false,
            question: question.into(),
            sql: String::new(),
            explanation: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            execution_time_ms: 0.0,
            attempts: 0,
            error: None,
            error_kind: None,
            demo_mode: false,
        }
    }

    /// Marks the record as produced by the offline engine.
    pub fn demo(mut self) -> Self {
        self.demo_mode = true;
        self
    }

    /// Records the candidate currently being tried.
    ///
    /// A candidate without an explanation keeps the previous one.
    pub fn set_candidate(&mut self, candidate: &Candidate) {
        self.sql = candidate.sql.clone();
        if let Some(explanation) = &candidate.explanation {
            self.explanation = explanation.clone();
        }
    }

    /// Copies an execution outcome into the record.
    ///
    /// A failed outcome also sets the record's error.
    pub fn apply_outcome(&mut self, outcome: ExecutionOutcome) {
        self.success = outcome.success;
        self.columns = outcome.columns;
        self.rows = outcome.rows;
        self.row_count = outcome.row_count;
        self.execution_time_ms = outcome.elapsed_ms;
        if let Some(error) = outcome.error {
            self.fail(error);
        } else {
            self.error = None;
            self.error_kind = None;
        }
    }

    /// Finalizes the record as failed.
    pub fn fail(&mut self, error: QueryError) {
        self.success = false;
        self.error_kind = Some(error.kind());
        self.error = Some(error.to_string());
    }
}
