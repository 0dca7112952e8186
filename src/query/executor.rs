//! Query execution with a row cap.
//!
//! Runs an already-validated query against the storage engine and turns
//! whatever happens into an `ExecutionOutcome`. Engine errors never escape
//! as `Err`; they are carried inside the outcome.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::config::DEFAULT_MAX_ROWS;
use crate::db::{DatabaseClient, QueryResult};
use crate::error::QueryError;

/// A result row keyed by column name, in select-list order.
pub type JsonRow = Map<String, JsonValue>;

/// Query executor bound to one storage engine.
#[derive(Clone)]
pub struct QueryExecutor {
    db: Arc<dyn DatabaseClient>,
    max_rows: usize,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    /// Creates an executor with the default row cap.
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self {
            db,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Sets the row cap used by [`QueryExecutor::execute`].
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Returns the configured row cap.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Executes `sql` with the configured row cap.
    pub async fn execute(&self, sql: &str) -> ExecutionOutcome {
        self.execute_capped(sql, self.max_rows).await
    }

    /// Executes `sql`, appending `LIMIT max_rows` if it has no LIMIT clause.
    pub async fn execute_capped(&self, sql: &str, max_rows: usize) -> ExecutionOutcome {
        let capped = apply_row_cap(sql, max_rows);
        if let Cow::Owned(ref rewritten) = capped {
            debug!(max_rows, "Appended row cap: {}", rewritten);
        }

        match self.db.execute_query(&capped).await {
            Ok(result) => ExecutionOutcome::from_result(result),
            Err(e) => {
                warn!(kind = e.kind(), "Query failed: {}", e);
                ExecutionOutcome::failure(e)
            }
        }
    }
}

/// Result of executing one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// Whether the engine ran the query.
    pub success: bool,
    /// Column names in select-list order.
    pub columns: Vec<String>,
    /// Rows keyed by column name.
    pub rows: Vec<JsonRow>,
    /// Number of rows returned.
    pub row_count: usize,
    /// Execute-and-fetch wall-clock time, rounded to hundredths of a millisecond.
    pub elapsed_ms: f64,
    /// What went wrong, if anything.
    pub error: Option<QueryError>,
}

impl ExecutionOutcome {
    /// Builds a successful outcome from a query result.
    pub fn from_result(result: QueryResult) -> Self {
        let columns = result.column_names();
        let rows: Vec<JsonRow> = result
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|value| value.to_json()))
                    .collect()
            })
            .collect();

        Self {
            success: true,
            row_count: rows.len(),
            columns,
            rows,
            elapsed_ms: round_ms(result.execution_time.as_secs_f64() * 1000.0),
            error: None,
        }
    }

    /// Builds a failed outcome.
    pub fn failure(error: QueryError) -> Self {
        Self {
            success: false,
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            elapsed_ms: 0.0,
            error: Some(error),
        }
    }

    /// The error message, if the execution failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// True if the engine could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self.error, Some(QueryError::Connection(_)))
    }
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// Returns true if `sql` already contains a LIMIT clause.
pub fn has_limit_clause(sql: &str) -> bool {
    static LIMIT: OnceLock<Regex> = OnceLock::new();
    LIMIT
        .get_or_init(|| Regex::new(r"(?i)\bLIMIT\b").expect("valid LIMIT pattern"))
        .is_match(sql)
}

/// Appends `LIMIT max_rows` to `sql` unless it already has a LIMIT clause.
///
/// A trailing `;` is dropped before appending. Queries that already limit
/// themselves are returned unchanged.
///
/// The check is lexical: a LIMIT anywhere in the text counts, including one
/// inside a subquery, a CTE or a comment, and then no outer cap is added.
pub fn apply_row_cap(sql: &str, max_rows: usize) -> Cow<'_, str> {
    if has_limit_clause(sql) {
        return Cow::Borrowed(sql);
    }

    let body = sql.trim_end().trim_end_matches(';').trim_end();
    Cow::Owned(format!("{body} LIMIT {max_rows}"))
}
