//! Scripted database clients for testing.
//!
//! Deterministic stand-ins for the storage engine that replay a fixed
//! sequence of outcomes and remember every statement they were asked to run.

use super::{ColumnInfo, DatabaseClient, QueryResult, Value};
use crate::error::{QueryError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A database client that replays scripted outcomes in order.
///
/// Once the script is exhausted, every further call returns a single-row
/// `result` column echoing the SQL.
#[derive(Debug, Default)]
pub struct ScriptedDatabaseClient {
    script: Mutex<VecDeque<Result<QueryResult>>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedDatabaseClient {
    /// Creates a client with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an engine error.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(QueryError::execution(message)));
        self
    }

    /// Queues a successful result.
    pub fn then_return(self, result: QueryResult) -> Self {
        self.push(Ok(result));
        self
    }

    /// Returns every SQL string executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|sql| sql.clone())
            .unwrap_or_default()
    }

    fn push(&self, outcome: Result<QueryResult>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    fn echo(sql: &str) -> QueryResult {
        QueryResult::with_data(
            vec![ColumnInfo::new("result", "TEXT")],
            vec![vec![Value::String(format!("Mock result for: {sql}"))]],
        )
    }
}

#[async_trait]
impl DatabaseClient for ScriptedDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }

        let next = self
            .script
            .lock()
            .map_err(|_| QueryError::internal("mock script lock poisoned"))?
            .pop_front();

        next.unwrap_or_else(|| Ok(Self::echo(sql)))
    }
}

/// A database client whose every call fails with the same engine error.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that always reports `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(QueryError::execution(self.message.clone()))
    }
}
