//! Database abstraction layer for olist-query.
//!
//! Provides a trait-based interface to the storage engine so the pipeline can
//! run against the SQLite warehouse or a scripted stand-in.

mod mock;
pub mod schema;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, ScriptedDatabaseClient};
pub use schema::schema_description;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// Implementations must not share a connection between concurrent calls;
/// each `execute_query` acquires and releases its own.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a single SQL statement and returns the results.
    ///
    /// Engine-reported failures come back as `QueryError::ExecutionFailed`;
    /// failure to reach the engine at all as `QueryError::Connection`.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;
}
