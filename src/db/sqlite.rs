//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient` trait
//! for the warehouse file using sqlx. Each query runs on its own connection,
//! opened for the duration of the call and closed before returning.

use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{QueryError, Result};
use async_trait::async_trait;
use regex::Regex;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::sqlite::SqliteValueRef;
use sqlx::{
    Column as SqlxColumn, Connection, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    path: PathBuf,
    read_only: bool,
}

impl SqliteClient {
    /// Creates a read-only client for the database file at `path`.
    ///
    /// No connection is opened until the first query.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            read_only: true,
        }
    }

    /// Allows writes through this client. Used to seed fixtures.
    pub fn writable(mut self) -> Self {
        self.read_only = false;
        self
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(self.read_only)
            .create_if_missing(!self.read_only)
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        SqliteConnection::connect_with(&self.connect_options())
            .await
            .map_err(|e| {
                QueryError::connection(format!(
                    "Cannot open database {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    /// Executes a batch of semicolon-separated statements, discarding results.
    ///
    /// Requires a writable client. Used to build fixture databases.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut conn = self.connect().await?;
        let outcome = (&mut conn)
            .execute(sql)
            .await
            .map(|_| ())
            .map_err(|e| QueryError::execution(format_query_error(e)));
        if let Err(e) = conn.close().await {
            debug!("Error closing connection: {}", e);
        }
        outcome
    }

    /// Runs `sql` on an open connection.
    async fn run(conn: &mut SqliteConnection, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        let statement = (&mut *conn)
            .prepare(sql)
            .await
            .map_err(|e| QueryError::execution(format_query_error(e)))?;

        let mut columns: Vec<ColumnInfo> = statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect();

        let fetched = statement
            .query()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| QueryError::execution(format_query_error(e)))?;
        let execution_time = start.elapsed();

        if columns.iter().any(|c| is_unknown_type(&c.data_type)) {
            let declared = declared_column_types(conn).await;
            resolve_unknown_types(&mut columns, &declared);
        }

        let rows: Vec<Row> = fetched.iter().map(|row| convert_row(row, &columns)).collect();

        debug!(
            row_count = rows.len(),
            elapsed_ms = execution_time.as_secs_f64() * 1000.0,
            "Query executed"
        );

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.connect().await?;

        let result = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            Self::run(&mut conn, sql),
        )
        .await
        .unwrap_or_else(|_| {
            Err(QueryError::execution(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            )))
        });

        if let Err(e) = conn.close().await {
            debug!("Error closing connection: {}", e);
        }

        result
    }
}

/// sqlx reports `NULL` for declared types it has no mapping for, such as
/// `DECIMAL(10,2)`.
fn is_unknown_type(type_name: &str) -> bool {
    type_name.is_empty() || type_name.eq_ignore_ascii_case("NULL")
}

/// Declared types of every column in the database, keyed by lowercase
/// column name. The first table to declare a name wins.
async fn declared_column_types(conn: &mut SqliteConnection) -> HashMap<String, String> {
    let listed: std::result::Result<Vec<(String, String)>, sqlx::Error> = sqlx::query_as(
        "SELECT p.name, p.type FROM sqlite_master m \
         JOIN pragma_table_info(m.name) p \
         WHERE m.type = 'table' ORDER BY m.name, p.cid",
    )
    .fetch_all(&mut *conn)
    .await;

    match listed {
        Ok(pairs) => {
            let mut declared = HashMap::new();
            for (name, data_type) in pairs {
                declared.entry(name.to_lowercase()).or_insert(data_type);
            }
            declared
        }
        Err(e) => {
            debug!("Could not read declared column types: {}", e);
            HashMap::new()
        }
    }
}

/// Fills in unknown column types from the declared types, matching on the
/// result column name.
fn resolve_unknown_types(columns: &mut [ColumnInfo], declared: &HashMap<String, String>) {
    for column in columns.iter_mut().filter(|c| is_unknown_type(&c.data_type)) {
        if let Some(data_type) = declared.get(&column.name.to_lowercase()) {
            column.data_type = data_type.clone();
        }
    }
}

/// Converts a SqliteRow to our Row type.
fn convert_row(row: &SqliteRow, columns: &[ColumnInfo]) -> Row {
    (0..row.len())
        .map(|i| {
            let declared = columns.get(i).map(|c| c.data_type.as_str()).unwrap_or("");
            convert_value(row, i, declared)
        })
        .collect()
}

/// Converts a single column value, normalizing by declared column type.
///
/// SQLite stores values dynamically, so the storage class of the value itself
/// decides how it is decoded. The declared type only refines text and numbers:
/// DECIMAL/NUMERIC/REAL become floats and DATE/DATETIME/TIMESTAMP become ISO-8601.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let Ok(raw) = row.try_get_raw(index) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }

    let storage = storage_class(&raw);
    let declared = declared.to_uppercase();
    let is_decimal = ["DECIMAL", "NUMERIC", "REAL", "FLOAT", "DOUBLE"]
        .iter()
        .any(|prefix| declared.starts_with(prefix));
    let is_temporal = declared.starts_with("DATE")
        || declared.starts_with("TIMESTAMP")
        || declared == "TIME";

    match storage.as_str() {
        "INTEGER" => match row.try_get::<i64, _>(index) {
            Ok(v) if is_decimal => Value::Float(v as f64),
            Ok(v) => Value::Int(v),
            Err(_) => Value::Null,
        },

        "REAL" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|b| Value::String(format!("<{} bytes>", b.len())))
            .unwrap_or(Value::Null),

        _ => match row.try_get::<String, _>(index) {
            Ok(text) if is_decimal => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::String(text)),
            Ok(text) if is_temporal => Value::String(to_iso8601(&text)),
            Ok(text) => Value::String(text),
            Err(_) => Value::Null,
        },
    }
}

fn storage_class(raw: &SqliteValueRef<'_>) -> String {
    raw.type_info().name().to_uppercase()
}

/// Rewrites `YYYY-MM-DD HH:MM:SS[.fff]` as `YYYY-MM-DDTHH:MM:SS[.fff]`.
///
/// Anything that is not a space-separated timestamp is returned unchanged.
pub(crate) fn to_iso8601(text: &str) -> String {
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    let captures = TIMESTAMP
        .get_or_init(|| {
            Regex::new(r"^(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)$")
                .expect("valid timestamp pattern")
        })
        .captures(text.trim());

    match captures {
        Some(caps) => format!("{}T{}", &caps[1], &caps[2]),
        None => text.to_string(),
    }
}

/// Formats a sqlx error as the engine's own message.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
