//! Error types for olist-query.
//!
//! Defines the error enum shared by every stage of the question pipeline.
//! Pipeline stages return these internally; the orchestrator folds them into
//! the attempt record instead of handing them to the caller.

use thiserror::Error;

/// Main error type for olist-query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No oracle credential, or the oracle request failed (network, auth, rate limit).
    #[error("{0}")]
    OracleUnavailable(String),

    /// The oracle reply held no decodable JSON object and no recoverable SQL.
    #[error("{0}")]
    GenerationParse(String),

    /// The static safety gate rejected a candidate query.
    #[error("{0}")]
    ValidationRejected(String),

    /// The storage engine reported an error for an otherwise valid query.
    #[error("{0}")]
    ExecutionFailed(String),

    /// All correction rounds were consumed without a successful execution.
    #[error("{0}")]
    RetryBudgetExhausted(String),

    /// The storage engine could not be opened at all.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Creates an oracle-unavailable error with the given message.
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::OracleUnavailable(msg.into())
    }

    /// Creates a generation parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::GenerationParse(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::ValidationRejected(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Creates a retry-exhausted error with the given message.
    pub fn exhausted(msg: impl Into<String>) -> Self {
        Self::RetryBudgetExhausted(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::OracleUnavailable(_) => "Oracle Unavailable",
            Self::GenerationParse(_) => "Generation Parse Failure",
            Self::ValidationRejected(_) => "Validation Rejected",
            Self::ExecutionFailed(_) => "Execution Failed",
            Self::RetryBudgetExhausted(_) => "Retry Budget Exhausted",
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns a stable machine-readable slug for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OracleUnavailable(_) => "oracle_unavailable",
            Self::GenerationParse(_) => "generation_parse_failure",
            Self::ValidationRejected(_) => "validation_rejected",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::RetryBudgetExhausted(_) => "retry_budget_exhausted",
            Self::Connection(_) => "connection",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias using QueryError.
pub type Result<T> = std::result::Result<T, QueryError>;
