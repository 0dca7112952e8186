//! Query execution for olist-query.
//!
//! Isolates row capping, timing and result shaping from the orchestrator.

pub mod executor;

pub use executor::{apply_row_cap, has_limit_clause, ExecutionOutcome, JsonRow, QueryExecutor};
