//! olist-query: natural-language questions over the Olist e-commerce warehouse.
//!
//! A question goes to an LLM for SQL, the SQL passes a safety gate, runs
//! against SQLite with a row cap, and is repaired by the LLM on failure. With
//! no LLM credential, a canned query library answers instead.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod safety;
