//! Integration tests for olist-query.
//!
//! Each test seeds its own SQLite warehouse in a temporary directory.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
