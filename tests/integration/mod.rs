//! Integration tests against a seeded on-disk warehouse.

pub mod engine_test;
pub mod fallback_test;
pub mod fixture;
pub mod pipeline_test;
pub mod sqlite_test;
