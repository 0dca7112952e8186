//! Oracle-backed pipeline against the seeded warehouse.

use super::fixture::warehouse;
use olist_query::llm::{MockLlmClient, SqlGenerator};
use olist_query::pipeline::Pipeline;
use olist_query::query::QueryExecutor;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const BROKEN: &str = r#"{"sql": "SELECT c.state, COUNT(*) AS customers FROM olist_customers c GROUP BY c.state", "explanation": "Customers per state."}"#;
const FIXED: &str = r#"{"sql": "SELECT c.customer_state AS state, COUNT(DISTINCT c.customer_unique_id) AS customers FROM olist_customers c GROUP BY c.customer_state ORDER BY customers DESC, state", "explanation": "Unique customers per state."}"#;

#[tokio::test]
async fn test_engine_error_is_corrected() {
    let db = warehouse().await;
    let llm = Arc::new(MockLlmClient::new().then_reply(BROKEN).then_reply(FIXED));
    let pipeline = Pipeline::new(
        Arc::new(SqlGenerator::new(llm.clone())),
        QueryExecutor::new(Arc::new(db.client())),
    );

    let record = pipeline.process("customers per state").await;

    assert!(record.success, "{:?}", record.error);
    assert_eq!(record.attempts, 2);
    assert_eq!(record.explanation, "Unique customers per state.");
    assert_eq!(record.columns, vec!["state", "customers"]);
    assert_eq!(record.rows[0], json!({"state": "MG", "customers": 1}).as_object().cloned().unwrap());
    assert_eq!(record.row_count, 3);

    let correction = &llm.requests()[1][1].content;
    assert!(correction.contains("Error: no such column: c.state"));
}

#[tokio::test]
async fn test_persistent_engine_error_exhausts_budget() {
    let db = warehouse().await;
    let llm = Arc::new(MockLlmClient::new().with_response("", BROKEN));
    let pipeline = Pipeline::new(
        Arc::new(SqlGenerator::new(llm.clone())),
        QueryExecutor::new(Arc::new(db.client())),
    )
    .with_max_retries(2);

    let record = pipeline.process("customers per state").await;

    assert!(!record.success);
    assert_eq!(record.attempts, 3);
    assert_eq!(llm.call_count(), 3);
    assert_eq!(
        record.error.as_deref(),
        Some("Failed after 3 attempts: no such column: c.state")
    );
    assert!(record.sql.starts_with("SELECT c.state"));
}

#[tokio::test]
async fn test_fenced_reply_runs() {
    let db = warehouse().await;
    let llm = Arc::new(MockLlmClient::new().then_reply(
        "```json\n{\"sql\": \"SELECT review_score FROM olist_order_reviews ORDER BY review_score DESC;\", \"explanation\": \"Scores.\"}\n```",
    ));
    let pipeline = Pipeline::new(
        Arc::new(SqlGenerator::new(llm)),
        QueryExecutor::new(Arc::new(db.client())),
    );

    let record = pipeline.process("review scores").await;

    assert!(record.success, "{:?}", record.error);
    assert_eq!(record.row_count, 3);
    assert_eq!(record.rows[0]["review_score"], json!(5));
}
