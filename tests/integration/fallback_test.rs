//! Offline engine end to end.

use super::fixture::warehouse;
use olist_query::pipeline::{FallbackEngine, FALLBACK_LIBRARY};
use olist_query::query::QueryExecutor;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn engine(db: &super::fixture::Warehouse) -> FallbackEngine {
    FallbackEngine::new(QueryExecutor::new(Arc::new(db.client())))
}

#[tokio::test]
async fn test_monthly_revenue_offline() {
    let db = warehouse().await;

    let record = engine(&db).process("monthly revenue").await;

    assert!(record.success, "{:?}", record.error);
    assert!(record.demo_mode);
    assert_eq!(record.attempts, 1);
    assert!(record.columns.contains(&"month".to_string()));
    assert!(record.columns.contains(&"revenue".to_string()));
    assert_eq!(record.row_count, 2);
    assert_eq!(record.rows[0]["month"], json!("2017-01"));
    assert_eq!(record.rows[0]["revenue"], json!(177.5));
    assert_eq!(record.rows[0]["total_orders"], json!(2));
    assert_eq!(record.rows[1]["month"], json!("2017-02"));
}

#[tokio::test]
async fn test_top_sellers_offline() {
    let db = warehouse().await;

    let record = engine(&db).process("show me top sellers by sales").await;

    assert!(record.success);
    assert_eq!(record.explanation, "Top 15 seller cities by total sales.");
    assert_eq!(record.rows[0]["seller_city"], json!("campinas"));
    assert_eq!(record.rows[0]["total_sales"], json!(249.9));
}

#[tokio::test]
async fn test_unmatched_question_uses_first_entry() {
    let db = warehouse().await;

    let record = engine(&db).process("tell me something interesting").await;

    assert!(record.success);
    assert_eq!(record.sql, FALLBACK_LIBRARY[0].sql);
}

#[tokio::test]
async fn test_every_canned_query_runs() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client()));

    for entry in FALLBACK_LIBRARY {
        let outcome = executor.execute(entry.sql).await;
        assert!(
            outcome.success,
            "{}: {:?}",
            entry.explanation,
            outcome.error_message()
        );
        assert!(!outcome.columns.is_empty());
    }
}

#[tokio::test]
async fn test_missing_database_fails_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FallbackEngine::new(QueryExecutor::new(Arc::new(
        olist_query::db::SqliteClient::open(dir.path().join("absent.sqlite3")),
    )));

    let record = engine.process("monthly revenue").await;

    assert!(!record.success);
    assert!(record.demo_mode);
    assert_eq!(record.error_kind, Some("connection"));
    assert_eq!(record.sql, FALLBACK_LIBRARY[0].sql);
}
