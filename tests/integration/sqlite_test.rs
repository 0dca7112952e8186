//! Query execution against the seeded warehouse.

use super::fixture::warehouse;
use olist_query::db::{DatabaseClient, Value};
use olist_query::query::QueryExecutor;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_timestamps_are_iso8601() {
    let db = warehouse().await;

    let result = db
        .client()
        .execute_query("SELECT order_purchase_timestamp FROM olist_orders WHERE order_id = 'o1'")
        .await
        .unwrap();

    assert_eq!(result.rows[0][0], Value::from("2017-01-05T10:00:00"));
}

#[tokio::test]
async fn test_decimal_columns_are_floats() {
    let db = warehouse().await;

    let result = db
        .client()
        .execute_query("SELECT price, payment_value FROM olist_order_items oi JOIN olist_order_payments p ON oi.order_id = p.order_id WHERE oi.id = 1")
        .await
        .unwrap();

    assert_eq!(result.rows[0], vec![Value::Float(100.0), Value::Float(115.5)]);
}

#[tokio::test]
async fn test_executor_caps_rows() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client())).with_max_rows(2);

    let outcome = executor
        .execute("SELECT order_id FROM olist_orders ORDER BY order_id")
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.row_count, 2);
    assert_eq!(outcome.rows[1]["order_id"], json!("o2"));
}

#[tokio::test]
async fn test_executor_respects_existing_limit() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client())).with_max_rows(2);

    let outcome = executor
        .execute("SELECT order_id FROM olist_orders ORDER BY order_id LIMIT 3")
        .await;

    assert_eq!(outcome.row_count, 3);
}

#[tokio::test]
async fn test_executor_reports_engine_error() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client()));

    let outcome = executor.execute("SELECT o.totl FROM olist_orders o").await;

    assert!(!outcome.success);
    assert!(outcome
        .error_message()
        .unwrap()
        .contains("no such column: o.totl"));
}

#[tokio::test]
async fn test_julianday_arithmetic_is_supported() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client()));

    let outcome = executor
        .execute(
            "SELECT ROUND(julianday(order_delivered_customer_date) - julianday(order_purchase_timestamp), 1) AS days \
             FROM olist_orders WHERE order_id = 'o1'",
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.rows[0]["days"], json!(7.2));
}

#[tokio::test]
async fn test_concurrent_queries_use_separate_connections() {
    let db = warehouse().await;
    let executor = QueryExecutor::new(Arc::new(db.client()));

    let (a, b, c) = tokio::join!(
        executor.execute("SELECT COUNT(*) AS n FROM olist_orders"),
        executor.execute("SELECT COUNT(*) AS n FROM olist_customers"),
        executor.execute("SELECT COUNT(*) AS n FROM olist_sellers"),
    );

    assert_eq!(a.rows[0]["n"], json!(4));
    assert_eq!(b.rows[0]["n"], json!(4));
    assert_eq!(c.rows[0]["n"], json!(2));
}
