//! Engine selection from configuration.

use super::fixture::warehouse;
use olist_query::config::Config;
use olist_query::pipeline::Engine;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_mock_provider_answers_through_pipeline() {
    let db = warehouse().await;
    let mut config = Config::default();
    config.database.path = db.path.clone();
    config.llm.provider = "mock".to_string();

    let engine = Engine::from_config(&config, false).unwrap();
    let record = engine.process("how are orders distributed by status?").await;

    assert!(!engine.is_offline());
    assert!(record.success, "{:?}", record.error);
    assert!(!record.demo_mode);
    assert_eq!(record.columns, vec!["order_status", "order_count"]);
    assert_eq!(record.row_count, 2);
}

#[tokio::test]
async fn test_demo_flag_answers_from_library() {
    let db = warehouse().await;
    let mut config = Config::default();
    config.database.path = db.path.clone();
    config.llm.provider = "mock".to_string();
    config.pipeline.max_rows = 1;

    let engine = Engine::from_config(&config, true).unwrap();
    let record = engine.process("payment methods").await;

    assert!(engine.is_offline());
    assert!(record.success);
    assert!(record.demo_mode);
    // The payment query has no LIMIT, so the configured cap applies.
    assert_eq!(record.row_count, 1);
    assert_eq!(record.rows[0]["payment_type"], serde_json::json!("credit_card"));
}
