//! Prompt construction for oracle requests.
//!
//! The system prompt (schema, worked examples, rules, reply format) is
//! composed once per process and reused for every request.

use std::sync::OnceLock;

use crate::db::schema_description;
use crate::llm::generator::Correction;
use crate::llm::types::Message;

/// A worked question/query pair shown to the oracle.
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub question: &'static str,
    pub sql: &'static str,
}

/// Worked examples embedded in the system prompt.
pub const FEW_SHOT_EXAMPLES: &[FewShotExample] = &[
    FewShotExample {
        question: "Show me total revenue by month",
        sql: "SELECT strftime('%Y-%m', o.order_purchase_timestamp) as month,
       COUNT(DISTINCT o.order_id) as total_orders,
       ROUND(SUM(p.payment_value), 2) as revenue
FROM olist_orders o
JOIN olist_order_payments p ON o.order_id = p.order_id
WHERE o.order_status = 'delivered'
GROUP BY month
ORDER BY month
LIMIT 50;",
    },
    FewShotExample {
        question: "Top 10 product categories by sales",
        sql: "SELECT t.product_category_name_english as category,
       COUNT(DISTINCT oi.order_id) as total_orders,
       ROUND(SUM(oi.price), 2) as total_sales,
       ROUND(AVG(oi.price), 2) as avg_price
FROM olist_order_items oi
JOIN olist_products p ON oi.product_id = p.product_id
JOIN product_category_translation t ON p.product_category_name = t.product_category_name
JOIN olist_orders o ON oi.order_id = o.order_id
WHERE o.order_status = 'delivered'
GROUP BY t.product_category_name_english
ORDER BY total_sales DESC
LIMIT 10;",
    },
    FewShotExample {
        question: "Which states have the most customers?",
        sql: "SELECT c.customer_state as state,
       COUNT(DISTINCT c.customer_unique_id) as unique_customers,
       COUNT(DISTINCT o.order_id) as total_orders,
       ROUND(SUM(pay.payment_value), 2) as total_spent
FROM olist_customers c
JOIN olist_orders o ON c.customer_id = o.customer_id
JOIN olist_order_payments pay ON o.order_id = pay.order_id
WHERE o.order_status = 'delivered'
GROUP BY c.customer_state
ORDER BY unique_customers DESC
LIMIT 15;",
    },
    FewShotExample {
        question: "Average review score by product category",
        sql: "SELECT t.product_category_name_english as category,
       COUNT(r.id) as review_count,
       ROUND(AVG(r.review_score), 2) as avg_rating,
       SUM(CASE WHEN r.review_score >= 4 THEN 1 ELSE 0 END) as positive_reviews,
       SUM(CASE WHEN r.review_score <= 2 THEN 1 ELSE 0 END) as negative_reviews
FROM olist_order_reviews r
JOIN olist_orders o ON r.order_id = o.order_id
JOIN olist_order_items oi ON o.order_id = oi.order_id
JOIN olist_products p ON oi.product_id = p.product_id
JOIN product_category_translation t ON p.product_category_name = t.product_category_name
GROUP BY t.product_category_name_english
HAVING review_count >= 10
ORDER BY avg_rating DESC
LIMIT 15;",
    },
    FewShotExample {
        question: "Payment method distribution",
        sql: "SELECT payment_type,
       COUNT(*) as usage_count,
       ROUND(AVG(payment_value), 2) as avg_value,
       ROUND(SUM(payment_value), 2) as total_value,
       ROUND(AVG(payment_installments), 1) as avg_installments
FROM olist_order_payments
GROUP BY payment_type
ORDER BY total_value DESC;",
    },
];

/// Numbered generation rules.
pub const RULES: &[&str] = &[
    "ONLY generate SELECT queries. Never INSERT, UPDATE, DELETE, DROP, ALTER, CREATE.",
    "Use proper JOINs based on foreign key relationships shown above.",
    "Always use table aliases (o for orders, c for customers, oi for order_items, p for products, etc.).",
    "For date functions, use SQLite syntax: strftime('%Y-%m', column), date(), etc.",
    "Always add LIMIT (max 500) unless user asks for all data.",
    "Use ROUND() for decimal values.",
    "For \"revenue\" or \"sales\", use SUM(payment_value) from olist_order_payments OR SUM(price) from olist_order_items.",
    "For delivered orders, filter: o.order_status = 'delivered'.",
    "For English category names, always JOIN with product_category_translation table.",
    "For unique customer count, use COUNT(DISTINCT customer_unique_id).",
    "Boolean/NULL handling: use IS NULL / IS NOT NULL for missing data.",
    "Currency is BRL (Brazilian Real).",
];

const PREAMBLE: &str = "You are an expert SQL analyst for the Olist Brazilian E-Commerce dataset. \
Convert natural language questions into accurate SQLite SQL queries.";

const RESPONSE_FORMAT: &str = r#"Respond with ONLY a JSON object (no markdown, no extra text):
{"sql": "YOUR SQL QUERY HERE", "explanation": "Brief plain English explanation"}"#;

/// Renders the full system prompt.
pub fn build_system_prompt(schema: &str) -> String {
    let mut prompt = String::with_capacity(schema.len() + 8 * 1024);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n## Database Schema:\n");
    prompt.push_str(schema);

    prompt.push_str("\n\n## Few-Shot Examples:\n");
    for example in FEW_SHOT_EXAMPLES {
        prompt.push_str(&format!(
            "\nQ: \"{}\"\nSQL:\n```sql\n{}\n```\n",
            example.question, example.sql
        ));
    }

    prompt.push_str("\n## Rules:\n");
    for (i, rule) in RULES.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }

    prompt.push_str("\n## Response Format:\n");
    prompt.push_str(RESPONSE_FORMAT);
    prompt.push('\n');

    prompt
}

/// The process-wide system prompt over the Olist schema.
pub fn system_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(|| build_system_prompt(schema_description()))
}

/// Builds the user message for a fresh question.
pub fn build_question_message(question: &str) -> String {
    format!("Convert this question to SQL: {question}")
}

/// Builds the user message asking the oracle to repair a failed query.
pub fn build_correction_message(question: &str, correction: &Correction) -> String {
    format!(
        "The SQL query produced an error. Fix it.\n\n\
         Original question: {question}\n\
         Generated SQL: {sql}\n\
         Error: {error}\n\n\
         Remember: SQLite syntax, check table/column names against schema, correct JOINs.\n\
         Return ONLY: {{\"sql\": \"FIXED SQL\", \"explanation\": \"What this query does\"}}\n",
        sql = correction.previous_sql,
        error = correction.error,
    )
}

/// Builds the message list for one oracle request.
pub fn build_messages(question: &str, correction: Option<&Correction>) -> Vec<Message> {
    let user = match correction {
        Some(correction) => build_correction_message(question, correction),
        None => build_question_message(question),
    };

    vec![Message::system(system_prompt()), Message::user(user)]
}
