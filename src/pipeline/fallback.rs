//! Offline fallback engine.
//!
//! Answers questions from a fixed library of canned queries, picked by
//! keyword overlap with the question. No oracle is involved and canned
//! queries skip validation.

use tracing::info;

use crate::pipeline::record::AttemptRecord;
use crate::query::QueryExecutor;

/// A canned query and the keywords that select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackEntry {
    pub keywords: &'static [&'static str],
    pub sql: &'static str,
    pub explanation: &'static str,
}

impl FallbackEntry {
    /// Number of keywords that appear in the lower-cased question.
    pub fn score(&self, question_lower: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| question_lower.contains(*keyword))
            .count()
    }
}

/// The canned library, in registration order. The first entry is the default.
pub const FALLBACK_LIBRARY: &[FallbackEntry] = &[
    FallbackEntry {
        keywords: &["revenue", "sales", "monthly"],
        sql: "SELECT strftime('%Y-%m', o.order_purchase_timestamp) as month,
       COUNT(DISTINCT o.order_id) as total_orders,
       ROUND(SUM(p.payment_value), 2) as revenue,
       ROUND(AVG(p.payment_value), 2) as avg_order_value
FROM olist_orders o
JOIN olist_order_payments p ON o.order_id = p.order_id
WHERE o.order_status = 'delivered'
GROUP BY month
ORDER BY month
LIMIT 24",
        explanation: "Monthly revenue trend for delivered orders (in BRL).",
    },
    FallbackEntry {
        keywords: &["category", "categories", "product type"],
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
LIMIT 15",
        explanation: "Top 15 product categories by total sales value.",
    },
    FallbackEntry {
        keywords: &["state", "states", "customer location", "region"],
        sql: "SELECT c.customer_state as state,
       COUNT(DISTINCT c.customer_unique_id) as unique_customers,
       COUNT(DISTINCT o.order_id) as total_orders,
       ROUND(SUM(pay.payment_value), 2) as total_revenue
FROM olist_customers c
JOIN olist_orders o ON c.customer_id = o.customer_id
JOIN olist_order_payments pay ON o.order_id = pay.order_id
WHERE o.order_status = 'delivered'
GROUP BY c.customer_state
ORDER BY total_revenue DESC
LIMIT 15",
        explanation: "Customer distribution and revenue by Brazilian state.",
    },
    FallbackEntry {
        keywords: &["payment", "payment method", "credit card", "boleto"],
        sql: "SELECT payment_type,
       COUNT(*) as usage_count,
       ROUND(AVG(payment_value), 2) as avg_value,
       ROUND(SUM(payment_value), 2) as total_value,
       ROUND(AVG(payment_installments), 1) as avg_installments,
       ROUND(100.0 * COUNT(*) / (SELECT COUNT(*) FROM olist_order_payments), 1) as pct
FROM olist_order_payments
GROUP BY payment_type
ORDER BY total_value DESC",
        explanation: "Payment method distribution: credit card, boleto, voucher, debit card.",
    },
    FallbackEntry {
        keywords: &["review", "rating", "score", "satisfaction"],
        sql: "SELECT review_score,
       COUNT(*) as count,
       ROUND(100.0 * COUNT(*) / (SELECT COUNT(*) FROM olist_order_reviews), 1) as percentage
FROM olist_order_reviews
GROUP BY review_score
ORDER BY review_score DESC",
        explanation: "Distribution of review scores (1-5 stars).",
    },
    FallbackEntry {
        keywords: &["seller", "sellers", "top seller"],
        sql: "SELECT s.seller_city, s.seller_state,
       COUNT(DISTINCT oi.order_id) as orders_fulfilled,
       ROUND(SUM(oi.price), 2) as total_sales,
       ROUND(AVG(oi.price), 2) as avg_item_price,
       COUNT(DISTINCT oi.product_id) as products_sold
FROM olist_sellers s
JOIN olist_order_items oi ON s.seller_id = oi.seller_id
JOIN olist_orders o ON oi.order_id = o.order_id
WHERE o.order_status = 'delivered'
GROUP BY s.seller_city, s.seller_state
ORDER BY total_sales DESC
LIMIT 15",
        explanation: "Top 15 seller cities by total sales.",
    },
    FallbackEntry {
        keywords: &["delivery", "shipping", "freight", "delivery time"],
        sql: "SELECT c.customer_state as state,
       COUNT(*) as delivered_orders,
       ROUND(AVG(julianday(o.order_delivered_customer_date) - julianday(o.order_purchase_timestamp)), 1) as avg_delivery_days,
       ROUND(AVG(julianday(o.order_estimated_delivery_date) - julianday(o.order_delivered_customer_date)), 1) as avg_days_early,
       ROUND(AVG(oi.freight_value), 2) as avg_freight
FROM olist_orders o
JOIN olist_customers c ON o.customer_id = c.customer_id
JOIN olist_order_items oi ON o.order_id = oi.order_id
WHERE o.order_status = 'delivered'
  AND o.order_delivered_customer_date IS NOT NULL
GROUP BY c.customer_state
ORDER BY avg_delivery_days ASC
LIMIT 15",
        explanation: "Average delivery time and freight cost by state.",
    },
    FallbackEntry {
        keywords: &["order status", "status", "cancelled", "canceled"],
        sql: "SELECT order_status,
       COUNT(*) as order_count,
       ROUND(100.0 * COUNT(*) / (SELECT COUNT(*) FROM olist_orders), 1) as percentage
FROM olist_orders
GROUP BY order_status
ORDER BY order_count DESC",
        explanation: "Order status distribution across all orders.",
    },
    FallbackEntry {
        keywords: &["customer", "top customer", "best customer"],
        sql: "SELECT c.customer_unique_id,
       c.customer_city, c.customer_state,
       COUNT(DISTINCT o.order_id) as total_orders,
       ROUND(SUM(pay.payment_value), 2) as total_spent
FROM olist_customers c
JOIN olist_orders o ON c.customer_id = o.customer_id
JOIN olist_order_payments pay ON o.order_id = pay.order_id
WHERE o.order_status = 'delivered'
GROUP BY c.customer_unique_id, c.customer_city, c.customer_state
ORDER BY total_spent DESC
LIMIT 15",
        explanation: "Top 15 customers by total spending.",
    },
    FallbackEntry {
        keywords: &["heavy", "weight", "big product", "large"],
        sql: "SELECT t.product_category_name_english as category,
       ROUND(AVG(p.product_weight_g), 0) as avg_weight_g,
       ROUND(AVG(p.product_length_cm * p.product_height_cm * p.product_width_cm), 0) as avg_volume_cm3,
       COUNT(*) as product_count,
       ROUND(AVG(oi.freight_value), 2) as avg_freight
FROM olist_products p
JOIN product_category_translation t ON p.product_category_name = t.product_category_name
JOIN olist_order_items oi ON p.product_id = oi.product_id
WHERE p.product_weight_g IS NOT NULL
GROUP BY t.product_category_name_english
HAVING product_count >= 10
ORDER BY avg_weight_g DESC
LIMIT 15",
        explanation: "Heaviest product categories by average weight and shipping cost.",
    },
];

/// Picks the library entry for a question.
///
/// Highest keyword count wins; ties go to the earlier entry; no match at all
/// yields the first entry.
pub fn select_entry(question: &str) -> &'static FallbackEntry {
    let question_lower = question.to_lowercase();
    let mut best = &FALLBACK_LIBRARY[0];
    let mut best_score = 0;

    for entry in FALLBACK_LIBRARY {
        let score = entry.score(&question_lower);
        if score > best_score {
            best = entry;
            best_score = score;
        }
    }

    best
}

/// Oracle-free engine answering from [`FALLBACK_LIBRARY`].
#[derive(Debug, Clone)]
pub struct FallbackEngine {
    executor: QueryExecutor,
}

impl FallbackEngine {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Runs the best-matching canned query.
    pub async fn process(&self, question: &str) -> AttemptRecord {
        let entry = select_entry(question);
        info!(explanation = entry.explanation, "Answering from canned library");

        let mut record = AttemptRecord::new(question).demo();
        record.sql = entry.sql.to_string();
        record.explanation = entry.explanation.to_string();
        record.attempts = 1;
        record.apply_outcome(self.executor.execute(entry.sql).await);
        record
    }
}
