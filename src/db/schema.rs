//! The Olist warehouse schema.
//!
//! Tables, columns and relationships of the Brazilian e-commerce dataset,
//! rendered once into the text that grounds every oracle request. The schema
//! is fixed for the lifetime of the process.

use std::sync::OnceLock;

/// A table in the warehouse.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    /// Table name.
    pub name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [Column],
}

/// A column in a warehouse table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Declared SQL type.
    pub data_type: &'static str,
    /// Whether the column is the table's primary key.
    pub primary_key: bool,
    /// What the column holds.
    pub description: &'static str,
}

/// A foreign key relationship between two tables.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub from_table: &'static str,
    pub from_column: &'static str,
    pub to_table: &'static str,
    pub to_column: &'static str,
}

const fn col(name: &'static str, data_type: &'static str, description: &'static str) -> Column {
    Column {
        name,
        data_type,
        primary_key: false,
        description,
    }
}

const fn pk(name: &'static str, data_type: &'static str, description: &'static str) -> Column {
    Column {
        name,
        data_type,
        primary_key: true,
        description,
    }
}

const fn fk(
    from_table: &'static str,
    from_column: &'static str,
    to_table: &'static str,
    to_column: &'static str,
) -> ForeignKey {
    ForeignKey {
        from_table,
        from_column,
        to_table,
        to_column,
    }
}

/// All warehouse tables.
pub const TABLES: &[Table] = &[
    Table {
        name: "olist_customers",
        columns: &[
            pk("customer_id", "VARCHAR(50)", "Unique ID for each order-customer mapping"),
            col("customer_unique_id", "VARCHAR(50)", "Unique customer (same person across orders)"),
            col("customer_zip_code_prefix", "VARCHAR(10)", "First 5 digits of customer zip code"),
            col("customer_city", "VARCHAR(100)", "Customer city name"),
            col("customer_state", "VARCHAR(5)", "Customer state abbreviation (SP, RJ, MG, etc.)"),
        ],
    },
    Table {
        name: "olist_sellers",
        columns: &[
            pk("seller_id", "VARCHAR(50)", "Unique seller ID"),
            col("seller_zip_code_prefix", "VARCHAR(10)", "First 5 digits of seller zip code"),
            col("seller_city", "VARCHAR(100)", "Seller city name"),
            col("seller_state", "VARCHAR(5)", "Seller state abbreviation"),
        ],
    },
    Table {
        name: "olist_products",
        columns: &[
            pk("product_id", "VARCHAR(50)", "Unique product ID"),
            col("product_category_name", "VARCHAR(100)", "Category in Portuguese (join with translation table)"),
            col("product_name_length", "INTEGER", "Number of characters in product name"),
            col("product_description_length", "INTEGER", "Number of characters in description"),
            col("product_photos_qty", "INTEGER", "Number of product photos"),
            col("product_weight_g", "INTEGER", "Product weight in grams"),
            col("product_length_cm", "INTEGER", "Product length in cm"),
            col("product_height_cm", "INTEGER", "Product height in cm"),
            col("product_width_cm", "INTEGER", "Product width in cm"),
        ],
    },
    Table {
        name: "product_category_translation",
        columns: &[
            pk("product_category_name", "VARCHAR(100)", "Portuguese category name"),
            col("product_category_name_english", "VARCHAR(100)", "English translation of category"),
        ],
    },
    Table {
        name: "olist_orders",
        columns: &[
            pk("order_id", "VARCHAR(50)", "Unique order ID"),
            col("customer_id", "VARCHAR(50)", "Customer who placed the order"),
            col("order_status", "VARCHAR(20)", "delivered/shipped/canceled/unavailable/processing/created/approved/invoiced"),
            col("order_purchase_timestamp", "DATETIME", "When the order was placed"),
            col("order_approved_at", "DATETIME", "When payment was approved"),
            col("order_delivered_carrier_date", "DATETIME", "When handed to the carrier"),
            col("order_delivered_customer_date", "DATETIME", "When delivered to the customer"),
            col("order_estimated_delivery_date", "DATETIME", "Estimated delivery date"),
        ],
    },
    Table {
        name: "olist_order_items",
        columns: &[
            pk("id", "INTEGER", "Auto-increment ID"),
            col("order_id", "VARCHAR(50)", "Which order"),
            col("order_item_id", "INTEGER", "Item sequence number within the order (1, 2, 3...)"),
            col("product_id", "VARCHAR(50)", "Which product"),
            col("seller_id", "VARCHAR(50)", "Which seller fulfilled it"),
            col("shipping_limit_date", "DATETIME", "Seller shipping deadline"),
            col("price", "DECIMAL(10,2)", "Item price in BRL (R$)"),
            col("freight_value", "DECIMAL(10,2)", "Shipping cost in BRL (R$)"),
        ],
    },
    Table {
        name: "olist_order_payments",
        columns: &[
            pk("id", "INTEGER", "Auto-increment ID"),
            col("order_id", "VARCHAR(50)", "Which order"),
            col("payment_sequential", "INTEGER", "Payment sequence (1 = first payment)"),
            col("payment_type", "VARCHAR(30)", "credit_card / boleto / voucher / debit_card"),
            col("payment_installments", "INTEGER", "Number of installments chosen"),
            col("payment_value", "DECIMAL(10,2)", "Payment amount in BRL (R$)"),
        ],
    },
    Table {
        name: "olist_order_reviews",
        columns: &[
            pk("id", "INTEGER", "Auto-increment ID"),
            col("review_id", "VARCHAR(50)", "Unique review ID"),
            col("order_id", "VARCHAR(50)", "Reviewed order"),
            col("review_score", "INTEGER", "Rating 1-5 stars"),
            col("review_comment_title", "TEXT", "Review title (may be NULL, Portuguese)"),
            col("review_comment_message", "TEXT", "Review text (may be NULL, Portuguese)"),
            col("review_creation_date", "DATETIME", "When the review was written"),
            col("review_answer_timestamp", "DATETIME", "When the seller responded"),
        ],
    },
    Table {
        name: "olist_geolocation",
        columns: &[
            pk("id", "INTEGER", "Auto-increment ID"),
            col("geolocation_zip_code_prefix", "VARCHAR(10)", "Zip code prefix"),
            col("geolocation_lat", "FLOAT", "Latitude"),
            col("geolocation_lng", "FLOAT", "Longitude"),
            col("geolocation_city", "VARCHAR(100)", "City name"),
            col("geolocation_state", "VARCHAR(5)", "State abbreviation"),
        ],
    },
];

/// Foreign key relationships between warehouse tables.
pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("olist_orders", "customer_id", "olist_customers", "customer_id"),
    fk("olist_order_items", "order_id", "olist_orders", "order_id"),
    fk("olist_order_items", "product_id", "olist_products", "product_id"),
    fk("olist_order_items", "seller_id", "olist_sellers", "seller_id"),
    fk("olist_order_payments", "order_id", "olist_orders", "order_id"),
    fk("olist_order_reviews", "order_id", "olist_orders", "order_id"),
    fk(
        "olist_products",
        "product_category_name",
        "product_category_translation",
        "product_category_name",
    ),
];

const NOTES: &[&str] = &[
    "Currency is BRL (Brazilian Real, R$)",
    "Dates range from 2016 to 2018",
    "Categories are in Portuguese; use product_category_translation to get English names",
    "customer_id is per-order; use customer_unique_id to count unique customers",
    "Most orders have status \"delivered\"",
    "Brazilian states: SP=São Paulo, RJ=Rio de Janeiro, MG=Minas Gerais, etc.",
];

/// Returns the schema description supplied to the oracle.
///
/// Rendered on first use and cached for the rest of the process.
pub fn schema_description() -> &'static str {
    static DESCRIPTION: OnceLock<String> = OnceLock::new();
    DESCRIPTION.get_or_init(render_schema)
}

fn render_schema() -> String {
    let mut out = String::from(
        "Database: Olist Brazilian E-Commerce (SQLite)\n\
         100K+ real orders from 2016-2018, Brazilian marketplace\n\n",
    );

    for table in TABLES {
        out.push_str(&format!("Table: {}\n", table.name));
        for column in table.columns {
            out.push_str(&format_column_line(table, column));
        }
        out.push('\n');
    }

    out.push_str("Foreign Keys:\n");
    for key in FOREIGN_KEYS {
        out.push_str(&format!(
            "  - {}.{} -> {}.{}\n",
            key.from_table, key.from_column, key.to_table, key.to_column
        ));
    }

    out.push_str("\nNotes:\n");
    for note in NOTES {
        out.push_str(&format!("  - {note}\n"));
    }

    out
}

fn format_column_line(table: &Table, column: &Column) -> String {
    let references = FOREIGN_KEYS
        .iter()
        .filter(|key| key.from_table == table.name && key.from_column == column.name)
        .map(|key| format!("FK -> {}.{}", key.to_table, key.to_column));

    let annotations = column
        .primary_key
        .then(|| "PK".to_string())
        .into_iter()
        .chain(references)
        .collect::<Vec<_>>();

    if annotations.is_empty() {
        format!(
            "  - {}: {} -- {}\n",
            column.name, column.data_type, column.description
        )
    } else {
        format!(
            "  - {}: {} ({}) -- {}\n",
            column.name,
            column.data_type,
            annotations.join(", "),
            column.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_lists_every_table() {
        let description = schema_description();
        for table in TABLES {
            assert!(
                description.contains(&format!("Table: {}", table.name)),
                "missing {}",
                table.name
            );
        }
    }

    #[test]
    fn test_description_annotates_keys() {
        let description = schema_description();
        assert!(description.contains("  - order_id: VARCHAR(50) (PK) -- Unique order ID"));
        assert!(description
            .contains("  - customer_id: VARCHAR(50) (FK -> olist_customers.customer_id)"));
        assert!(description.contains("  - olist_order_items.seller_id -> olist_sellers.seller_id"));
    }

    #[test]
    fn test_description_is_cached() {
        let first = schema_description();
        let second = schema_description();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_foreign_keys_reference_known_columns() {
        let has_column = |table: &str, column: &str| {
            TABLES
                .iter()
                .find(|t| t.name == table)
                .is_some_and(|t| t.columns.iter().any(|c| c.name == column))
        };
        for key in FOREIGN_KEYS {
            assert!(has_column(key.from_table, key.from_column));
            assert!(has_column(key.to_table, key.to_column));
        }
    }
}
