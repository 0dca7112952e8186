//! A miniature Olist warehouse on disk.
//!
//! Tables are created from the static schema description so fixtures and
//! prompt never drift apart.

use olist_query::db::schema::TABLES;
use olist_query::db::SqliteClient;
use std::path::PathBuf;
use tempfile::TempDir;

/// A seeded database that lives as long as this value.
pub struct Warehouse {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Warehouse {
    /// Read-only client over the fixture.
    pub fn client(&self) -> SqliteClient {
        SqliteClient::open(&self.path)
    }
}

fn create_tables_sql() -> String {
    TABLES
        .iter()
        .map(|table| {
            let columns = table
                .columns
                .iter()
                .map(|column| {
                    let pk = if column.primary_key { " PRIMARY KEY" } else { "" };
                    format!("{} {}{}", column.name, column.data_type, pk)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("CREATE TABLE {} ({});\n", table.name, columns)
        })
        .collect()
}

const SEED: &str = "
INSERT INTO olist_customers VALUES
    ('c1', 'u1', '01001', 'sao paulo', 'SP'),
    ('c2', 'u2', '20010', 'rio de janeiro', 'RJ'),
    ('c3', 'u1', '01001', 'sao paulo', 'SP'),
    ('c4', 'u3', '30110', 'belo horizonte', 'MG');

INSERT INTO olist_sellers VALUES
    ('s1', '13023', 'campinas', 'SP'),
    ('s2', '80010', 'curitiba', 'PR');

INSERT INTO product_category_translation VALUES
    ('cama_mesa_banho', 'bed_bath_table'),
    ('beleza_saude', 'health_beauty');

INSERT INTO olist_products VALUES
    ('p1', 'cama_mesa_banho', 40, 300, 2, 1200, 30, 10, 20),
    ('p2', 'beleza_saude', 35, 150, 1, 300, 15, 5, 10);

INSERT INTO olist_orders VALUES
    ('o1', 'c1', 'delivered', '2017-01-05 10:00:00', '2017-01-05 11:00:00', '2017-01-06 09:00:00', '2017-01-12 15:30:00', '2017-01-20 00:00:00'),
    ('o2', 'c2', 'delivered', '2017-01-20 08:15:00', '2017-01-20 09:00:00', '2017-01-21 10:00:00', '2017-01-30 12:00:00', '2017-02-05 00:00:00'),
    ('o3', 'c3', 'delivered', '2017-02-03 14:00:00', '2017-02-03 14:30:00', '2017-02-04 08:00:00', '2017-02-10 17:00:00', '2017-02-20 00:00:00'),
    ('o4', 'c4', 'canceled', '2017-02-11 09:45:00', NULL, NULL, NULL, '2017-03-01 00:00:00');

INSERT INTO olist_order_items VALUES
    (1, 'o1', 1, 'p1', 's1', '2017-01-09 10:00:00', 100, 15.5),
    (2, 'o2', 1, 'p2', 's2', '2017-01-24 08:15:00', 49.9, 12.1),
    (3, 'o3', 1, 'p1', 's1', '2017-02-07 14:00:00', 100, 15.5),
    (4, 'o3', 2, 'p2', 's1', '2017-02-07 14:00:00', 49.9, 8.0),
    (5, 'o4', 1, 'p2', 's2', '2017-02-14 09:45:00', 49.9, 12.1);

INSERT INTO olist_order_payments VALUES
    (1, 'o1', 1, 'credit_card', 3, 115.5),
    (2, 'o2', 1, 'boleto', 1, 62),
    (3, 'o3', 1, 'credit_card', 2, 173.4),
    (4, 'o4', 1, 'voucher', 1, 62);

INSERT INTO olist_order_reviews VALUES
    (1, 'r1', 'o1', 5, NULL, 'Otimo', '2017-01-13 00:00:00', '2017-01-14 10:00:00'),
    (2, 'r2', 'o2', 4, NULL, NULL, '2017-01-31 00:00:00', '2017-02-01 10:00:00'),
    (3, 'r3', 'o3', 1, 'Ruim', 'Chegou quebrado', '2017-02-11 00:00:00', '2017-02-12 10:00:00');
";

/// Creates and seeds a fresh warehouse in a temporary directory.
pub async fn warehouse() -> Warehouse {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("olist.sqlite3");

    SqliteClient::open(&path)
        .writable()
        .execute_batch(&format!("{}{}", create_tables_sql(), SEED))
        .await
        .unwrap();

    Warehouse { _dir: dir, path }
}
