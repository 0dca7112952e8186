//! Parse gate for strict validation.
//!
//! Uses sqlparser-rs with the SQLite dialect to require that a candidate is
//! exactly one query statement with no data-modifying parts anywhere in its
//! tree (CTE bodies, derived tables, set operations).

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use super::Verdict;

/// Parses a candidate and checks that it is a single read-only query.
pub fn check_parsed(candidate: &str) -> Verdict {
    let statements = match Parser::parse_sql(&SQLiteDialect {}, candidate) {
        Ok(statements) => statements,
        Err(e) => return Verdict::reject(format!("Could not parse SQL: {e}")),
    };

    match statements.as_slice() {
        [] => Verdict::reject("Empty SQL query"),
        [statement] if is_read_only_statement(statement) => Verdict::accept(),
        [_] => Verdict::reject("Only SELECT queries are allowed"),
        _ => Verdict::reject("Multiple statements not allowed"),
    }
}

fn is_read_only_statement(statement: &Statement) -> bool {
    match statement {
        Statement::Query(query) => is_read_only_query(query),
        _ => false,
    }
}

/// Recursively inspects a query for data-modifying operations.
fn is_read_only_query(query: &Query) -> bool {
    let ctes_read_only = query
        .with
        .as_ref()
        .map_or(true, |with| {
            with.cte_tables.iter().all(|cte| is_read_only_query(&cte.query))
        });

    ctes_read_only && is_read_only_set_expr(&query.body)
}

fn is_read_only_set_expr(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => is_read_only_select(select),
        SetExpr::Query(query) => is_read_only_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            is_read_only_set_expr(left) && is_read_only_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        // INSERT/UPDATE and any other statement wrapped as a set expression.
        _ => false,
    }
}

fn is_read_only_select(select: &Select) -> bool {
    select.from.iter().all(is_read_only_table_with_joins)
}

fn is_read_only_table_with_joins(twj: &TableWithJoins) -> bool {
    is_read_only_table_factor(&twj.relation)
        && twj
            .joins
            .iter()
            .all(|join| is_read_only_table_factor(&join.relation))
}

fn is_read_only_table_factor(factor: &TableFactor) -> bool {
    match factor {
        TableFactor::Derived { subquery, .. } => is_read_only_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => is_read_only_table_with_joins(table_with_joins),
        _ => true,
    }
}
