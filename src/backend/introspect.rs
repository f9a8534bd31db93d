//! Catalog queries and their mapping to [`TableSchema`] values.
//!
//! Both backends run these through their own `execute_query`, so
//! introspection goes over the same path as any other statement and is
//! never cached.

use serde_json::Value;

use super::result::{ColumnSchema, QueryResult};

/// Column metadata for a table bound as `?`.
pub const SQLITE_COLUMNS_SQL: &str =
    "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid";

pub const SQLITE_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name";

/// Prefix of SQLite's internal tables.
pub const SQLITE_INTERNAL_PREFIX: &str = "sqlite_";

/// Column metadata for `(table, schema)` bound in that order.
pub const SNOWFLAKE_COLUMNS_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = ? AND TABLE_SCHEMA = ? \
     ORDER BY ORDINAL_POSITION";

/// Base tables of the schema bound as `?`.
pub const SNOWFLAKE_TABLES_SQL: &str = "SELECT TABLE_NAME \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_NAME";

/// Map `pragma_table_info` rows.
pub fn columns_from_pragma(result: &QueryResult) -> Vec<ColumnSchema> {
    result
        .records()
        .iter()
        .map(|row| ColumnSchema {
            name: text(row.get("name")),
            data_type: text(row.get("type")),
            nullable: integer(row.get("notnull")) == 0,
            primary_key: Some(integer(row.get("pk")) > 0),
            default: row.get("dflt_value").filter(|v| !v.is_null()).cloned(),
        })
        .collect()
}

/// Map `INFORMATION_SCHEMA.COLUMNS` rows. Column names are expected
/// lower-cased.
pub fn columns_from_information_schema(result: &QueryResult) -> Vec<ColumnSchema> {
    result
        .records()
        .iter()
        .map(|row| ColumnSchema {
            name: text(row.get("column_name")),
            data_type: text(row.get("data_type")),
            nullable: text(row.get("is_nullable")).eq_ignore_ascii_case("YES"),
            primary_key: None,
            default: row.get("column_default").filter(|v| !v.is_null()).cloned(),
        })
        .collect()
}

/// First column of every row as a table name, skipping names that start
/// with `exclude_prefix`.
pub fn table_names(result: &QueryResult, exclude_prefix: Option<&str>) -> Vec<String> {
    result
        .rows
        .iter()
        .filter_map(|row| row.first())
        .map(|cell| text(Some(cell)))
        .filter(|name| exclude_prefix.map_or(true, |prefix| !name.starts_with(prefix)))
        .collect()
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn integer(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}
