//! Tabular results and introspection descriptors shared by both backends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::Record;

/// Rows returned by a backend, cells as JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Rows as column name to value maps, in column order.
    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.record(row)).collect()
    }

    pub fn first_record(&self) -> Option<Record> {
        self.rows.first().map(|row| self.record(row))
    }

    /// Lower-case every column name.
    pub fn lowercase_columns(mut self) -> Self {
        for column in &mut self.columns {
            *column = column.to_lowercase();
        }
        self
    }

    fn record(&self, row: &[Value]) -> Record {
        self.columns
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect()
    }
}

/// Column metadata from introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Ordered column list of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Backend identity and connection target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionTarget {
    #[serde(rename = "SQLite")]
    Sqlite { database: String },
    #[serde(rename = "Snowflake")]
    Snowflake {
        account: String,
        database: String,
        schema: String,
        warehouse: String,
    },
}

/// Description of a backend's connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(flatten)]
    pub target: ConnectionTarget,
    pub connected: bool,
    pub tables: Vec<String>,
}
