//! SQLite SQL dialect.
//!
//! SQLite features relevant here:
//! - ANSI identifier quoting (`"`), case-insensitive table names
//! - No native boolean type (`1`/`0`)
//! - `?` positional parameters
//! - HAVING without GROUP BY (3.39+, bundled by rusqlite)

use super::helpers;
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }
}
