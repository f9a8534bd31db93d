//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the differences
//! between the two backends' SQL:
//!
//! - Table casing: SQLite keeps table names as written, Snowflake
//!   upper-cases them (unquoted Snowflake identifiers resolve upper-case)
//! - Boolean literals: `1`/`0` vs `true`/`false`
//! - Parameter placeholders
//!
//! # Usage
//!
//! ```ignore
//! use strata::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Snowflake;
//! assert_eq!(dialect.render_table_name("loans"), "LOANS");
//! ```

pub mod helpers;
mod snowflake;
mod sqlite;

pub use snowflake::Snowflake;
pub use sqlite::Sqlite;

use super::token::TokenStream;

/// How a dialect treats the case of table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCase {
    /// Emit the name as written.
    Preserve,
    /// Emit the name upper-cased.
    Upper,
}

impl TableCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            TableCase::Preserve => name.to_string(),
            TableCase::Upper => name.to_uppercase(),
        }
    }
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// Plain identifiers are emitted bare; anything else is double-quoted.
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_if_needed(ident)
    }

    /// Quote a string literal with `''` escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    // =========================================================================
    // Tables
    // =========================================================================

    /// Casing policy applied to table names.
    fn table_case(&self) -> TableCase {
        TableCase::Preserve
    }

    /// Render a table name: casing policy first, then quoting. A dotted
    /// name is schema-qualified; each part is rendered on its own.
    fn render_table_name(&self, name: &str) -> String {
        let case = self.table_case();
        name.split('.')
            .map(|part| self.quote_identifier(&case.apply(part)))
            .collect::<Vec<_>>()
            .join(".")
    }

    // =========================================================================
    // Parameters and Pagination
    // =========================================================================

    /// Positional parameter placeholder.
    fn placeholder(&self) -> &'static str {
        "?"
    }

    /// Emit a LIMIT clause.
    fn emit_limit(&self, limit: u64) -> TokenStream {
        helpers::emit_limit_standard(limit)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Sqlite,
    Snowflake,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::Snowflake => &Snowflake,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn table_case(&self) -> TableCase {
        self.dialect().table_case()
    }

    fn render_table_name(&self, name: &str) -> String {
        self.dialect().render_table_name(name)
    }

    fn placeholder(&self) -> &'static str {
        self.dialect().placeholder()
    }

    fn emit_limit(&self, limit: u64) -> TokenStream {
        self.dialect().emit_limit(limit)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "local" => Ok(Dialect::Sqlite),
            "snowflake" => Ok(Dialect::Snowflake),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}
