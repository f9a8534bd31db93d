//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use once_cell::sync::Lazy;
use regex::Regex;

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

static PLAIN_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Keywords that cannot appear as bare identifiers in either backend.
const RESERVED: &[&str] = &[
    "all", "and", "as", "between", "by", "case", "create", "delete", "distinct", "drop", "else",
    "end", "from", "group", "having", "in", "insert", "is", "join", "like", "limit", "not", "null",
    "on", "or", "order", "select", "table", "then", "union", "update", "when", "where",
];

/// Whether an identifier can be emitted without quotes.
pub fn is_plain_identifier(ident: &str) -> bool {
    PLAIN_IDENT.is_match(ident) && !RESERVED.contains(&ident.to_lowercase().as_str())
}

/// Quote identifier with double quotes (ANSI style).
/// Used by: SQLite, Snowflake
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Emit plain identifiers bare, double-quote everything else.
pub fn quote_if_needed(ident: &str) -> String {
    if is_plain_identifier(ident) {
        ident.to_string()
    } else {
        quote_double(ident)
    }
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Snowflake
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: SQLite
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit `LIMIT n` (standard SQL).
/// Used by: SQLite, Snowflake
pub fn emit_limit_standard(limit: u64) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Limit)
        .space()
        .push(Token::LitInt(limit as i64));
    ts
}
