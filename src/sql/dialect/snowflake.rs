//! Snowflake SQL dialect.
//!
//! Snowflake resolves unquoted identifiers upper-case, so table names are
//! emitted upper-cased. Positional binds use `?`.

use super::helpers;
use super::{SqlDialect, TableCase};

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn table_case(&self) -> TableCase {
        TableCase::Upper
    }
}
