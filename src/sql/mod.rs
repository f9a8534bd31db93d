//! SQL generation module.
//!
//! A small type-safe SQL builder that renders the same query for SQLite
//! and Snowflake:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//!
//! Caller-supplied values enter as [`Expr::Param`] and are never spliced
//! into SQL text; [`Query::params`] returns them in placeholder order.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect, TableCase};
pub use expr::{
    avg, case_when, col, count_star, func, lit_float, lit_int, lit_str, param, star, sum,
    BinaryOperator, Expr, ExprExt, Literal,
};
pub use query::{Query, SelectExpr};
pub use token::{Token, TokenStream};
