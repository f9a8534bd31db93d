//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings. A [`Token::Param`] carries a bound value:
//! it renders as the dialect placeholder in executable SQL and as an
//! escaped literal in inline (display) SQL.

use super::dialect::{Dialect, SqlDialect};
use super::expr::Literal;

/// SQL Token - every element the query builder can emit.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    As,
    GroupBy,
    Having,
    Limit,
    Case,
    When,
    Then,
    Else,
    End,

    // === Punctuation ===
    Comma,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Gt,
    Lte,
    Gte,
    Mul,
    Div,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Simple identifier (column, alias)
    Ident(String),
    /// Table name, subject to the dialect's table casing policy
    TableName(String),
    /// Integer literal
    LitInt(i64),
    /// Float literal
    LitFloat(f64),
    /// String literal
    LitString(String),
    /// Boolean literal
    LitBool(bool),
    /// NULL literal
    LitNull,
    /// Bound parameter value
    Param(Literal),

    /// Function name, rendered upper-case
    FunctionName(String),
}

impl Token {
    /// Serialize this token for execution: parameters become placeholders.
    pub fn serialize(&self, dialect: Dialect) -> String {
        match self {
            Token::Param(_) => dialect.placeholder().into(),
            other => other.serialize_inline(dialect),
        }
    }

    /// Serialize this token for display: parameters are inlined as literals.
    pub fn serialize_inline(&self, dialect: Dialect) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::As => "AS".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Having => "HAVING".into(),
            Token::Limit => "LIMIT".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Mul => "*".into(),
            Token::Div => "/".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::TableName(name) => dialect.render_table_name(name),
            Token::LitInt(n) => n.to_string(),
            Token::LitFloat(f) => format_float(*f),
            Token::LitString(s) => dialect.quote_string(s),
            Token::LitBool(b) => dialect.format_bool(*b).into(),
            Token::LitNull => "NULL".into(),
            Token::Param(lit) => lit.to_token().serialize_inline(dialect),

            Token::FunctionName(name) => name.to_uppercase(),
        }
    }
}

/// Format a float literal. Non-finite values have no SQL spelling and
/// render as NULL.
fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "NULL".into();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format(f).to_string()
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize to executable SQL with placeholders.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    /// Serialize to display SQL with parameter values inlined.
    pub fn serialize_inline(&self, dialect: Dialect) -> String {
        self.tokens
            .iter()
            .map(|t| t.serialize_inline(dialect))
            .collect()
    }

    /// Bound parameter values, in the order their placeholders appear.
    pub fn params(&self) -> Vec<Literal> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Param(lit) => Some(lit.clone()),
                _ => None,
            })
            .collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
