//! Entity to table resolution.

use std::fmt;

/// Table an entity resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    Loans,
    Deposits,
    Customers,
    /// Unmapped entity, passed through as written.
    Other(String),
}

impl Table {
    /// Resolve an entity name. Lookup is case-insensitive and accepts the
    /// singular form.
    pub fn resolve(entity: &str) -> Self {
        match entity.to_lowercase().as_str() {
            "loan" | "loans" => Table::Loans,
            "deposit" | "deposits" => Table::Deposits,
            "customer" | "customers" => Table::Customers,
            _ => Table::Other(entity.to_string()),
        }
    }

    /// Logical table name; dialects apply their own casing on render.
    pub fn name(&self) -> &str {
        match self {
            Table::Loans => "loans",
            Table::Deposits => "deposits",
            Table::Customers => "customers",
            Table::Other(name) => name,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
