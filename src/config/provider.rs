//! Data provider identifiers.

use std::fmt;

use serde::Serialize;

use super::SettingsError;

/// Backends a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Embedded SQLite database file.
    Local,
    /// Snowflake cloud warehouse.
    Snowflake,
}

impl Provider {
    /// Parse a provider name, accepting the usual aliases.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.trim().to_lowercase().as_str() {
            "local" | "sqlite" => Ok(Provider::Local),
            "snowflake" | "warehouse" => Ok(Provider::Snowflake),
            other => Err(SettingsError::UnsupportedProvider(other.to_string())),
        }
    }

    /// Canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Snowflake => "snowflake",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
