//! TOML-based configuration for strata.
//!
//! Supports a config file (strata.toml) with environment variable expansion,
//! overlaid by the process environment.
//!
//! Example configuration:
//! ```toml
//! [provider]
//! default = "snowflake"
//!
//! [local]
//! path = "data/banking.db"
//!
//! [warehouse]
//! account = "xy12345.eu-west-1"
//! user = "analyst"
//! password = "${SNOWFLAKE_PASSWORD}"
//! warehouse = "COMPUTE_WH"
//! database = "BANKING"
//! schema = "PUBLIC"
//!
//! [warehouse.driver]
//! path = "/opt/strata/strata-snowflake-driver"
//! ```
//!
//! Environment overrides: `DATA_PROVIDER`, `LOCAL_DB_PATH`,
//! `SNOWFLAKE_ACCOUNT`, `SNOWFLAKE_USER`, `SNOWFLAKE_PASSWORD`,
//! `SNOWFLAKE_WAREHOUSE`, `SNOWFLAKE_DATABASE`, `SNOWFLAKE_SCHEMA` and
//! `SNOWFLAKE_DRIVER_PATH`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported provider: {0}. Supported: local, snowflake")]
    UnsupportedProvider(String),
}

/// Root configuration structure.
///
/// Built once at startup and passed around by reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub local: LocalSettings,
    pub warehouse: WarehouseSettings,
}

/// Provider selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider used when the caller does not name one.
    pub default: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default: "local".to_string(),
        }
    }
}

/// Embedded store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalSettings {
    /// Database file path (supports ${ENV_VAR} expansion).
    pub path: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            path: "data/banking.db".to_string(),
        }
    }
}

/// Warehouse credentials and driver location.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WarehouseSettings {
    pub account: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub driver: DriverSettings,
}

impl fmt::Debug for WarehouseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseSettings")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("driver", &self.driver)
            .finish()
    }
}

/// Warehouse driver process configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Path to the driver binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

/// Complete set of warehouse credentials.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseCredentials {
    pub account: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
}

impl fmt::Debug for WarehouseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseCredentials")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"***")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations, then apply
    /// environment overrides.
    ///
    /// Searches in order:
    /// 1. Environment variable `STRATA_CONFIG`
    /// 2. `./strata.toml`
    /// 3. `~/.config/strata/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        Ok(Self::locate()?.with_env())
    }

    fn locate() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("STRATA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("strata.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("strata").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Defaults overlaid by the process environment only.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unset and empty values leave the
    /// current setting alone.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATA_PROVIDER") {
            self.provider.default = v;
        }
        if let Some(v) = get("LOCAL_DB_PATH") {
            self.local.path = v;
        }

        let wh = &mut self.warehouse;
        for (key, slot) in [
            ("SNOWFLAKE_ACCOUNT", &mut wh.account),
            ("SNOWFLAKE_USER", &mut wh.user),
            ("SNOWFLAKE_PASSWORD", &mut wh.password),
            ("SNOWFLAKE_WAREHOUSE", &mut wh.warehouse),
            ("SNOWFLAKE_DATABASE", &mut wh.database),
            ("SNOWFLAKE_SCHEMA", &mut wh.schema),
            ("SNOWFLAKE_DRIVER_PATH", &mut wh.driver.path),
        ] {
            if let Some(v) = get(key) {
                *slot = Some(v);
            }
        }

        self
    }

    /// Configured default provider name.
    pub fn default_provider(&self) -> &str {
        &self.provider.default
    }

    /// Local database path with environment variables expanded.
    pub fn local_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.local.path).map(PathBuf::from)
    }

    /// All six warehouse credentials, or the environment names of the
    /// ones that are missing.
    ///
    /// A value that is blank or refers to an unset environment variable
    /// counts as missing.
    pub fn warehouse_credentials(&self) -> Result<WarehouseCredentials, Vec<&'static str>> {
        let wh = &self.warehouse;
        let mut missing = Vec::new();
        let mut take = |key: &'static str, value: &Option<String>| {
            let resolved = value
                .as_deref()
                .and_then(|v| expand_env_vars(v).ok())
                .filter(|v| !v.trim().is_empty());
            if resolved.is_none() {
                missing.push(key);
            }
            resolved.unwrap_or_default()
        };

        let credentials = WarehouseCredentials {
            account: take("SNOWFLAKE_ACCOUNT", &wh.account),
            user: take("SNOWFLAKE_USER", &wh.user),
            password: take("SNOWFLAKE_PASSWORD", &wh.password),
            warehouse: take("SNOWFLAKE_WAREHOUSE", &wh.warehouse),
            database: take("SNOWFLAKE_DATABASE", &wh.database),
            schema: take("SNOWFLAKE_SCHEMA", &wh.schema),
        };

        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(missing)
        }
    }

    /// Configured driver binary path, if any.
    pub fn warehouse_driver_path(&self) -> Option<PathBuf> {
        let path = self.warehouse.driver.path.as_ref()?;
        let expanded = expand_env_vars(path).ok()?;
        Some(PathBuf::from(expanded))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                var_name.push(ch);
            }
            chars.next_if_eq(&'}');
        } else {
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
