//! Configuration for strata.
//!
//! Handles the config file, environment overrides and provider names.

mod provider;
mod settings;

pub use provider::Provider;
pub use settings::{
    expand_env_vars, DriverSettings, LocalSettings, ProviderSettings, Settings, SettingsError,
    WarehouseCredentials, WarehouseSettings,
};
