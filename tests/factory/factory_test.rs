//! Integration tests for provider selection and fallback.

use std::collections::HashMap;
use std::sync::Arc;

use strata::backend::{DataBackend, DriverError, WarehouseConnection, WarehouseConnector};
use strata::config::{Provider, Settings, WarehouseCredentials};
use strata::factory::{Fallback, ProviderFactory};
use strata::worker::WorkerError;
use tempfile::TempDir;

const CREDENTIAL_KEYS: [&str; 6] = [
    "SNOWFLAKE_ACCOUNT",
    "SNOWFLAKE_USER",
    "SNOWFLAKE_PASSWORD",
    "SNOWFLAKE_WAREHOUSE",
    "SNOWFLAKE_DATABASE",
    "SNOWFLAKE_SCHEMA",
];

/// Connector whose only behaviour is whether a driver exists.
struct StubConnector(bool);

impl WarehouseConnector for StubConnector {
    fn is_available(&self) -> bool {
        self.0
    }

    fn connect(
        &self,
        _credentials: &WarehouseCredentials,
    ) -> Result<Box<dyn WarehouseConnection>, DriverError> {
        Err(WorkerError::ConnectionFailed("stub".into()).into())
    }
}

struct Env {
    dir: TempDir,
    vars: HashMap<String, String>,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            vars: HashMap::new(),
        }
    }

    fn with_credentials(mut self) -> Self {
        for key in CREDENTIAL_KEYS {
            self.vars.insert(key.to_string(), format!("value-of-{key}"));
        }
        self
    }

    fn set(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    fn without(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    fn settings(&self) -> Settings {
        let mut settings = Settings::default().with_overrides(|key| self.vars.get(key).cloned());
        settings.local.path = self.dir.path().join("banking.db").display().to_string();
        settings
    }
}

fn factory(settings: &Settings, driver: bool) -> ProviderFactory<'_> {
    ProviderFactory::with_connector(settings, Arc::new(StubConnector(driver)))
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_local_by_default() {
    let settings = Env::new().settings();
    let selection = factory(&settings, true).create(None);

    assert_eq!(selection.requested, "local");
    assert_eq!(selection.provider, Provider::Local);
    assert_eq!(selection.backend.provider(), Provider::Local);
    assert!(selection.fallback.is_none());
}

#[test]
fn test_configured_warehouse() {
    let settings = Env::new()
        .with_credentials()
        .set("DATA_PROVIDER", "snowflake")
        .settings();
    let selection = factory(&settings, true).create(None);

    assert_eq!(selection.provider, Provider::Snowflake);
    assert_eq!(selection.backend.provider(), Provider::Snowflake);
    assert!(!selection.is_fallback());
}

#[test]
fn test_explicit_provider_wins() {
    let settings = Env::new()
        .with_credentials()
        .set("DATA_PROVIDER", "snowflake")
        .settings();
    let selection = factory(&settings, true).create(Some("SQLite"));

    assert_eq!(selection.requested, "sqlite");
    assert_eq!(selection.provider, Provider::Local);
    assert!(selection.fallback.is_none());
}

#[test]
fn test_any_missing_credential_falls_back() {
    for key in CREDENTIAL_KEYS {
        let settings = Env::new().with_credentials().without(key).settings();
        let selection = factory(&settings, true).create(Some("snowflake"));

        assert_eq!(selection.provider, Provider::Local, "missing {key}");
        assert_eq!(selection.backend.provider(), Provider::Local);
        assert_eq!(
            selection.fallback,
            Some(Fallback::MissingCredentials(vec![key]))
        );
    }
}

#[test]
fn test_missing_driver_falls_back() {
    let settings = Env::new().with_credentials().settings();
    let selection = factory(&settings, false).create(Some("warehouse"));

    assert_eq!(selection.requested, "warehouse");
    assert_eq!(selection.provider, Provider::Local);
    assert_eq!(selection.fallback, Some(Fallback::DriverUnavailable));
}

#[test]
fn test_unknown_provider_falls_back() {
    let settings = Env::new().settings();
    let selection = factory(&settings, true).create(Some("Oracle"));

    assert_eq!(selection.provider, Provider::Local);
    assert_eq!(
        selection.fallback,
        Some(Fallback::UnknownProvider("oracle".into()))
    );
}

#[test]
fn test_unresolvable_driver_path() {
    let settings = Env::new()
        .with_credentials()
        .set("SNOWFLAKE_DRIVER_PATH", "/nonexistent/strata-snowflake-driver")
        .settings();
    let selection = ProviderFactory::new(&settings).create(Some("snowflake"));

    assert_eq!(selection.fallback, Some(Fallback::DriverUnavailable));
}

// ============================================================================
// Available providers
// ============================================================================

#[test]
fn test_available_providers() {
    let bare = Env::new().settings();
    assert_eq!(
        factory(&bare, true).get_available_providers(),
        vec![Provider::Local]
    );

    let configured = Env::new().with_credentials().settings();
    assert_eq!(
        factory(&configured, true).get_available_providers(),
        vec![Provider::Local, Provider::Snowflake]
    );
    assert_eq!(
        factory(&configured, false).get_available_providers(),
        vec![Provider::Local]
    );

    let partial = Env::new()
        .with_credentials()
        .without("SNOWFLAKE_PASSWORD")
        .settings();
    assert_eq!(
        factory(&partial, true).get_available_providers(),
        vec![Provider::Local]
    );
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_connect_local_session() {
    let env = Env::new();
    let settings = env.settings();

    let session = factory(&settings, false).connect(None).unwrap();
    assert!(session.is_connected());
    assert!(session.validate_connection());
    assert!(env.dir.path().join("banking.db").exists());
}

#[test]
fn test_connect_failure_is_error() {
    let settings = Env::new()
        .with_credentials()
        .set("DATA_PROVIDER", "snowflake")
        .settings();

    let err = factory(&settings, true).connect(None).unwrap_err();
    assert!(err.to_string().contains("snowflake"), "{}", err);
}
