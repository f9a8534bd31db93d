//! Provider selection.
//!
//! The factory turns a provider name into a ready-to-connect backend.
//! Asking for the warehouse without a complete configuration is not an
//! error: the local store is substituted and the reason is recorded in
//! [`Selection::fallback`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{
    BackendResult, DataBackend, LocalBackend, Session, WarehouseBackend, WarehouseConnector,
    WorkerConnector,
};
use crate::config::{Provider, Settings};

/// Why the requested provider was replaced by the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Warehouse credentials are incomplete. Holds the missing keys.
    MissingCredentials(Vec<&'static str>),
    /// Credentials are complete but no warehouse driver was found.
    DriverUnavailable,
    /// The name matches no known provider.
    UnknownProvider(String),
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::MissingCredentials(keys) => {
                write!(f, "missing warehouse credentials: {}", keys.join(", "))
            }
            Fallback::DriverUnavailable => f.write_str("warehouse driver not available"),
            Fallback::UnknownProvider(name) => write!(f, "unknown provider '{name}'"),
        }
    }
}

/// Outcome of [`ProviderFactory::create`].
pub struct Selection {
    /// Disconnected backend.
    pub backend: Box<dyn DataBackend>,
    /// Provider name as asked for, after defaulting.
    pub requested: String,
    /// Provider actually chosen.
    pub provider: Provider,
    /// Set when `provider` differs from what was asked for.
    pub fallback: Option<Fallback>,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Connect the chosen backend.
    pub fn open(self) -> BackendResult<Session> {
        Session::open(self.backend)
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("requested", &self.requested)
            .field("provider", &self.provider)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Builds backends from [`Settings`].
pub struct ProviderFactory<'a> {
    settings: &'a Settings,
    connector: Arc<dyn WarehouseConnector>,
}

impl<'a> ProviderFactory<'a> {
    /// Factory using the driver process for the warehouse. The driver
    /// binary is located once, here.
    pub fn new(settings: &'a Settings) -> Self {
        let connector = WorkerConnector::new(settings.warehouse_driver_path().as_deref());
        Self::with_connector(settings, Arc::new(connector))
    }

    /// Factory with an explicit warehouse connector.
    pub fn with_connector(settings: &'a Settings, connector: Arc<dyn WarehouseConnector>) -> Self {
        Self {
            settings,
            connector,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Choose a backend.
    ///
    /// The explicit `provider` wins, then the configured default. The
    /// warehouse is used only when every credential is present and the
    /// driver is available; otherwise the local store is returned.
    pub fn create(&self, provider: Option<&str>) -> Selection {
        let requested = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.settings.default_provider())
            .to_lowercase();

        let fallback = match Provider::from_str(&requested) {
            Ok(Provider::Local) => None,
            Ok(Provider::Snowflake) => match self.settings.warehouse_credentials() {
                Err(missing) => Some(Fallback::MissingCredentials(missing)),
                Ok(_) if !self.connector.is_available() => Some(Fallback::DriverUnavailable),
                Ok(credentials) => {
                    info!(provider = %Provider::Snowflake, "selected data provider");
                    return Selection {
                        backend: Box::new(WarehouseBackend::new(
                            credentials,
                            Arc::clone(&self.connector),
                        )),
                        requested,
                        provider: Provider::Snowflake,
                        fallback: None,
                    };
                }
            },
            Err(_) => Some(Fallback::UnknownProvider(requested.clone())),
        };

        match &fallback {
            Some(reason) => {
                warn!(requested = %requested, reason = %reason, "falling back to local data provider")
            }
            None => info!(provider = %Provider::Local, "selected data provider"),
        }

        Selection {
            backend: Box::new(self.local_backend()),
            requested,
            provider: Provider::Local,
            fallback,
        }
    }

    /// Choose a backend and connect it.
    pub fn connect(&self, provider: Option<&str>) -> BackendResult<Session> {
        self.create(provider).open()
    }

    /// Providers that [`create`](Self::create) can return without falling
    /// back. Always contains [`Provider::Local`].
    pub fn get_available_providers(&self) -> Vec<Provider> {
        let mut providers = vec![Provider::Local];
        if self.settings.warehouse_credentials().is_ok() && self.connector.is_available() {
            providers.push(Provider::Snowflake);
        }
        providers
    }

    fn local_backend(&self) -> LocalBackend {
        let path = self.settings.local_path().unwrap_or_else(|err| {
            warn!(path = %self.settings.local.path, error = %err, "could not expand local database path");
            PathBuf::from(&self.settings.local.path)
        });
        LocalBackend::new(path)
    }
}
