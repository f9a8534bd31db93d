//! Snowflake adapter.
//!
//! The adapter itself only knows the [`DataBackend`] contract and the
//! Snowflake catalog. Connections come from a [`WarehouseConnector`]; the
//! production connector drives the external driver process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::introspect;
use super::{
    BackendError, BackendResult, ConnectionInfo, ConnectionTarget, DataBackend, DriverError,
    QueryResult, TableSchema,
};
use crate::config::{Provider, WarehouseCredentials};
use crate::sql::{Dialect, Literal};
use crate::worker::protocol::OpenConnectionParams;
use crate::worker::WorkerClient;

/// Opens warehouse connections.
pub trait WarehouseConnector: Send + Sync {
    /// Whether a driver is present at all. Checked before any connect
    /// attempt and by provider selection.
    fn is_available(&self) -> bool;

    fn connect(
        &self,
        credentials: &WarehouseCredentials,
    ) -> Result<Box<dyn WarehouseConnection>, DriverError>;
}

/// One live warehouse connection.
pub trait WarehouseConnection: Send {
    /// Run a statement with positional `?` arguments.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<QueryResult, DriverError>;

    fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// Connector backed by the driver process.
#[derive(Debug, Clone)]
pub struct WorkerConnector {
    driver_path: Option<PathBuf>,
}

impl WorkerConnector {
    /// Resolve the driver binary once, from `configured` or the default
    /// search locations.
    pub fn new(configured: Option<&Path>) -> Self {
        let driver_path = WorkerClient::resolve_driver_path(configured);
        match &driver_path {
            Some(path) => debug!(path = %path.display(), "warehouse driver found"),
            None => debug!("warehouse driver not found"),
        }
        Self { driver_path }
    }

    pub fn driver_path(&self) -> Option<&Path> {
        self.driver_path.as_deref()
    }
}

impl WarehouseConnector for WorkerConnector {
    fn is_available(&self) -> bool {
        self.driver_path.is_some()
    }

    fn connect(
        &self,
        credentials: &WarehouseCredentials,
    ) -> Result<Box<dyn WarehouseConnection>, DriverError> {
        let path = self.driver_path.as_deref().ok_or_else(|| {
            DriverError::Worker(crate::worker::WorkerError::DriverNotFound(
                crate::worker::DRIVER_BINARY.to_string(),
            ))
        })?;
        let client = WorkerClient::spawn(path)?;
        let session_id = client.open_connection(credentials.into())?;
        Ok(Box::new(WorkerConnection { client, session_id }))
    }
}

struct WorkerConnection {
    client: WorkerClient,
    session_id: String,
}

impl WarehouseConnection for WorkerConnection {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<QueryResult, DriverError> {
        let response = self
            .client
            .execute_query(&self.session_id, sql, args.to_vec())?;
        let columns = response.columns.into_iter().map(|c| c.name).collect();
        Ok(QueryResult::new(columns, response.rows))
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.client.close_connection(&self.session_id)?;
        Ok(())
    }
}

impl From<&WarehouseCredentials> for OpenConnectionParams {
    fn from(creds: &WarehouseCredentials) -> Self {
        Self {
            account: creds.account.clone(),
            user: creds.user.clone(),
            password: creds.password.clone(),
            warehouse: creds.warehouse.clone(),
            database: creds.database.clone(),
            schema: creds.schema.clone(),
        }
    }
}

/// Snowflake warehouse accessed through a [`WarehouseConnector`].
pub struct WarehouseBackend {
    credentials: WarehouseCredentials,
    connector: Arc<dyn WarehouseConnector>,
    conn: Option<Box<dyn WarehouseConnection>>,
}

impl WarehouseBackend {
    /// Create a disconnected adapter.
    pub fn new(credentials: WarehouseCredentials, connector: Arc<dyn WarehouseConnector>) -> Self {
        Self {
            credentials,
            connector,
            conn: None,
        }
    }

    pub fn credentials(&self) -> &WarehouseCredentials {
        &self.credentials
    }

    fn connection(&self) -> BackendResult<&dyn WarehouseConnection> {
        self.conn.as_deref().ok_or(BackendError::NotConnected {
            backend: Provider::Snowflake.as_str(),
        })
    }
}

impl DataBackend for WarehouseBackend {
    fn provider(&self) -> Provider {
        Provider::Snowflake
    }

    fn dialect(&self) -> Dialect {
        Dialect::Snowflake
    }

    fn connect(&mut self) -> bool {
        if self.conn.is_some() {
            return true;
        }
        if !self.connector.is_available() {
            warn!("warehouse driver is not available");
            return false;
        }
        match self.connector.connect(&self.credentials) {
            Ok(conn) => {
                debug!(
                    account = %self.credentials.account,
                    database = %self.credentials.database,
                    "connected to Snowflake"
                );
                self.conn = Some(conn);
                true
            }
            Err(err) => {
                warn!(account = %self.credentials.account, error = %err, "failed to connect to Snowflake");
                false
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(err) = conn.close() {
                warn!(error = %err, "error closing Snowflake connection");
            }
            debug!(account = %self.credentials.account, "disconnected from Snowflake");
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn execute_query(&self, sql: &str, params: &[Literal]) -> BackendResult<QueryResult> {
        let conn = self.connection()?;
        let args: Vec<Value> = params.iter().map(Value::from).collect();
        let result = conn
            .execute(sql, &args)
            .map_err(BackendError::QueryExecution)?;
        Ok(result.lowercase_columns())
    }

    fn get_table_schema(&self, table_name: &str) -> BackendResult<TableSchema> {
        let result = self.execute_query(
            introspect::SNOWFLAKE_COLUMNS_SQL,
            &[
                Literal::String(table_name.to_uppercase()),
                Literal::String(self.credentials.schema.clone()),
            ],
        )?;
        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns: introspect::columns_from_information_schema(&result),
        })
    }

    fn get_available_tables(&self) -> BackendResult<Vec<String>> {
        let result = self.execute_query(
            introspect::SNOWFLAKE_TABLES_SQL,
            &[Literal::String(self.credentials.schema.clone())],
        )?;
        Ok(introspect::table_names(&result, None))
    }

    fn validate_connection(&self) -> bool {
        self.execute_query("SELECT CURRENT_VERSION()", &[]).is_ok()
    }

    fn get_connection_info(&self) -> ConnectionInfo {
        let connected = self.validate_connection();
        ConnectionInfo {
            target: ConnectionTarget::Snowflake {
                account: self.credentials.account.clone(),
                database: self.credentials.database.clone(),
                schema: self.credentials.schema.clone(),
                warehouse: self.credentials.warehouse.clone(),
            },
            connected,
            tables: if connected {
                self.get_available_tables().unwrap_or_default()
            } else {
                vec![]
            },
        }
    }
}

impl Drop for WarehouseBackend {
    fn drop(&mut self) {
        self.disconnect();
    }
}
