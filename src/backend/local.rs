//! Embedded SQLite adapter.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use tracing::{debug, warn};

use super::introspect;
use super::{
    BackendError, BackendResult, ConnectionInfo, ConnectionTarget, DataBackend, QueryResult,
    TableSchema,
};
use crate::config::Provider;
use crate::sql::{Dialect, Literal};

/// SQLite database file accessed in-process.
pub struct LocalBackend {
    path: PathBuf,
    conn: Option<Connection>,
}

impl LocalBackend {
    /// Create a disconnected adapter for `path`, creating the parent
    /// directory if it is missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                if let Err(err) = fs::create_dir_all(dir) {
                    warn!(dir = %dir.display(), error = %err, "could not create database directory");
                }
            }
        }
        Self { path, conn: None }
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> BackendResult<&Connection> {
        self.conn.as_ref().ok_or(BackendError::NotConnected {
            backend: Provider::Local.as_str(),
        })
    }
}

impl DataBackend for LocalBackend {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(&mut self) -> bool {
        if self.conn.is_some() {
            return true;
        }
        match Connection::open(&self.path) {
            Ok(conn) => {
                debug!(path = %self.path.display(), "connected to SQLite");
                self.conn = Some(conn);
                true
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to connect to SQLite");
                false
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!(error = %err, "error closing SQLite connection");
            }
            debug!(path = %self.path.display(), "disconnected from SQLite");
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn execute_query(&self, sql: &str, params: &[Literal]) -> BackendResult<QueryResult> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let bound: Vec<SqlValue> = params.iter().map(to_sql_value).collect();
        let mut rows = stmt.query(params_from_iter(bound.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(to_json(row.get_ref(i)?));
            }
            out.push(cells);
        }

        Ok(QueryResult::new(columns, out))
    }

    fn get_table_schema(&self, table_name: &str) -> BackendResult<TableSchema> {
        let result = self.execute_query(
            introspect::SQLITE_COLUMNS_SQL,
            &[Literal::String(table_name.to_string())],
        )?;
        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns: introspect::columns_from_pragma(&result),
        })
    }

    fn get_available_tables(&self) -> BackendResult<Vec<String>> {
        let result = self.execute_query(introspect::SQLITE_TABLES_SQL, &[])?;
        Ok(introspect::table_names(
            &result,
            Some(introspect::SQLITE_INTERNAL_PREFIX),
        ))
    }

    fn validate_connection(&self) -> bool {
        match self.connection() {
            Ok(conn) => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
            Err(_) => false,
        }
    }

    fn get_connection_info(&self) -> ConnectionInfo {
        let connected = self.validate_connection();
        ConnectionInfo {
            target: ConnectionTarget::Sqlite {
                database: self.path.display().to_string(),
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

impl Drop for LocalBackend {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn to_sql_value(lit: &Literal) -> SqlValue {
    match lit {
        Literal::Int(n) => SqlValue::Integer(*n),
        Literal::Float(f) => SqlValue::Real(*f),
        Literal::String(s) => SqlValue::Text(s.clone()),
        Literal::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Literal::Null => SqlValue::Null,
    }
}

fn to_json(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::from(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}
