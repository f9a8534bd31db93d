//! Backend adapters: the capability interface every data source
//! satisfies, plus the SQLite and Snowflake implementations.
//!
//! An adapter owns at most one live connection and moves between two
//! states:
//!
//! ```text
//! Disconnected --connect()--> Connected --disconnect()--> Disconnected
//! ```
//!
//! Read operations on a disconnected adapter fail with
//! [`BackendError::NotConnected`]; nothing reconnects implicitly. Use
//! [`Session`] to tie a connection's lifetime to a scope.

mod error;
mod introspect;
mod local;
mod result;
mod session;
mod warehouse;

use std::time::Instant;

use tracing::warn;

pub use error::{BackendError, BackendResult, DriverError};
pub use local::LocalBackend;
pub use result::{ColumnSchema, ConnectionInfo, ConnectionTarget, QueryResult, TableSchema};
pub use session::Session;
pub use warehouse::{WarehouseBackend, WarehouseConnection, WarehouseConnector, WorkerConnector};

use crate::compile::{QueryCompiler, QueryDescriptor, SAMPLE_LIMIT};
use crate::config::Provider;
use crate::envelope::{self, ResultEnvelope};
use crate::sql::{Dialect, Literal};

/// Operations common to every backend.
///
/// Callers hold a `Box<dyn DataBackend>`; dialect differences stay inside
/// each implementation.
pub trait DataBackend: Send {
    /// Provider this adapter serves.
    fn provider(&self) -> Provider;

    /// SQL dialect queries must be compiled for.
    fn dialect(&self) -> Dialect;

    /// Open the connection. Returns `false` and stays disconnected on
    /// failure.
    fn connect(&mut self) -> bool;

    /// Release the connection. Safe to call when already disconnected.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Run raw SQL with positional parameters.
    fn execute_query(&self, sql: &str, params: &[Literal]) -> BackendResult<QueryResult>;

    /// Compile, execute and shape a descriptor. Never fails: any error is
    /// reported in the returned envelope.
    fn execute_structured_query(&self, descriptor: &QueryDescriptor) -> ResultEnvelope {
        match run_structured(self, descriptor) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(provider = %self.provider(), error = %err, "structured query failed");
                ResultEnvelope::failure(descriptor, err.to_string())
            }
        }
    }

    /// Column metadata for one table, read fresh from the backend.
    fn get_table_schema(&self, table_name: &str) -> BackendResult<TableSchema>;

    /// User tables, excluding system tables.
    fn get_available_tables(&self) -> BackendResult<Vec<String>>;

    /// Issue a trivial round-trip query. Returns `false` on any failure.
    fn validate_connection(&self) -> bool;

    fn get_connection_info(&self) -> ConnectionInfo;
}

fn run_structured<B: DataBackend + ?Sized>(
    backend: &B,
    descriptor: &QueryDescriptor,
) -> BackendResult<ResultEnvelope> {
    let compiler = QueryCompiler::new(backend.dialect());

    let started = Instant::now();
    let compiled = compiler.compile(descriptor);
    let result = backend.execute_query(&compiled.sql, &compiled.params)?;
    let elapsed = started.elapsed();

    let sample = compiler.sample(descriptor, SAMPLE_LIMIT);
    let sample_rows = backend.execute_query(&sample.sql, &sample.params)?;

    Ok(envelope::shape(descriptor, &result, &sample_rows, elapsed))
}
