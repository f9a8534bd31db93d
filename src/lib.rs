//! # Strata
//!
//! A backend-agnostic data access layer for banking analytics.
//!
//! ## Architecture
//!
//! Callers describe what they want as a [`QueryDescriptor`]; strata
//! compiles it for whichever backend is configured and returns a stable
//! [`ResultEnvelope`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           QueryDescriptor (entity, filters,             │
//! │        metrics, aggregations, time period)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │      CompiledQuery (dialect SQL + bound parameters)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [backend, chosen by factory]
//! ┌─────────────────────────────────────────────────────────┐
//! │   LocalBackend (SQLite)  │  WarehouseBackend (Snowflake) │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [envelope]
//! ┌─────────────────────────────────────────────────────────┐
//! │      ResultEnvelope (summary stats, data points,        │
//! │              period label, breakdowns)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ```ignore
//! use strata::prelude::*;
//!
//! let settings = Settings::load()?;
//! let session = ProviderFactory::new(&settings).connect(None)?;
//! let envelope = session.execute_structured_query(
//!     &QueryDescriptor::new("loans").metric("count").filter("status", "default"),
//! );
//! println!("{}", envelope.to_json());
//! ```

pub mod backend;
pub mod compile;
pub mod config;
pub mod envelope;
pub mod factory;
pub mod sql;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{
        BackendError, BackendResult, ConnectionInfo, DataBackend, LocalBackend, QueryResult,
        Session, TableSchema, WarehouseBackend,
    };
    pub use crate::compile::{
        Aggregation, CompiledQuery, Metric, QueryCompiler, QueryDescriptor, Scalar, TimePeriod,
    };
    pub use crate::config::{Provider, Settings};
    pub use crate::envelope::ResultEnvelope;
    pub use crate::factory::{Fallback, ProviderFactory, Selection};
    pub use crate::sql::{Dialect, Literal};
}

pub use backend::{DataBackend, Session};
pub use compile::{QueryCompiler, QueryDescriptor};
pub use config::{Provider, Settings};
pub use envelope::ResultEnvelope;
pub use factory::ProviderFactory;
