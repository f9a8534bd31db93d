//! Query compilation: structured descriptors to dialect-correct SQL.
//!
//! ```ignore
//! use strata::compile::{QueryCompiler, QueryDescriptor};
//! use strata::sql::Dialect;
//!
//! let descriptor = QueryDescriptor::new("loans")
//!     .metric("count")
//!     .filter("status", "default");
//! let compiled = QueryCompiler::new(Dialect::Snowflake).compile(&descriptor);
//! // SELECT COUNT(*) AS total_count FROM LOANS WHERE status = ? HAVING COUNT(*) > 0
//! ```
//!
//! Filter and date-range values are always bound as parameters.

mod compiler;
mod descriptor;
mod entity;

pub use compiler::{compile, CompiledQuery, QueryCompiler, SAMPLE_LIMIT};
pub use descriptor::{Aggregation, Metric, QueryDescriptor, Scalar, TimePeriod};
pub use entity::Table;
