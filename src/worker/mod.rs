//! Warehouse driver process communication.
//!
//! The warehouse has no in-process driver. A separate driver binary owns
//! the actual warehouse connections and this module talks to it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    strata (Rust)                         │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │              WorkerClient (blocking)               │  │
//! │  │  - spawns the driver as a child process            │  │
//! │  │  - NDJSON over stdin/stdout                        │  │
//! │  │  - one request in flight, matched by id            │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                           │                              │
//! │            stdin (NDJSON) │ stdout (NDJSON)              │
//! └───────────────────────────┼──────────────────────────────┘
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │            strata-snowflake-driver (child)               │
//! │   connection.open / query.execute / connection.close     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The driver is killed when the client is dropped.

mod client;
mod error;
pub mod protocol;

pub use client::{WorkerClient, DRIVER_BINARY};
pub use error::{WorkerError, WorkerResult};
