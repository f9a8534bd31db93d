//! Protocol types for driver process communication.
//!
//! Every message is a single JSON object on its own line. Requests carry a
//! method name from [`methods`] and method-specific `params`; responses
//! echo the request id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the driver.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "query.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: Value,
}

/// Response envelope received from the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

// ============================================================================
// Connection lifecycle
// ============================================================================

/// Parameters for `connection.open`.
#[derive(Clone, Serialize)]
pub struct OpenConnectionParams {
    pub account: String,
    pub user: String,
    pub password: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
}

impl std::fmt::Debug for OpenConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenConnectionParams")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"***")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Response from `connection.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenConnectionResponse {
    /// Driver-side handle for the opened connection.
    pub session_id: String,
}

/// Parameters for `connection.close`.
#[derive(Debug, Clone, Serialize)]
pub struct CloseConnectionParams {
    pub session_id: String,
}

/// Response from `connection.close`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseConnectionResponse {
    #[serde(default)]
    pub closed: bool,
}

// ============================================================================
// Query execution
// ============================================================================

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    pub session_id: String,
    pub sql: String,
    /// Positional arguments for `?` placeholders.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    pub columns: Vec<QueryResultColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub row_count: usize,
}

/// Column metadata in a query result.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
}

/// Method names supported by the driver.
pub mod methods {
    pub const CONNECTION_OPEN: &str = "connection.open";
    pub const QUERY_EXECUTE: &str = "query.execute";
    pub const CONNECTION_CLOSE: &str = "connection.close";
}
