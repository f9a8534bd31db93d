//! Integration tests for the SQLite backend against an on-disk fixture.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::json;
use strata::backend::{BackendError, DataBackend, LocalBackend, Session};
use strata::compile::{QueryDescriptor, TimePeriod};
use tempfile::TempDir;

const FIXTURE: &str = r#"
CREATE TABLE customers (
    customer_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    segment TEXT,
    credit_score INTEGER
);

CREATE TABLE loans (
    loan_id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL,
    loan_type TEXT NOT NULL,
    amount REAL NOT NULL,
    status TEXT DEFAULT 'current'
);

CREATE TABLE deposits (
    account_id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL,
    account_type TEXT NOT NULL,
    balance REAL NOT NULL DEFAULT 0,
    date DATE NOT NULL
);

CREATE TABLE audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    note TEXT
);

INSERT INTO customers VALUES
    ('C1', 'Ada', 'retail', 710),
    ('C2', 'Grace', 'business', 650);

INSERT INTO loans VALUES
    ('L1', 'C1', 'auto', 10000.0, 'current'),
    ('L2', 'C1', 'mortgage', 250000.0, 'default'),
    ('L3', 'C2', 'auto', 8000.0, 'default'),
    ('L4', 'C2', 'personal', 5000.0, 'current');

INSERT INTO deposits VALUES
    ('D1', 'C1', 'checking', 1200.0, '2024-01-15'),
    ('D2', 'C1', 'savings', 5400.0, '2024-02-20'),
    ('D3', 'C2', 'checking', 300.0, '2024-05-01');

INSERT INTO audit_log (note) VALUES ('seeded');
"#;

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("banking.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(FIXTURE).unwrap();
    conn.close().unwrap();
    Fixture { _dir: dir, path }
}

fn connected(path: &Path) -> LocalBackend {
    let mut backend = LocalBackend::new(path);
    assert!(backend.connect());
    backend
}

// ============================================================================
// Structured queries
// ============================================================================

#[test]
fn test_count_defaulted_loans() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .metric("sum")
        .filter("status", "default");
    let envelope = backend.execute_structured_query(&descriptor);

    assert!(envelope.is_success(), "{:?}", envelope.error());
    assert_eq!(envelope.row_count(), Some(1));
    let stats = envelope.summary_stats().unwrap();
    assert_eq!(stats.get("total_loans"), Some(&2.0));
    assert_eq!(stats.get("total_value"), Some(&258000.0));

    // sample rows come from the whole table, not the filtered set
    let points = &envelope.data().unwrap().data_points;
    assert_eq!(points.len(), 4);
    assert!(points.iter().any(|p| p["status"] == json!("current")));
}

#[test]
fn test_no_matching_rows() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .metric("average")
        .filter("status", "written_off");
    let envelope = backend.execute_structured_query(&descriptor);

    assert!(envelope.is_success());
    assert_eq!(envelope.row_count(), Some(0));
    assert!(envelope.summary_stats().unwrap().is_empty());
}

#[test]
fn test_default_rate() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let envelope =
        backend.execute_structured_query(&QueryDescriptor::new("loans").metric("default_rate"));
    assert_eq!(
        envelope.summary_stats().unwrap().get("default_rate"),
        Some(&50.0)
    );
}

#[test]
fn test_breakdown_by_category() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .aggregation("by_category");
    let envelope = backend.execute_structured_query(&descriptor);

    assert_eq!(envelope.row_count(), Some(3));
    let breakdowns = envelope.data().unwrap().breakdowns.clone().unwrap();
    let auto = breakdowns
        .iter()
        .find(|row| row["loan_type"] == json!("auto"))
        .unwrap();
    assert_eq!(auto["total_count"], json!(2));
}

#[test]
fn test_deposit_count_in_range() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let descriptor = QueryDescriptor::new("deposit")
        .metric("count")
        .time_period(TimePeriod::range("2024-01-01", "2024-03-31"));
    let envelope = backend.execute_structured_query(&descriptor);

    let stats = envelope.summary_stats().unwrap();
    assert_eq!(stats.get("total_accounts"), Some(&2.0));
    assert_eq!(stats.get("total_deposits"), Some(&0.0));
    assert!(!stats.contains_key("total_count"));
    assert_eq!(
        envelope.data().unwrap().period_label,
        "2024-01-01 to 2024-03-31"
    );
}

#[test]
fn test_execution_error_becomes_failure_envelope() {
    let fx = fixture();
    let backend = connected(&fx.path);

    // deposits carries `balance`, not `amount`
    let descriptor = QueryDescriptor::new("deposits").metric("sum");
    let envelope = backend.execute_structured_query(&descriptor);

    assert!(!envelope.is_success());
    assert!(envelope.error().unwrap().contains("amount"));
    assert_eq!(envelope.to_json()["data"], json!({}));
    assert_eq!(envelope.query_executed(), &descriptor);
}

#[test]
fn test_schema_qualified_entity() {
    let fx = fixture();
    let conn = Connection::open(&fx.path).unwrap();
    conn.execute_batch(
        "CREATE TABLE transactions (txn_id TEXT PRIMARY KEY, amount REAL NOT NULL);
         INSERT INTO transactions VALUES ('T1', 42.5);",
    )
    .unwrap();
    conn.close().unwrap();
    let backend = connected(&fx.path);

    let envelope = backend
        .execute_structured_query(&QueryDescriptor::new("main.transactions").metric("count"));

    assert!(envelope.is_success(), "{:?}", envelope.error());
    assert_eq!(
        envelope.summary_stats().unwrap().get("total_count"),
        Some(&1.0)
    );
    assert_eq!(envelope.data().unwrap().data_points[0]["txn_id"], json!("T1"));
}

#[test]
fn test_structured_query_while_disconnected() {
    let fx = fixture();
    let backend = LocalBackend::new(&fx.path);

    let envelope = backend.execute_structured_query(&QueryDescriptor::new("loans"));
    assert!(!envelope.is_success());
    assert!(envelope.error().unwrap().contains("not connected"));
}

// ============================================================================
// Raw SQL and introspection
// ============================================================================

#[test]
fn test_raw_query_errors() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let err = backend
        .execute_query("SELECT * FROM no_such_table", &[])
        .unwrap_err();
    assert!(matches!(err, BackendError::QueryExecution(_)));
    assert!(err.to_string().contains("no_such_table"));
}

#[test]
fn test_table_schema_is_stable() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let first = backend.get_table_schema("loans").unwrap();
    let second = backend.get_table_schema("loans").unwrap();
    assert_eq!(first, second);

    let names: Vec<_> = first.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["loan_id", "customer_id", "loan_type", "amount", "status"]
    );

    let loan_id = first.column("loan_id").unwrap();
    assert_eq!(loan_id.primary_key, Some(true));
    let amount = first.column("amount").unwrap();
    assert_eq!(amount.data_type, "REAL");
    assert!(!amount.nullable);
    let status = first.column("status").unwrap();
    assert_eq!(status.default, Some(json!("'current'")));
}

#[test]
fn test_available_tables_skip_internal() {
    let fx = fixture();
    let backend = connected(&fx.path);

    assert_eq!(
        backend.get_available_tables().unwrap(),
        vec!["audit_log", "customers", "deposits", "loans"]
    );
}

#[test]
fn test_connection_info() {
    let fx = fixture();
    let mut backend = connected(&fx.path);

    let info = serde_json::to_value(backend.get_connection_info()).unwrap();
    assert_eq!(info["type"], json!("SQLite"));
    assert_eq!(info["connected"], json!(true));
    assert_eq!(info["tables"].as_array().unwrap().len(), 4);

    backend.disconnect();
    let info = backend.get_connection_info();
    assert!(!info.connected);
    assert!(info.tables.is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_disconnect_is_idempotent() {
    let fx = fixture();
    let mut backend = connected(&fx.path);

    backend.disconnect();
    backend.disconnect();
    assert!(!backend.is_connected());
    assert!(backend
        .get_available_tables()
        .unwrap_err()
        .is_not_connected());

    assert!(backend.connect());
    assert!(backend.validate_connection());
}

#[test]
fn test_parent_directory_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("banking.db");

    let mut backend = LocalBackend::new(&path);
    assert!(path.parent().unwrap().is_dir());
    assert!(backend.connect());
    assert!(backend.get_available_tables().unwrap().is_empty());
}

#[test]
fn test_session_scopes_connection() {
    let fx = fixture();

    let session = Session::open(Box::new(LocalBackend::new(&fx.path))).unwrap();
    assert!(session.is_connected());
    assert_eq!(session.get_available_tables().unwrap().len(), 4);
}

#[test]
fn test_session_on_connected_backend() {
    let fx = fixture();
    let backend = connected(&fx.path);

    let mut session = Session::open(Box::new(backend)).unwrap();
    session.disconnect();
    assert!(!session.validate_connection());
}
