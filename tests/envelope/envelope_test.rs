//! Integration tests for result shaping and the envelope wire format.

use std::time::Duration;

use serde_json::{json, Value};
use strata::backend::QueryResult;
use strata::compile::{QueryDescriptor, TimePeriod};
use strata::envelope::{self, ResultEnvelope, DEFAULT_PERIOD_LABEL};

fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
    QueryResult::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn sample_rows(n: usize) -> QueryResult {
    result(
        &["loan_id", "amount"],
        (0..n).map(|i| vec![json!(format!("L{i}")), json!(1000.0)]).collect(),
    )
}

#[test]
fn test_success_wire_shape() {
    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .filter("status", "default")
        .time_period(TimePeriod::quarter("Q3", 2024_i64));
    let main = result(&["total_count"], vec![vec![json!(2)]]);
    let sample = sample_rows(2);

    let envelope = envelope::shape(&descriptor, &main, &sample, Duration::from_millis(25));

    assert_eq!(
        envelope.to_json(),
        json!({
            "query_executed": {
                "entity": "loans",
                "filters": {"status": "default"},
                "metrics": ["count"],
                "time_period": {"quarter": "Q3", "year": 2024}
            },
            "row_count": 1,
            "execution_time": "0.025s",
            "data": {
                "summary_stats": {"total_loans": 2.0, "total_value": 0.0},
                "data_points": [
                    {"loan_id": "L0", "amount": 1000.0},
                    {"loan_id": "L1", "amount": 1000.0}
                ],
                "period_label": "Q3 2024"
            }
        })
    );
}

#[test]
fn test_data_points_capped() {
    let descriptor = QueryDescriptor::new("loans").metric("count");
    let main = result(&["total_count"], vec![vec![json!(40)]]);

    let envelope = envelope::shape(&descriptor, &main, &sample_rows(25), Duration::ZERO);
    assert_eq!(envelope.data().unwrap().data_points.len(), 10);
}

#[test]
fn test_empty_result_has_no_stats() {
    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .filter("status", "no-such-status");
    let empty = result(&["total_count"], vec![]);

    let envelope = envelope::shape(&descriptor, &empty, &sample_rows(0), Duration::ZERO);

    assert_eq!(envelope.row_count(), Some(0));
    assert!(envelope.summary_stats().unwrap().is_empty());
    assert!(envelope.data().unwrap().data_points.is_empty());
    assert_eq!(envelope.data().unwrap().period_label, DEFAULT_PERIOD_LABEL);
}

#[test]
fn test_deposit_stats_use_deposit_names() {
    let descriptor = QueryDescriptor::new("deposits").metric("count").metric("sum");
    let main = result(
        &["TOTAL_COUNT", "TOTAL_AMOUNT"],
        vec![vec![json!("12"), json!("52000.50")]],
    );

    let envelope = envelope::shape(&descriptor, &main, &sample_rows(0), Duration::ZERO);
    let stats = envelope.summary_stats().unwrap();

    assert_eq!(stats.get("total_accounts"), Some(&12.0));
    assert_eq!(stats.get("total_deposits"), Some(&52000.5));
    assert!(!stats.contains_key("total_count"));
    assert!(!stats.contains_key("total_amount"));
}

#[test]
fn test_breakdowns_only_with_aggregations() {
    let grouped = QueryDescriptor::new("loans").aggregation("by_category");
    let rows = result(
        &["loan_type", "total_count"],
        vec![
            vec![json!("auto"), json!(3)],
            vec![json!("mortgage"), json!(1)],
        ],
    );

    let envelope = envelope::shape(&grouped, &rows, &sample_rows(1), Duration::ZERO);
    let breakdowns = envelope.data().unwrap().breakdowns.as_ref().unwrap();
    assert_eq!(breakdowns.len(), 2);
    assert_eq!(breakdowns[1]["loan_type"], json!("mortgage"));

    let flat = QueryDescriptor::new("loans").metric("count");
    let envelope = envelope::shape(&flat, &rows, &sample_rows(1), Duration::ZERO);
    assert!(envelope.data().unwrap().breakdowns.is_none());
    assert!(envelope.to_json()["data"].get("breakdowns").is_none());
}

#[test]
fn test_envelope_parses_back_as_right_variant() {
    let descriptor = QueryDescriptor::new("customers");
    let failure = ResultEnvelope::failure(&descriptor, "boom");
    let parsed: ResultEnvelope = serde_json::from_value(failure.to_json()).unwrap();
    assert!(!parsed.is_success());
    assert_eq!(parsed.error(), Some("boom"));

    let main = result(&["total_count"], vec![vec![json!(5)]]);
    let success = envelope::shape(&descriptor, &main, &sample_rows(0), Duration::ZERO);
    let parsed: ResultEnvelope = serde_json::from_value(success.to_json()).unwrap();
    assert!(parsed.is_success());
    assert_eq!(parsed.summary_stats().unwrap().get("total_customers"), Some(&5.0));
}
