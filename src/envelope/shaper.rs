//! Normalizes raw backend output into a [`ResultEnvelope`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::types::{EnvelopeData, ResultEnvelope, SuccessEnvelope};
use crate::backend::QueryResult;
use crate::compile::{QueryDescriptor, Table, TimePeriod, SAMPLE_LIMIT};

/// Metric columns read from the first result row.
pub const METRIC_COLUMNS: [&str; 4] = ["total_count", "total_amount", "average_amount", "default_rate"];

/// Label used when the descriptor names no period.
pub const DEFAULT_PERIOD_LABEL: &str = "Current Period";

/// Entity-specific names for the generic metric columns.
struct StatNames {
    count: &'static str,
    amount: Option<&'static str>,
    average: Option<&'static str>,
}

fn stat_names(table: &Table) -> Option<StatNames> {
    match table {
        Table::Loans => Some(StatNames {
            count: "total_loans",
            amount: Some("total_value"),
            average: Some("average_loan_size"),
        }),
        Table::Deposits => Some(StatNames {
            count: "total_accounts",
            amount: Some("total_deposits"),
            average: Some("average_balance"),
        }),
        Table::Customers => Some(StatNames {
            count: "total_customers",
            amount: None,
            average: None,
        }),
        Table::Other(_) => None,
    }
}

/// Build the success envelope for a compiled query's result and its
/// sample rows.
pub fn shape(
    descriptor: &QueryDescriptor,
    result: &QueryResult,
    sample: &QueryResult,
    elapsed: Duration,
) -> ResultEnvelope {
    let mut data_points = sample.records();
    data_points.truncate(SAMPLE_LIMIT as usize);

    let breakdowns = descriptor.has_aggregations().then(|| result.records());

    ResultEnvelope::Success(SuccessEnvelope {
        query_executed: descriptor.clone(),
        row_count: result.len(),
        execution_time: format_elapsed(elapsed),
        data: EnvelopeData {
            summary_stats: summary_stats(result, descriptor),
            data_points,
            period_label: period_label(descriptor.time_period.as_ref()),
            breakdowns,
        },
    })
}

/// Metric values of the first row, renamed for the descriptor's entity.
///
/// Columns are matched case-insensitively; null and non-numeric cells are
/// skipped. An empty result yields an empty map.
pub fn summary_stats(result: &QueryResult, descriptor: &QueryDescriptor) -> BTreeMap<String, f64> {
    let mut stats = BTreeMap::new();
    if let Some(row) = result.rows.first() {
        for metric in METRIC_COLUMNS {
            let value = result
                .column_index(metric)
                .and_then(|i| row.get(i))
                .and_then(numeric);
            if let Some(value) = value {
                stats.insert(metric.to_string(), value);
            }
        }
    }

    match stat_names(&Table::resolve(&descriptor.entity)) {
        Some(names) => rename(stats, &names),
        None => stats,
    }
}

fn rename(mut stats: BTreeMap<String, f64>, names: &StatNames) -> BTreeMap<String, f64> {
    let count = stats.remove("total_count");
    if let Some(count) = count {
        stats.insert(names.count.to_string(), count);
    }

    if let Some(key) = names.amount {
        match stats.remove("total_amount") {
            Some(total) => {
                stats.insert(key.to_string(), total);
            }
            // A counted result always reports a total.
            None if count.is_some() => {
                stats.insert(key.to_string(), 0.0);
            }
            None => {}
        }
    }

    if let Some(key) = names.average {
        if let Some(average) = stats.remove("average_amount") {
            stats.insert(key.to_string(), average);
        }
    }

    stats
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Human-readable period: explicit label, then `"{quarter} {year}"`, then
/// `"{start} to {end}"`, then [`DEFAULT_PERIOD_LABEL`].
pub fn period_label(period: Option<&TimePeriod>) -> String {
    let Some(period) = period else {
        return DEFAULT_PERIOD_LABEL.to_string();
    };

    if let Some(label) = &period.label {
        return label.clone();
    }
    if let (Some(quarter), Some(year)) = (&period.quarter, &period.year) {
        return format!("{} {}", quarter, year);
    }
    if let Some((start, end)) = period.bounds() {
        return format!("{} to {}", start, end);
    }
    DEFAULT_PERIOD_LABEL.to_string()
}

/// Wall time as seconds with millisecond precision, e.g. `"0.025s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}
