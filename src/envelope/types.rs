//! Response envelope returned by structured queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compile::QueryDescriptor;

/// One result row keyed by column name.
pub type Record = Map<String, Value>;

/// Outcome of a structured query, success or failure, never both.
///
/// ```json
/// {"query_executed": {...}, "row_count": 1, "execution_time": "0.004s",
///  "data": {"summary_stats": {...}, "data_points": [...], "period_label": "Q3 2024"}}
///
/// {"query_executed": {...}, "error": "no such table: loans", "data": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Success(SuccessEnvelope),
    Failure(FailureEnvelope),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub query_executed: QueryDescriptor,
    pub row_count: usize,
    pub execution_time: String,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub summary_stats: BTreeMap<String, f64>,
    pub data_points: Vec<Record>,
    pub period_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdowns: Option<Vec<Record>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub query_executed: QueryDescriptor,
    pub error: String,
    pub data: EmptyData,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

impl ResultEnvelope {
    pub fn failure(descriptor: &QueryDescriptor, error: impl Into<String>) -> Self {
        ResultEnvelope::Failure(FailureEnvelope {
            query_executed: descriptor.clone(),
            error: error.into(),
            data: EmptyData {},
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultEnvelope::Success(_))
    }

    pub fn query_executed(&self) -> &QueryDescriptor {
        match self {
            ResultEnvelope::Success(s) => &s.query_executed,
            ResultEnvelope::Failure(f) => &f.query_executed,
        }
    }

    pub fn row_count(&self) -> Option<usize> {
        match self {
            ResultEnvelope::Success(s) => Some(s.row_count),
            ResultEnvelope::Failure(_) => None,
        }
    }

    pub fn data(&self) -> Option<&EnvelopeData> {
        match self {
            ResultEnvelope::Success(s) => Some(&s.data),
            ResultEnvelope::Failure(_) => None,
        }
    }

    pub fn summary_stats(&self) -> Option<&BTreeMap<String, f64>> {
        self.data().map(|d| &d.summary_stats)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultEnvelope::Success(_) => None,
            ResultEnvelope::Failure(f) => Some(&f.error),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
