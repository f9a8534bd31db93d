//! The structured query descriptor accepted by the compiler.
//!
//! The wire shape is JSON:
//!
//! ```json
//! {
//!   "entity": "loans",
//!   "filters": {"status": "default", "branch_id": 4},
//!   "metrics": ["count", "sum"],
//!   "aggregations": ["by_category"],
//!   "time_period": {"start": "2024-07-01", "end": "2024-09-30"}
//! }
//! ```
//!
//! Unknown metric and aggregation names deserialize into `Other` so the
//! descriptor echoes back exactly what the caller sent.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sql::Literal;

/// A scalar value in a filter or time period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&Scalar> for Literal {
    fn from(value: &Scalar) -> Self {
        match value {
            Scalar::Bool(b) => Literal::Bool(*b),
            Scalar::Int(n) => Literal::Int(*n),
            Scalar::Float(x) => Literal::Float(*x),
            Scalar::Text(s) => Literal::String(s.clone()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A requested metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metric {
    Count,
    Sum,
    Average,
    DefaultRate,
    Other(String),
}

impl Metric {
    pub fn as_str(&self) -> &str {
        match self {
            Metric::Count => "count",
            Metric::Sum => "sum",
            Metric::Average => "average",
            Metric::DefaultRate => "default_rate",
            Metric::Other(name) => name,
        }
    }
}

impl From<String> for Metric {
    fn from(s: String) -> Self {
        match s.as_str() {
            "count" => Metric::Count,
            "sum" => Metric::Sum,
            "average" => Metric::Average,
            "default_rate" => Metric::DefaultRate,
            _ => Metric::Other(s),
        }
    }
}

impl From<&str> for Metric {
    fn from(s: &str) -> Self {
        Metric::from(s.to_string())
    }
}

impl From<Metric> for String {
    fn from(m: Metric) -> Self {
        m.as_str().to_string()
    }
}

/// A requested grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregation {
    ByCategory,
    ByType,
    Other(String),
}

impl Aggregation {
    pub fn as_str(&self) -> &str {
        match self {
            Aggregation::ByCategory => "by_category",
            Aggregation::ByType => "by_type",
            Aggregation::Other(name) => name,
        }
    }
}

impl From<String> for Aggregation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "by_category" => Aggregation::ByCategory,
            "by_type" => Aggregation::ByType,
            _ => Aggregation::Other(s),
        }
    }
}

impl From<&str> for Aggregation {
    fn from(s: &str) -> Self {
        Aggregation::from(s.to_string())
    }
}

impl From<Aggregation> for String {
    fn from(a: Aggregation) -> Self {
        a.as_str().to_string()
    }
}

/// Time period of a query. Only `start` + `end` constrain the SQL; the
/// other shapes feed the period label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Scalar>,
}

impl TimePeriod {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn quarter(quarter: impl Into<Scalar>, year: impl Into<Scalar>) -> Self {
        Self {
            quarter: Some(quarter.into()),
            year: Some(year.into()),
            ..Default::default()
        }
    }

    pub fn range(start: impl Into<Scalar>, end: impl Into<Scalar>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Default::default()
        }
    }

    /// The `(start, end)` pair when both bounds are present.
    pub fn bounds(&self) -> Option<(&Scalar, &Scalar)> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// A declarative, backend-agnostic query request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    #[serde(default)]
    pub entity: String,

    /// Equality filters, kept in the caller's order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, Scalar>,

    /// `None` when the caller omitted the key; see [`QueryDescriptor::metrics`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<Metric>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregations: Vec<Aggregation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
}

impl QueryDescriptor {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Default::default()
        }
    }

    /// Parse a descriptor from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.filters.insert(column.into(), value.into());
        self
    }

    pub fn metric(mut self, metric: impl Into<Metric>) -> Self {
        self.metrics.get_or_insert_with(Vec::new).push(metric.into());
        self
    }

    pub fn aggregation(mut self, aggregation: impl Into<Aggregation>) -> Self {
        self.aggregations.push(aggregation.into());
        self
    }

    pub fn time_period(mut self, period: TimePeriod) -> Self {
        self.time_period = Some(period);
        self
    }

    /// Requested metrics; `[count]` when the caller did not name any.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.clone().unwrap_or_else(|| vec![Metric::Count])
    }

    pub fn has_aggregations(&self) -> bool {
        !self.aggregations.is_empty()
    }
}
