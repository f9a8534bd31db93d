//! Result shaping: raw rows plus the originating descriptor become a
//! stable [`ResultEnvelope`].

mod shaper;
mod types;

pub use shaper::{
    format_elapsed, period_label, shape, summary_stats, DEFAULT_PERIOD_LABEL, METRIC_COLUMNS,
};
pub use types::{EmptyData, EnvelopeData, FailureEnvelope, Record, ResultEnvelope, SuccessEnvelope};
