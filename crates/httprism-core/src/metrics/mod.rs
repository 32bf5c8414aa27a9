//! In-process metric aggregates.
//!
//! Counters and histograms with positional label values, backed by
//! `DashMap` so each label tuple is created once and updated under its own
//! lock. Snapshots are plain serializable data.

pub mod counter;
pub mod histogram;
pub mod opts;
pub mod registry;

use serde::Serialize;

pub use counter::Counter;
pub use histogram::{Histogram, DEFAULT_BUCKETS};
pub use opts::Opts;
pub use registry::{Metric, MetricRegistry};

/// One counter series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSample {
    /// `(name, value)` pairs in declaration order.
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// One histogram series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSample {
    pub labels: Vec<(String, String)>,
    /// `(upper bound, cumulative count)`, last bound is `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

impl HistogramSample {
    /// Cumulative count for the bucket with exactly this upper bound.
    pub fn bucket(&self, le: f64) -> Option<u64> {
        self.buckets.iter().find(|(b, _)| *b == le).map(|(_, c)| *c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "series", rename_all = "lowercase")]
pub enum Samples {
    Counter(Vec<CounterSample>),
    Histogram(Vec<HistogramSample>),
}

/// Snapshot of one registered aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    #[serde(flatten)]
    pub samples: Samples,
}
