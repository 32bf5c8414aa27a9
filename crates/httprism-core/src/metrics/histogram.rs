//! Bucketed histogram with cumulative bucket counts.
//!
//! Each label tuple owns one `Mutex<Series>`; an observation updates every
//! affected bucket, the sum and the count under that lock, so a concurrent
//! snapshot never sees a half-applied observation.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use super::opts::{Desc, Opts};
use super::HistogramSample;
use crate::error::{HttPrismError, Result};

/// Default latency buckets in seconds.
pub const DEFAULT_BUCKETS: [f64; 13] = [
    0.01, 0.05, 0.1, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0, 15.0, 20.0, 30.0,
];

#[derive(Debug, Clone)]
struct Series {
    /// Cumulative, one per bound (including the trailing `+Inf`).
    buckets: Box<[u64]>,
    sum: f64,
    count: u64,
}

impl Series {
    fn new(n: usize) -> Self {
        Self {
            buckets: vec![0; n].into_boxed_slice(),
            sum: 0.0,
            count: 0,
        }
    }
}

#[derive(Debug)]
pub struct Histogram {
    desc: Desc,
    bounds: Arc<[f64]>,
    series: DashMap<Box<[String]>, Mutex<Series>>,
}

impl Histogram {
    /// Create a histogram. `bounds` must be non-empty and strictly
    /// increasing; `+Inf` is appended when missing.
    pub fn new(opts: Opts, bounds: &[f64]) -> Result<Self> {
        let desc = Desc::new(opts, &["le"])?;
        let bounds = validate_bounds(&desc.fq_name, bounds)?;
        Ok(Self {
            desc,
            bounds,
            series: DashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn help(&self) -> &str {
        &self.desc.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    /// Upper bounds, including the trailing `+Inf`.
    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation for a label tuple.
    pub fn observe(&self, values: &[&str], value: f64) -> Result<()> {
        if value.is_nan() || value < 0.0 {
            return Err(HttPrismError::InvalidValue(format!(
                "histogram {} cannot observe {value}",
                self.desc.fq_name
            )));
        }
        let key = self.desc.key(values)?;

        if let Some(series) = self.series.get(&key) {
            self.record(series.value(), value);
            return Ok(());
        }
        let series = self
            .series
            .entry(key)
            .or_insert_with(|| Mutex::new(Series::new(self.bounds.len())));
        self.record(series.value(), value);
        Ok(())
    }

    fn record(&self, series: &Mutex<Series>, value: f64) {
        let first = self.bounds.partition_point(|b| *b < value);
        let mut s = series.lock().unwrap_or_else(PoisonError::into_inner);
        for c in &mut s.buckets[first..] {
            *c += 1;
        }
        s.sum += value;
        s.count += 1;
    }

    /// All series, sorted by label values.
    pub fn snapshot(&self) -> Vec<HistogramSample> {
        let mut rows: Vec<(Box<[String]>, Series)> = self
            .series
            .iter()
            .map(|r| {
                let s = r.value().lock().unwrap_or_else(PoisonError::into_inner).clone();
                (r.key().clone(), s)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        rows.into_iter()
            .map(|(key, s)| HistogramSample {
                labels: self.desc.label_pairs(&key),
                buckets: self.bounds.iter().copied().zip(s.buckets.iter().copied()).collect(),
                sum: s.sum,
                count: s.count,
            })
            .collect()
    }
}

fn validate_bounds(name: &str, bounds: &[f64]) -> Result<Arc<[f64]>> {
    if bounds.is_empty() {
        return Err(HttPrismError::Config(format!("histogram {name} needs at least one bucket")));
    }
    if bounds.iter().any(|b| b.is_nan()) {
        return Err(HttPrismError::Config(format!("histogram {name} has a NaN bucket bound")));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(HttPrismError::Config(format!(
            "histogram {name} bucket bounds must be strictly increasing"
        )));
    }

    let mut out = bounds.to_vec();
    if out.last().copied() != Some(f64::INFINITY) {
        out.push(f64::INFINITY);
    }
    Ok(out.into())
}
