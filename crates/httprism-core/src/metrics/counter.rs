//! Labeled monotonic counter.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::opts::{Desc, Opts};
use super::CounterSample;
use crate::error::{HttPrismError, Result};

/// Counter keyed by label values. Each series holds an `f64` stored as bits
/// in an `AtomicU64`, so increments are lock-free once the series exists.
#[derive(Debug)]
pub struct Counter {
    desc: Desc,
    series: DashMap<Box<[String]>, AtomicU64>,
}

impl Counter {
    pub fn new(opts: Opts) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(opts, &[])?,
            series: DashMap::new(),
        })
    }

    /// Family name without the `_total` suffix.
    pub fn name(&self) -> &str {
        self.desc
            .fq_name
            .strip_suffix("_total")
            .unwrap_or(self.desc.fq_name.as_str())
    }

    pub fn help(&self) -> &str {
        &self.desc.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.inc_by(values, 1.0)
    }

    /// Increment by a non-negative finite delta.
    pub fn inc_by(&self, values: &[&str], delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(HttPrismError::InvalidValue(format!(
                "counter {} cannot be incremented by {delta}",
                self.desc.fq_name
            )));
        }
        let key = self.desc.key(values)?;

        if let Some(cell) = self.series.get(&key) {
            add(cell.value(), delta);
            return Ok(());
        }
        // Insert-if-absent under the shard write lock.
        let cell = self.series.entry(key).or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        add(cell.value(), delta);
        Ok(())
    }

    /// Current value for one label tuple, if it has been touched.
    pub fn get(&self, values: &[&str]) -> Option<f64> {
        let key = self.desc.key(values).ok()?;
        self.series
            .get(&key)
            .map(|cell| f64::from_bits(cell.value().load(Ordering::Acquire)))
    }

    /// All series, sorted by label values.
    pub fn snapshot(&self) -> Vec<CounterSample> {
        let mut rows: Vec<(Box<[String]>, f64)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Acquire))))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        rows.into_iter()
            .map(|(key, value)| CounterSample {
                labels: self.desc.label_pairs(&key),
                value,
            })
            .collect()
    }
}

fn add(cell: &AtomicU64, delta: f64) {
    // The closure never returns None, so the update always succeeds.
    let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        Some((f64::from_bits(bits) + delta).to_bits())
    });
}
