//! Metric registry.
//!
//! An explicitly constructed store of aggregates, shared by handle
//! (`Arc<MetricRegistry>`) between the request observer and the exposition
//! route. There is no process-global instance; tests build their own.

use std::sync::{Arc, PoisonError, RwLock};

use super::counter::Counter;
use super::histogram::Histogram;
use super::opts::Opts;
use super::{MetricFamily, Samples};
use crate::error::{HttPrismError, Result};

/// Closed set of aggregate kinds held by the registry.
#[derive(Debug, Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Histogram(Arc<Histogram>),
}

impl Metric {
    /// Family name (counters without `_total`).
    pub fn name(&self) -> &str {
        match self {
            Metric::Counter(c) => c.name(),
            Metric::Histogram(h) => h.name(),
        }
    }

    /// Every sample or family name this metric puts on the wire.
    fn exposed_names(&self) -> Vec<String> {
        match self {
            Metric::Counter(c) => vec![c.name().to_string(), format!("{}_total", c.name())],
            Metric::Histogram(h) => {
                let n = h.name();
                vec![
                    n.to_string(),
                    format!("{n}_bucket"),
                    format!("{n}_sum"),
                    format!("{n}_count"),
                ]
            }
        }
    }

    /// Counters answer to both the family name and the `_total` form.
    fn answers_to(&self, name: &str) -> bool {
        match self {
            Metric::Counter(c) => {
                name == c.name() || name.strip_suffix("_total") == Some(c.name())
            }
            Metric::Histogram(h) => name == h.name(),
        }
    }

    fn family(&self) -> MetricFamily {
        match self {
            Metric::Counter(c) => MetricFamily {
                name: c.name().to_string(),
                help: c.help().to_string(),
                samples: Samples::Counter(c.snapshot()),
            },
            Metric::Histogram(h) => MetricFamily {
                name: h.name().to_string(),
                help: h.help().to_string(),
                samples: Samples::Histogram(h.snapshot()),
            },
        }
    }
}

/// Registry of aggregates in registration order.
///
/// Registration takes the write lock; gathering takes the read lock and then
/// each aggregate's own per-series locks, so exposition never blocks
/// observers of other metrics.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: RwLock<Vec<Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a counter.
    pub fn register_counter(&self, opts: Opts) -> Result<Arc<Counter>> {
        let counter = Arc::new(Counter::new(opts)?);
        self.register(Metric::Counter(Arc::clone(&counter)))?;
        Ok(counter)
    }

    /// Create and register a histogram with the given bucket bounds.
    pub fn register_histogram(&self, opts: Opts, bounds: &[f64]) -> Result<Arc<Histogram>> {
        let histogram = Arc::new(Histogram::new(opts, bounds)?);
        self.register(Metric::Histogram(Arc::clone(&histogram)))?;
        Ok(histogram)
    }

    /// Register a prebuilt aggregate. Fails if any name it exposes
    /// (`_total`, `_bucket`, `_sum`, `_count` included) is already exposed
    /// by another metric.
    pub fn register(&self, metric: Metric) -> Result<()> {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        let wanted = metric.exposed_names();
        for existing in metrics.iter() {
            if let Some(clash) = existing.exposed_names().into_iter().find(|n| wanted.contains(n)) {
                return Err(HttPrismError::Duplicate(format!(
                    "{} (exposes {clash}, already exposed by {})",
                    metric.name(),
                    existing.name()
                )));
            }
        }
        tracing::info!(metric = %metric.name(), "metric registered");
        metrics.push(metric);
        Ok(())
    }

    /// Look up by family name. Counters are also found by their exposed
    /// `_total` name.
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|m| m.answers_to(name))
            .cloned()
    }

    pub fn counter(&self, name: &str) -> Option<Arc<Counter>> {
        match self.get(name)? {
            Metric::Counter(c) => Some(c),
            Metric::Histogram(_) => None,
        }
    }

    pub fn histogram(&self, name: &str) -> Option<Arc<Histogram>> {
        match self.get(name)? {
            Metric::Histogram(h) => Some(h),
            Metric::Counter(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.metrics.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot every registered aggregate, in registration order.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let metrics = self.metrics.read().unwrap_or_else(PoisonError::into_inner).clone();
        metrics.iter().map(Metric::family).collect()
    }
}
