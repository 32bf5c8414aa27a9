//! Request observer: turns completed requests into metric updates.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::metrics::{Counter, Histogram, MetricRegistry, Opts, DEFAULT_BUCKETS};

use super::status::classify;

/// One completed request as reported by the host server.
#[derive(Debug, Clone, Copy)]
pub struct CompletedRequest<'a> {
    pub handler: &'a str,
    pub method: &'a str,
    pub elapsed: Duration,
    pub status: i32,
}

/// Extension point the host calls exactly once per completed request.
///
/// Implementations must not block and must not fail the request; defects
/// are reported through logging.
pub trait RequestHook: Send + Sync {
    fn on_request_complete(&self, req: &CompletedRequest<'_>);
}

/// Naming and bucket options for the request metrics.
#[derive(Debug, Clone)]
pub struct ObserverOpts {
    pub namespace: String,
    pub subsystem: String,
    pub buckets: Vec<f64>,
}

impl Default for ObserverOpts {
    fn default() -> Self {
        Self {
            namespace: "httprism".into(),
            subsystem: "http".into(),
            buckets: DEFAULT_BUCKETS.to_vec(),
        }
    }
}

/// Records request duration by `(handler, method)` and request count by
/// `(handler, method, status)`.
pub struct RequestObserver {
    duration: Arc<Histogram>,
    requests: Arc<Counter>,
}

impl RequestObserver {
    /// Register both aggregates on `registry`. Fails on duplicate names or
    /// invalid buckets; callers treat that as fatal.
    pub fn register(registry: &MetricRegistry, opts: &ObserverOpts) -> Result<Self> {
        let duration = registry.register_histogram(
            Opts::new("request_duration_seconds", "HTTP request duration in seconds")
                .namespace(opts.namespace.as_str())
                .subsystem(opts.subsystem.as_str())
                .labels(&["handler", "method"]),
            &opts.buckets,
        )?;

        let requests = registry.register_counter(
            Opts::new("requests_total", "Total of HTTP requests processed")
                .namespace(opts.namespace.as_str())
                .subsystem(opts.subsystem.as_str())
                .labels(&["handler", "method", "status"]),
        )?;

        Ok(Self { duration, requests })
    }

    pub fn duration(&self) -> &Arc<Histogram> {
        &self.duration
    }

    pub fn requests(&self) -> &Arc<Counter> {
        &self.requests
    }

    /// Record one completed request. Never fails; errors are logged.
    pub fn on_request_complete(
        &self,
        handler: &str,
        method: &str,
        elapsed_seconds: f64,
        status_code: i32,
    ) {
        if let Err(e) = self.record(handler, method, elapsed_seconds, status_code) {
            tracing::error!(
                handler = %handler,
                method = %method,
                status = status_code,
                error = %e,
                "request observation failed"
            );
        }
    }

    fn record(&self, handler: &str, method: &str, elapsed_seconds: f64, status_code: i32) -> Result<()> {
        let class = classify(status_code);
        self.duration.observe(&[handler, method], elapsed_seconds)?;
        self.requests.inc(&[handler, method, class.as_str()])
    }
}

impl RequestHook for RequestObserver {
    fn on_request_complete(&self, req: &CompletedRequest<'_>) {
        RequestObserver::on_request_complete(
            self,
            req.handler,
            req.method,
            req.elapsed.as_secs_f64(),
            req.status,
        );
    }
}
