//! Shared application state for the httprism gateway.
//!
//! Owns the metric registry and the request observer registered on it. Both
//! the tracking middleware and the exposition route reach them through this
//! handle; nothing is process-global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use httprism_core::error::Result;
use httprism_core::metrics::MetricRegistry;
use httprism_core::observe::{RequestHook, RequestObserver};

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    registry: Arc<MetricRegistry>,
    observer: Arc<RequestObserver>,
    draining: AtomicBool,
}

impl AppState {
    /// Build state with a fresh registry.
    /// Returns Result so main can refuse to start on a bad metric schema.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(MetricRegistry::new()))
    }

    /// Build state on a caller-owned registry, e.g. one that already holds
    /// application metrics that should be exposed alongside request metrics.
    pub fn with_registry(cfg: GatewayConfig, registry: Arc<MetricRegistry>) -> Result<Self> {
        cfg.validate()?;
        let observer = RequestObserver::register(&registry, &cfg.metrics.observer_opts())?;

        tracing::info!(
            namespace = %cfg.metrics.namespace,
            path = %cfg.metrics.path,
            buckets = cfg.metrics.buckets.len(),
            "request metrics registered"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                observer: Arc::new(observer),
                draining: AtomicBool::new(false),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.inner.registry
    }

    pub fn observer(&self) -> Arc<RequestObserver> {
        Arc::clone(&self.inner.observer)
    }

    pub fn request_hook(&self) -> &dyn RequestHook {
        self.inner.observer.as_ref()
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
