use std::net::SocketAddr;

use httprism_core::error::{HttPrismError, Result};
use httprism_core::metrics::DEFAULT_BUCKETS;
use httprism_core::observe::ObserverOpts;
use serde::Deserialize;

/// Paths owned by the ops endpoints; the metrics path may not reuse them.
const RESERVED_PATHS: [&str; 2] = ["/healthz", "/readyz"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HttPrismError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            HttPrismError::Config(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Host identifier prefix of every metric name.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_subsystem")]
    pub subsystem: String,

    #[serde(default = "default_path")]
    pub path: String,

    /// Latency bucket upper bounds in seconds.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            path: default_path(),
            buckets: default_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(HttPrismError::Config(
                "metrics.path must start with '/' and name a route".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.path.as_str()) {
            return Err(HttPrismError::Config(format!(
                "metrics.path {} collides with an ops endpoint",
                self.path
            )));
        }
        if self.buckets.is_empty() {
            return Err(HttPrismError::Config("metrics.buckets must not be empty".into()));
        }
        if self.buckets.iter().any(|b| b.is_nan()) || self.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HttPrismError::Config(
                "metrics.buckets must be strictly increasing".into(),
            ));
        }
        Ok(())
    }

    pub fn observer_opts(&self) -> ObserverOpts {
        ObserverOpts {
            namespace: self.namespace.clone(),
            subsystem: self.subsystem.clone(),
            buckets: self.buckets.clone(),
        }
    }
}

fn default_namespace() -> String {
    "httprism".into()
}
fn default_subsystem() -> String {
    "http".into()
}
fn default_path() -> String {
    "/metrics".into()
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
