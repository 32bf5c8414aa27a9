//! Metric naming options and validated descriptors.

use std::sync::Arc;

use crate::error::{HttPrismError, Result};

/// Builder-style naming options for an aggregate.
///
/// The fully-qualified name is `namespace_subsystem_name`, skipping empty
/// parts.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub namespace: String,
    pub subsystem: String,
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            ..Self::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    pub fn labels(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Validated, immutable metric descriptor.
#[derive(Debug, Clone)]
pub struct Desc {
    pub fq_name: String,
    pub help: String,
    pub label_names: Arc<[String]>,
}

impl Desc {
    /// Validate names. `reserved` lists label names the aggregate type owns
    /// (e.g. `le` for histograms).
    pub fn new(opts: Opts, reserved: &[&str]) -> Result<Self> {
        let fq_name = opts.fq_name();
        if !is_valid_metric_name(&fq_name) {
            return Err(HttPrismError::Config(format!("invalid metric name: {fq_name:?}")));
        }

        for (i, label) in opts.label_names.iter().enumerate() {
            if !is_valid_label_name(label) {
                return Err(HttPrismError::Config(format!(
                    "invalid label name {label:?} on {fq_name}"
                )));
            }
            if reserved.contains(&label.as_str()) {
                return Err(HttPrismError::Config(format!(
                    "label name {label:?} is reserved on {fq_name}"
                )));
            }
            if opts.label_names[..i].contains(label) {
                return Err(HttPrismError::Config(format!(
                    "duplicate label name {label:?} on {fq_name}"
                )));
            }
        }

        Ok(Self {
            fq_name,
            help: opts.help,
            label_names: opts.label_names.into(),
        })
    }

    /// Build the series key for one observation. Values are positional.
    pub(crate) fn key(&self, values: &[&str]) -> Result<Box<[String]>> {
        if values.len() != self.label_names.len() {
            return Err(HttPrismError::LabelArity {
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    /// Pair label names with a series key, in declaration order.
    pub(crate) fn label_pairs(&self, key: &[String]) -> Vec<(String, String)> {
        self.label_names
            .iter()
            .cloned()
            .zip(key.iter().cloned())
            .collect()
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
