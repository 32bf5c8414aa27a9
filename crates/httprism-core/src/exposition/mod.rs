//! Exposition encodings and Accept-header negotiation.
//!
//! Two encodings are supported: the Prometheus text format (0.0.4, default)
//! and OpenMetrics text (1.0.0). Negotiation is a pure function of the
//! Accept header; anything unrecognized, malformed or absent selects the
//! default.

mod openmetrics;
mod text;

use bytes::{Bytes, BytesMut};

use crate::metrics::{MetricFamily, MetricRegistry};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

const OPENMETRICS_MEDIA_TYPE: &str = "application/openmetrics-text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Text,
    OpenMetrics,
}

impl Encoding {
    /// Pick an encoding from a raw Accept header value.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Encoding::Text;
        };
        let wants_openmetrics = accept.split(',').any(|entry| {
            let media = entry.split(';').next().unwrap_or_default().trim();
            media.eq_ignore_ascii_case(OPENMETRICS_MEDIA_TYPE)
        });
        if wants_openmetrics {
            Encoding::OpenMetrics
        } else {
            Encoding::Text
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Encoding::Text => TEXT_CONTENT_TYPE,
            Encoding::OpenMetrics => OPENMETRICS_CONTENT_TYPE,
        }
    }

    /// Render already-gathered families.
    pub fn render(self, families: &[MetricFamily]) -> Bytes {
        let mut out = BytesMut::with_capacity(4096);
        match self {
            Encoding::Text => text::render(families, &mut out),
            Encoding::OpenMetrics => openmetrics::render(families, &mut out),
        }
        out.freeze()
    }
}

/// Serialize every aggregate in `registry`. Read-only.
pub fn encode(registry: &MetricRegistry, encoding: Encoding) -> Bytes {
    encoding.render(&registry.gather())
}

/// Format a sample value: integral values keep a trailing `.0`, and
/// magnitudes of 1e16 and above use exponent form (`1e+20`).
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else if v.abs() >= 1e16 {
        let exp = format!("{v:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Escape a label value.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render `{a="x",b="y"}` with pairs sorted by name. Empty when no labels.
pub(crate) fn label_block(pairs: &[(String, String)], le: Option<f64>) -> String {
    let mut sorted: Vec<(&str, String)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), escape_label(v)))
        .collect();
    if let Some(le) = le {
        sorted.push(("le", format_float(le)));
    }
    if sorted.is_empty() {
        return String::new();
    }
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let body = sorted
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}
