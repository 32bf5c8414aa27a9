//! Prometheus text format 0.0.4.

use std::fmt::Write;

use bytes::BytesMut;

use super::{format_float, label_block};
use crate::metrics::{MetricFamily, Samples};

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub(super) fn render(families: &[MetricFamily], out: &mut BytesMut) {
    for family in families {
        match &family.samples {
            Samples::Counter(series) => {
                let name = format!("{}_total", family.name);
                let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
                let _ = writeln!(out, "# TYPE {} counter", name);
                for s in series {
                    let _ = writeln!(out, "{}{} {}", name, label_block(&s.labels, None), format_float(s.value));
                }
            }
            Samples::Histogram(series) => {
                let name = &family.name;
                let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
                let _ = writeln!(out, "# TYPE {} histogram", name);
                for s in series {
                    for (le, count) in &s.buckets {
                        let _ = writeln!(
                            out,
                            "{}_bucket{} {}",
                            name,
                            label_block(&s.labels, Some(*le)),
                            format_float(*count as f64)
                        );
                    }
                    let labels = label_block(&s.labels, None);
                    let _ = writeln!(out, "{}_count{} {}", name, labels, format_float(s.count as f64));
                    let _ = writeln!(out, "{}_sum{} {}", name, labels, format_float(s.sum));
                }
            }
        }
    }
}
