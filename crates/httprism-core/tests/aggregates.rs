//! Counter and histogram behavior, including concurrent updates.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use httprism_core::metrics::{Counter, Histogram, Opts, DEFAULT_BUCKETS};

fn counter() -> Counter {
    Counter::new(Opts::new("requests_total", "requests").labels(&["handler", "method"])).unwrap()
}

fn histogram() -> Histogram {
    Histogram::new(
        Opts::new("request_duration_seconds", "latency").labels(&["handler", "method"]),
        &DEFAULT_BUCKETS,
    )
    .unwrap()
}

#[test]
fn counter_concurrent_increments_are_not_lost() {
    let c = Arc::new(counter());
    let threads = 8;
    let per_thread = 1_000;

    thread::scope(|s| {
        for _ in 0..threads {
            let c = Arc::clone(&c);
            s.spawn(move || {
                for _ in 0..per_thread {
                    c.inc(&["Main", "GET"]).unwrap();
                }
            });
        }
    });

    assert_eq!(c.get(&["Main", "GET"]), Some((threads * per_thread) as f64));
    let snap = c.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].value, (threads * per_thread) as f64);
}

#[test]
fn counter_creates_series_on_first_use() {
    let c = counter();
    assert_eq!(c.get(&["Main", "GET"]), None);
    c.inc_by(&["Main", "GET"], 2.5).unwrap();
    c.inc(&["Main", "POST"]).unwrap();

    let snap = c.snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(
        snap[0].labels,
        vec![("handler".to_string(), "Main".to_string()), ("method".to_string(), "GET".to_string())]
    );
    assert_eq!(snap[0].value, 2.5);
    assert_eq!(snap[1].value, 1.0);
}

#[test]
fn counter_rejects_negative_and_non_finite_deltas() {
    let c = counter();
    for delta in [-1.0, f64::NAN, f64::INFINITY] {
        let err = c.inc_by(&["Main", "GET"], delta).expect_err("must fail");
        assert_eq!(err.kind().as_str(), "INVALID_VALUE");
    }
    assert_eq!(c.get(&["Main", "GET"]), None);
}

#[test]
fn label_arity_mismatch_is_an_error() {
    let c = counter();
    let err = c.inc(&["Main"]).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "LABEL_ARITY");

    let h = histogram();
    let err = h.observe(&["Main", "GET", "extra"], 0.1).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "LABEL_ARITY");
    assert!(h.snapshot().is_empty());
}

#[test]
fn histogram_cumulative_buckets() {
    let h = histogram();
    for v in [0.02, 0.6, 12.0] {
        h.observe(&["Main", "GET"], v).unwrap();
    }

    let snap = h.snapshot();
    assert_eq!(snap.len(), 1);
    let s = &snap[0];
    assert_eq!(s.bucket(0.01), Some(0));
    assert_eq!(s.bucket(0.05), Some(1));
    assert_eq!(s.bucket(0.5), Some(1));
    assert_eq!(s.bucket(0.75), Some(2));
    assert_eq!(s.bucket(10.0), Some(2));
    assert_eq!(s.bucket(15.0), Some(3));
    assert_eq!(s.bucket(f64::INFINITY), Some(3));
    assert_eq!(s.count, 3);
    assert!((s.sum - 12.62).abs() < 1e-9);
}

#[test]
fn histogram_bound_is_inclusive() {
    let h = histogram();
    h.observe(&["Main", "GET"], 0.05).unwrap();
    let s = &h.snapshot()[0];
    assert_eq!(s.bucket(0.01), Some(0));
    assert_eq!(s.bucket(0.05), Some(1));
}

#[test]
fn histogram_appends_inf_bucket() {
    let h = histogram();
    assert_eq!(h.bounds().len(), DEFAULT_BUCKETS.len() + 1);
    assert_eq!(h.bounds().last(), Some(&f64::INFINITY));

    let explicit = Histogram::new(Opts::new("x", "x"), &[1.0, f64::INFINITY]).unwrap();
    assert_eq!(explicit.bounds(), &[1.0, f64::INFINITY]);
}

#[test]
fn histogram_rejects_bad_bounds() {
    for bounds in [&[][..], &[1.0, 1.0][..], &[2.0, 1.0][..], &[0.1, f64::NAN][..]] {
        let err = Histogram::new(Opts::new("x", "x"), bounds).expect_err("must fail");
        assert_eq!(err.kind().as_str(), "CONFIG");
    }
}

#[test]
fn histogram_reserves_le_label() {
    let err = Histogram::new(Opts::new("x", "x").labels(&["le"]), &DEFAULT_BUCKETS)
        .expect_err("must fail");
    assert!(err.is_config());
}

#[test]
fn histogram_rejects_nan_and_negative_observations() {
    let h = histogram();
    assert!(h.observe(&["Main", "GET"], f64::NAN).is_err());
    assert!(h.observe(&["Main", "GET"], -0.5).is_err());
    assert!(h.snapshot().is_empty());
}

#[test]
fn histogram_snapshot_is_never_partial() {
    let h = Arc::new(histogram());
    let writers = 4;
    let per_writer = 2_000;

    thread::scope(|s| {
        for _ in 0..writers {
            let h = Arc::clone(&h);
            s.spawn(move || {
                for i in 0..per_writer {
                    let v = if i % 2 == 0 { 0.02 } else { 12.0 };
                    h.observe(&["Main", "GET"], v).unwrap();
                }
            });
        }

        let h = Arc::clone(&h);
        s.spawn(move || {
            for _ in 0..500 {
                for series in h.snapshot() {
                    let inf = series.bucket(f64::INFINITY).unwrap();
                    assert_eq!(inf, series.count);
                    let small = series.bucket(0.05).unwrap();
                    let large = series.bucket(15.0).unwrap();
                    assert!(small <= large && large == series.count);
                }
            }
        });
    });

    let s = &h.snapshot()[0];
    assert_eq!(s.count, (writers * per_writer) as u64);
    assert_eq!(s.bucket(0.05), Some((writers * per_writer / 2) as u64));
}

#[test]
fn invalid_names_are_config_errors() {
    assert!(Counter::new(Opts::new("1bad", "x")).unwrap_err().is_config());
    assert!(Counter::new(Opts::new("ok", "x").labels(&["__reserved"])).unwrap_err().is_config());
    assert!(Counter::new(Opts::new("ok", "x").labels(&["a-b"])).unwrap_err().is_config());
    assert!(Counter::new(Opts::new("ok", "x").labels(&["a", "a"])).unwrap_err().is_config());
}

#[test]
fn fq_name_skips_empty_parts() {
    assert_eq!(Opts::new("n", "h").namespace("ns").subsystem("sub").fq_name(), "ns_sub_n");
    assert_eq!(Opts::new("n", "h").subsystem("sub").fq_name(), "sub_n");
    assert_eq!(Opts::new("n", "h").fq_name(), "n");
}
