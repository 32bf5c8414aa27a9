//! Registry registration, lookup and snapshots.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use httprism_core::metrics::{MetricRegistry, Opts, Samples, DEFAULT_BUCKETS};
use httprism_core::observe::{CompletedRequest, ObserverOpts, RequestHook, RequestObserver};

#[test]
fn duplicate_name_is_rejected_and_first_survives() {
    let reg = MetricRegistry::new();
    let first = reg.register_counter(Opts::new("jobs_total", "first")).unwrap();
    first.inc(&[]).unwrap();

    let err = reg
        .register_counter(Opts::new("jobs_total", "second"))
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "DUPLICATE");
    assert!(err.is_config());

    let err = reg
        .register_histogram(Opts::new("jobs", "clash"), &DEFAULT_BUCKETS)
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "DUPLICATE");

    assert_eq!(reg.len(), 1);
    let kept = reg.counter("jobs").unwrap();
    assert_eq!(kept.help(), "first");
    assert_eq!(kept.get(&[]), Some(1.0));
}

#[test]
fn lookup_by_kind() {
    let reg = MetricRegistry::new();
    reg.register_counter(Opts::new("a_total", "a")).unwrap();
    reg.register_histogram(Opts::new("b", "b"), &[1.0]).unwrap();

    assert!(reg.counter("a").is_some());
    assert!(reg.histogram("a").is_none());
    assert!(reg.histogram("b").is_some());
    assert!(reg.counter("b").is_none());
    assert!(reg.get("missing").is_none());
}

#[test]
fn gather_keeps_registration_order_and_is_stable() {
    let reg = MetricRegistry::new();
    let obs = RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();
    obs.on_request_complete("Main", "GET", 0.2, 200);
    obs.on_request_complete("Main", "POST", 0.3, 201);

    let a = reg.gather();
    let b = reg.gather();
    assert_eq!(a, b);
    assert_eq!(a[0].name, "httprism_http_request_duration_seconds");
    assert_eq!(a[1].name, "httprism_http_requests");
}

#[test]
fn observer_routes_into_both_aggregates() {
    let reg = MetricRegistry::new();
    let obs = RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();

    obs.on_request_complete("Main", "GET", 0.02, 200);
    obs.on_request_complete("Main", "GET", 0.6, 404);
    obs.on_request_complete("Main", "GET", 12.0, 503);

    let requests = obs.requests();
    assert_eq!(requests.get(&["Main", "GET", "2xx"]), Some(1.0));
    assert_eq!(requests.get(&["Main", "GET", "4xx"]), Some(1.0));
    assert_eq!(requests.get(&["Main", "GET", "5xx"]), Some(1.0));

    let hist = obs.duration().snapshot();
    assert_eq!(hist.len(), 1);
    assert_eq!(hist[0].count, 3);
    assert_eq!(hist[0].bucket(0.75), Some(2));
}

#[test]
fn observer_via_hook_trait() {
    let reg = MetricRegistry::new();
    let obs = RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();
    let hook: &dyn RequestHook = &obs;

    hook.on_request_complete(&CompletedRequest {
        handler: "Main",
        method: "GET",
        elapsed: std::time::Duration::from_millis(30),
        status: 302,
    });

    assert_eq!(obs.requests().get(&["Main", "GET", "3xx"]), Some(1.0));
    assert_eq!(obs.duration().snapshot()[0].bucket(0.05), Some(1));
}

#[test]
fn observer_twice_on_one_registry_is_a_config_error() {
    let reg = MetricRegistry::new();
    RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();
    let err = RequestObserver::register(&reg, &ObserverOpts::default())
        .err()
        .expect("must fail");
    assert!(err.is_config());
}

#[test]
fn observer_rejects_bad_buckets() {
    let reg = MetricRegistry::new();
    let opts = ObserverOpts {
        buckets: vec![1.0, 0.5],
        ..ObserverOpts::default()
    };
    let err = RequestObserver::register(&reg, &opts).err().expect("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
    assert!(reg.is_empty());
}

#[test]
fn totals_are_monotonic() {
    let reg = MetricRegistry::new();
    let obs = RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();

    let mut last = 0;
    for i in 0..20 {
        obs.on_request_complete("Main", "GET", 0.001 * f64::from(i), 200);
        let count = match &reg.gather()[0].samples {
            Samples::Histogram(s) => s[0].count,
            Samples::Counter(_) => panic!("expected histogram first"),
        };
        assert!(count > last);
        last = count;
    }
}

#[test]
fn snapshot_serializes() {
    let reg = MetricRegistry::new();
    let obs = RequestObserver::register(&reg, &ObserverOpts::default()).unwrap();
    obs.on_request_complete("Main", "GET", 0.2, 200);

    let json = serde_json::to_value(reg.gather()).unwrap();
    assert_eq!(json[1]["name"], "httprism_http_requests");
    assert_eq!(json[1]["type"], "counter");
    assert_eq!(json[1]["series"][0]["value"], 1.0);
    assert_eq!(json[0]["type"], "histogram");
    assert_eq!(json[0]["series"][0]["count"], 1);
}

#[test]
fn suffixed_names_collide_across_kinds() {
    let reg = MetricRegistry::new();
    reg.register_counter(Opts::new("x", "counter")).unwrap();

    let err = reg
        .register_histogram(Opts::new("x_total", "hist"), &[1.0])
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "DUPLICATE");

    reg.register_histogram(Opts::new("h", "hist"), &[1.0]).unwrap();
    for clashing in ["h_count", "h_sum", "h_bucket"] {
        let err = reg
            .register_counter(Opts::new(clashing, "counter"))
            .expect_err("must fail");
        assert_eq!(err.kind().as_str(), "DUPLICATE", "{clashing}");
    }

    assert_eq!(reg.len(), 2);
    let body = String::from_utf8(
        httprism_core::exposition::encode(&reg, httprism_core::exposition::Encoding::Text)
            .to_vec(),
    )
    .unwrap();
    assert_eq!(body.matches("# TYPE x_total ").count(), 1);
}

#[test]
fn counters_are_found_by_exposed_name() {
    let reg = MetricRegistry::new();
    RequestObserver::register(
        &reg,
        &ObserverOpts {
            namespace: "tornado".into(),
            ..ObserverOpts::default()
        },
    )
    .unwrap();

    assert!(reg.counter("tornado_http_requests_total").is_some());
    assert!(reg.counter("tornado_http_requests").is_some());
    assert!(reg.histogram("tornado_http_requests_total").is_none());
    assert!(reg.histogram("tornado_http_request_duration_seconds").is_some());
    assert!(reg.histogram("tornado_http_request_duration_seconds_total").is_none());
}
