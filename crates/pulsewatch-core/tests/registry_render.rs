//! Registry registration and text exposition output.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use pulsewatch_core::metrics::{Counter, Gauge, Histogram, ProcessCollector, Registry};

fn text(reg: &Registry) -> String {
    String::from_utf8(reg.render().to_vec()).unwrap()
}

#[test]
fn duplicate_names_fail() {
    let mut reg = Registry::new();
    reg.register(Arc::new(Gauge::new("active_users", "a").unwrap()))
        .unwrap();

    let err = reg
        .register(Arc::new(Counter::new("active_users", "b", &[]).unwrap()))
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "DUPLICATE_METRIC");
    assert_eq!(reg.names(), vec!["active_users".to_string()]);
}

#[test]
fn process_collector_names_are_reserved() {
    let mut reg = Registry::new();
    reg.register(Arc::new(ProcessCollector::new())).unwrap();
    for name in [
        "process_cpu_user_seconds_total",
        "process_cpu_system_seconds_total",
        "process_cpu_seconds_total",
        "process_start_time_seconds",
        "process_uptime_seconds",
        "process_resident_memory_bytes",
        "process_virtual_memory_bytes",
        "process_open_fds",
        "process_max_fds",
    ] {
        assert!(reg.is_registered(name), "{name}");
    }
    assert!(reg
        .register(Arc::new(Gauge::new("process_uptime_seconds", "x").unwrap()))
        .is_err());
    assert!(reg
        .register(Arc::new(Counter::new("process_cpu_seconds_total", "x", &[]).unwrap()))
        .is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn process_collector_exports_linux_families() {
    let mut reg = Registry::new();
    reg.register(Arc::new(ProcessCollector::new())).unwrap();
    let out = text(&reg);
    for line in [
        "# TYPE process_cpu_user_seconds_total counter",
        "# TYPE process_cpu_system_seconds_total counter",
        "# TYPE process_cpu_seconds_total counter",
        "# TYPE process_start_time_seconds gauge",
        "# TYPE process_uptime_seconds gauge",
        "# TYPE process_resident_memory_bytes gauge",
        "# TYPE process_virtual_memory_bytes gauge",
        "# TYPE process_open_fds gauge",
    ] {
        assert!(out.contains(line), "missing {line:?} in:\n{out}");
    }

    let value = |name: &str| -> f64 {
        out.lines()
            .find_map(|l| l.strip_prefix(&format!("{name} ")))
            .unwrap_or_else(|| panic!("no sample for {name}"))
            .parse()
            .unwrap()
    };
    let user = value("process_cpu_user_seconds_total");
    let system = value("process_cpu_system_seconds_total");
    assert!((value("process_cpu_seconds_total") - (user + system)).abs() < 1e-9);
    assert!(value("process_virtual_memory_bytes") >= value("process_resident_memory_bytes"));
}

#[test]
fn empty_instruments_render_headers() {
    let mut reg = Registry::new();
    reg.register(Arc::new(
        Counter::new("http_requests_total", "Total number of HTTP requests", &["method"]).unwrap(),
    ))
    .unwrap();
    reg.register(Arc::new(Counter::new("error_rate", "Number of failed requests", &[]).unwrap()))
        .unwrap();
    reg.register(Arc::new(Histogram::new("rt_seconds", "rt", &[0.1, 1.0]).unwrap()))
        .unwrap();

    let expected = "\
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
# HELP error_rate Number of failed requests
# TYPE error_rate counter
error_rate 0
# HELP rt_seconds rt
# TYPE rt_seconds histogram
rt_seconds_bucket{le=\"0.1\"} 0
rt_seconds_bucket{le=\"1\"} 0
rt_seconds_bucket{le=\"+Inf\"} 0
rt_seconds_sum 0
rt_seconds_count 0
";
    assert_eq!(text(&reg), expected);
}

#[test]
fn labelled_series_render_sorted() {
    let c = Arc::new(Counter::new("reqs_total", "reqs", &["route", "status"]).unwrap());
    let mut reg = Registry::new();
    reg.register(c.clone()).unwrap();

    c.inc(&["/b", "200"]).unwrap();
    c.inc(&["/a", "500"]).unwrap();
    c.add(&["/a", "200"], 3).unwrap();

    let out = text(&reg);
    let samples: Vec<&str> = out.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        samples,
        vec![
            r#"reqs_total{route="/a",status="200"} 3"#,
            r#"reqs_total{route="/a",status="500"} 1"#,
            r#"reqs_total{route="/b",status="200"} 1"#,
        ]
    );
}

#[test]
fn help_text_is_escaped() {
    let mut reg = Registry::new();
    reg.register(Arc::new(Gauge::new("g", "line one\nback\\slash").unwrap()))
        .unwrap();
    assert!(text(&reg).starts_with("# HELP g line one\\nback\\\\slash\n"));
}

#[test]
fn render_is_idempotent_without_writes() {
    let c = Arc::new(Counter::new("reqs_total", "reqs", &["status"]).unwrap());
    let h = Arc::new(Histogram::new("rt_seconds", "rt", &[0.1, 0.5]).unwrap());
    let mut reg = Registry::new();
    reg.register(c.clone()).unwrap();
    reg.register(h.clone()).unwrap();

    for s in ["200", "500", "200", "404"] {
        c.inc(&[s]).unwrap();
    }
    h.observe(0.2);
    h.observe(0.05);

    assert_eq!(reg.render(), reg.render());
    assert!(text(&reg).contains("rt_seconds_bucket{le=\"0.5\"} 2"));
}

#[test]
fn gauge_reflects_live_state() {
    let g = Arc::new(Gauge::new("active_users", "users").unwrap());
    let mut reg = Registry::new();
    reg.register(g.clone()).unwrap();

    assert!(text(&reg).contains("\nactive_users 0\n"));
    g.set(73.0);
    assert!(text(&reg).contains("\nactive_users 73\n"));
}
