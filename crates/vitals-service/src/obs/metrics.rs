//! Process-wide metrics registry for the service.
//!
//! Counter/gauge/histogram families with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic
//! ordering. Histogram samples are accumulated as integer microseconds and
//! rendered in seconds, so the hot path never does floating point atomics.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "custom_requests_total";
pub const RESPONSE_TIME_SECONDS: &str = "custom_response_time_seconds";
pub const ACTIVE_USERS: &str = "active_users_count";
pub const API_ERRORS_TOTAL: &str = "api_errors_total";

/// The three primitive operations endpoints record through.
///
/// Implementations must be safe to call from many requests at once and must
/// never block the caller for more than a shard lock.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]);
    fn observe_histogram(&self, name: &str, labels: &[(&str, &str)], value: Duration);
    fn set_gauge(&self, name: &str, value: i64);
}

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braces(labels: &str) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{{{labels}}}")
    }
}

/// Seconds as Prometheus clients print them (`1.0`, `0.25`).
fn fmt_secs(micros: u64) -> String {
    let secs = micros as f64 / 1_000_000.0;
    if secs.fract() == 0.0 {
        format!("{secs:.1}")
    } else {
        format!("{secs}")
    }
}

fn sorted_series<V, T>(map: &DashMap<LabelKey, V>, f: impl Fn(&V) -> T) -> Vec<(LabelKey, T)> {
    let mut rows: Vec<(LabelKey, T)> = map.iter().map(|r| (r.key().clone(), f(r.value()))).collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of one series (0 when never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        for (key, val) in sorted_series(&self.map, |c| c.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{}{} {}", name, braces(&label_str(&key)), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Replace the current value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, out: &mut String) {
        for (key, val) in sorted_series(&self.map, |g| g.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{}{} {}", name, braces(&label_str(&key)), val);
        }
    }
}

// Prometheus client default buckets, in microseconds.
// 5ms .. 10s
const BUCKETS_MICROS: [u64; 14] = [
    5_000, 10_000, 25_000, 50_000, 75_000, 100_000, 250_000, 500_000, 750_000, 1_000_000,
    2_500_000, 5_000_000, 7_500_000, 10_000_000,
];

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations recorded for one series.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of observations for one series.
    pub fn sum(&self, labels: &[(&str, &str)]) -> Duration {
        self.map
            .get(&label_key(labels))
            .map(|h| Duration::from_micros(h.sum_micros.load(Ordering::Relaxed)))
            .unwrap_or_default()
    }

    fn render(&self, name: &str, out: &mut String) {
        let rows = sorted_series(&self.map, |h| {
            let buckets: Vec<u64> = h.buckets.iter().map(|b| b.load(Ordering::Relaxed)).collect();
            (
                buckets,
                h.count.load(Ordering::Relaxed),
                h.sum_micros.load(Ordering::Relaxed),
            )
        });

        for (key, (buckets, count, sum)) in rows {
            let labels = label_str(&key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{labels},")
            };

            for (le, n) in BUCKETS_MICROS.iter().zip(buckets) {
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, fmt_secs(*le), n);
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let _ = writeln!(out, "{}_sum{} {}", name, braces(&labels), sum as f64 / 1_000_000.0);
            let _ = writeln!(out, "{}_count{} {}", name, braces(&labels), count);
        }
    }
}

#[derive(Default)]
struct Family<T> {
    help: String,
    series: T,
}

fn with_family<T: Default, R>(
    map: &DashMap<String, Family<T>>,
    name: &str,
    f: impl FnOnce(&T) -> R,
) -> R {
    if let Some(fam) = map.get(name) {
        return f(&fam.series);
    }
    let fam = map.entry(name.to_string()).or_default();
    f(&fam.series)
}

fn describe<T: Default>(map: &DashMap<String, Family<T>>, name: &str, help: &str) {
    map.entry(name.to_string()).or_default().help = help.to_string();
}

fn render_families<T>(
    map: &DashMap<String, Family<T>>,
    kind: &str,
    out: &mut String,
    render: impl Fn(&T, &str, &mut String),
) {
    let mut names: Vec<String> = map.iter().map(|r| r.key().clone()).collect();
    names.sort();
    for name in names {
        let Some(fam) = map.get(&name) else { continue };
        if !fam.help.is_empty() {
            let _ = writeln!(out, "# HELP {} {}", name, fam.help);
        }
        let _ = writeln!(out, "# TYPE {} {}", name, kind);
        render(&fam.series, &name, out);
    }
}

/// Accumulated metrics for the lifetime of the process. Never reset.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Family<CounterVec>>,
    gauges: DashMap<String, Family<GaugeVec>>,
    histograms: DashMap<String, Family<HistogramVec>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the service's four families described up front.
    pub fn with_service_families() -> Self {
        let reg = Self::new();
        reg.describe_counter(REQUESTS_TOTAL, "Custom request counter");
        reg.describe_histogram(RESPONSE_TIME_SECONDS, "Custom response time");
        reg.describe_gauge(ACTIVE_USERS, "Number of active users");
        reg.describe_counter(API_ERRORS_TOTAL, "API errors counter");
        reg
    }

    pub fn describe_counter(&self, name: &str, help: &str) {
        describe(&self.counters, name, help);
    }

    pub fn describe_gauge(&self, name: &str, help: &str) {
        describe(&self.gauges, name, help);
    }

    pub fn describe_histogram(&self, name: &str, help: &str) {
        describe(&self.histograms, name, help);
    }

    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .get(name)
            .map(|f| f.series.get(labels))
            .unwrap_or(0)
    }

    pub fn gauge_value(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).and_then(|f| f.series.get(&[]))
    }

    pub fn histogram_count(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.histograms
            .get(name)
            .map(|f| f.series.count(labels))
            .unwrap_or(0)
    }

    pub fn histogram_sum(&self, name: &str, labels: &[(&str, &str)]) -> Duration {
        self.histograms
            .get(name)
            .map(|f| f.series.sum(labels))
            .unwrap_or_default()
    }

    /// Render all families in Prometheus text exposition format (0.0.4).
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_families(&self.counters, "counter", &mut out, |s, n, o| s.render(n, o));
        render_families(&self.gauges, "gauge", &mut out, |s, n, o| s.render(n, o));
        render_families(&self.histograms, "histogram", &mut out, |s, n, o| s.render(n, o));
        out
    }
}

impl MetricsSink for MetricsRegistry {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        with_family(&self.counters, name, |c| c.inc(labels));
    }

    fn observe_histogram(&self, name: &str, labels: &[(&str, &str)], value: Duration) {
        with_family(&self.histograms, name, |h| h.observe(labels, value));
    }

    fn set_gauge(&self, name: &str, value: i64) {
        with_family(&self.gauges, name, |g| g.set(&[], value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counter_labels_are_order_insensitive() {
        let reg = MetricsRegistry::new();
        reg.increment_counter("c", &[("a", "1"), ("b", "2")]);
        reg.increment_counter("c", &[("b", "2"), ("a", "1")]);
        assert_eq!(reg.counter_value("c", &[("a", "1"), ("b", "2")]), 2);
        assert_eq!(reg.counter_value("c", &[("a", "1"), ("b", "3")]), 0);
        assert_eq!(reg.counter_value("missing", &[]), 0);
    }

    #[test]
    fn gauge_keeps_last_value() {
        let reg = MetricsRegistry::new();
        assert_eq!(reg.gauge_value(ACTIVE_USERS), None);
        reg.set_gauge(ACTIVE_USERS, 42);
        reg.set_gauge(ACTIVE_USERS, 17);
        assert_eq!(reg.gauge_value(ACTIVE_USERS), Some(17));
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let reg = MetricsRegistry::new();
        let labels = [("view_name", "home")];
        reg.observe_histogram("h", &labels, Duration::from_millis(60));
        reg.observe_histogram("h", &labels, Duration::from_millis(900));
        assert_eq!(reg.histogram_count("h", &labels), 2);
        assert_eq!(reg.histogram_sum("h", &labels), Duration::from_millis(960));

        let text = reg.render();
        assert!(text.contains("# TYPE h histogram"));
        assert!(text.contains("h_bucket{view_name=\"home\",le=\"0.05\"} 0"));
        assert!(text.contains("h_bucket{view_name=\"home\",le=\"0.075\"} 1"));
        assert!(text.contains("h_bucket{view_name=\"home\",le=\"1.0\"} 2"));
        assert!(text.contains("h_bucket{view_name=\"home\",le=\"+Inf\"} 2"));
        assert!(text.contains("h_sum{view_name=\"home\"} 0.96"));
        assert!(text.contains("h_count{view_name=\"home\"} 2"));
    }

    #[test]
    fn render_includes_help_and_escapes_labels() {
        let reg = MetricsRegistry::with_service_families();
        reg.increment_counter(
            REQUESTS_TOTAL,
            &[("view_name", "say \"hi\""), ("method", "GET")],
        );
        reg.set_gauge(ACTIVE_USERS, 12);

        let text = reg.render();
        assert!(text.contains("# HELP custom_requests_total Custom request counter"));
        assert!(text.contains(
            "custom_requests_total{method=\"GET\",view_name=\"say \\\"hi\\\"\"} 1"
        ));
        assert!(text.contains("# TYPE api_errors_total counter"));
        assert!(text.contains("active_users_count 12"));
        assert!(text.contains("# TYPE custom_response_time_seconds histogram"));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let reg = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        reg.increment_counter("c", &[("view_name", "x")]);
                        reg.observe_histogram("h", &[("view_name", "x")], Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.counter_value("c", &[("view_name", "x")]), 8_000);
        assert_eq!(reg.histogram_count("h", &[("view_name", "x")]), 8_000);
    }
}
