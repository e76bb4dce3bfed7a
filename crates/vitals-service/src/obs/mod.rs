//! In-process metrics.
//!
//! Endpoints record through the [`metrics::MetricsSink`] trait; the
//! `/metrics` handler renders the registry in Prometheus text format.

pub mod metrics;

pub use metrics::{MetricsRegistry, MetricsSink};
