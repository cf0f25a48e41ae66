//! Push-based observability: Prometheus registry plus a reporter that logs
//! JSON snapshots. No metrics endpoint is exposed.

pub mod latency_tracker;
pub mod metrics;
pub mod reporter;

pub use latency_tracker::LatencyGuard;
pub use metrics::Metrics;
pub use reporter::MetricsReporter;
