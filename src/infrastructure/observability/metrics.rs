//! Prometheus metrics for MarketPulse. All names use the `marketpulse_` prefix.

use super::latency_tracker::LatencyGuard;
use prometheus::{
    Counter, CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Observations written, by feed
    pub observations_ingested_total: CounterVec,
    /// Feed runs that failed outright, by feed
    pub feed_failures_total: CounterVec,
    /// Rows written by the last feature build
    pub feature_rows: Gauge,
    /// Holdout accuracy of the most recent training run
    pub model_accuracy: Gauge,
    /// Latest served probability of an up move
    pub probability_up: Gauge,
    /// Update pipeline steps, by step and outcome
    pub pipeline_steps_total: CounterVec,
    pub news_annotated_total: Counter,
    pub uptime_seconds: Gauge,
    /// API handler latency, by endpoint and outcome
    pub api_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let observations_ingested_total = CounterVec::new(
            Opts::new(
                "marketpulse_observations_ingested_total",
                "Observations written by feed",
            ),
            &["feed"],
        )?;
        registry.register(Box::new(observations_ingested_total.clone()))?;

        let feed_failures_total = CounterVec::new(
            Opts::new("marketpulse_feed_failures_total", "Failed feed runs"),
            &["feed"],
        )?;
        registry.register(Box::new(feed_failures_total.clone()))?;

        let feature_rows = Gauge::with_opts(Opts::new(
            "marketpulse_feature_rows",
            "Rows written by the last feature build",
        ))?;
        registry.register(Box::new(feature_rows.clone()))?;

        let model_accuracy = Gauge::with_opts(Opts::new(
            "marketpulse_model_accuracy",
            "Holdout accuracy of the latest direction model",
        ))?;
        registry.register(Box::new(model_accuracy.clone()))?;

        let probability_up = Gauge::with_opts(Opts::new(
            "marketpulse_probability_up",
            "Latest predicted probability of an up move",
        ))?;
        registry.register(Box::new(probability_up.clone()))?;

        let pipeline_steps_total = CounterVec::new(
            Opts::new(
                "marketpulse_pipeline_steps_total",
                "Update pipeline steps by outcome",
            ),
            &["step", "outcome"],
        )?;
        registry.register(Box::new(pipeline_steps_total.clone()))?;

        let news_annotated_total = Counter::with_opts(Opts::new(
            "marketpulse_news_annotated_total",
            "News articles annotated",
        ))?;
        registry.register(Box::new(news_annotated_total.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "marketpulse_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let api_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "marketpulse_api_latency_seconds",
                "API handler latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(api_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            observations_ingested_total,
            feed_failures_total,
            feature_rows,
            model_accuracy,
            probability_up,
            pipeline_steps_total,
            news_annotated_total,
            uptime_seconds,
            api_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_ingested(&self, feed: &str, count: usize) {
        self.observations_ingested_total
            .with_label_values(&[feed])
            .inc_by(count as f64);
    }

    pub fn inc_feed_failure(&self, feed: &str) {
        self.feed_failures_total.with_label_values(&[feed]).inc();
    }

    pub fn record_step(&self, step: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        self.pipeline_steps_total
            .with_label_values(&[step, outcome])
            .inc();
    }

    /// Start timing an API endpoint; the sample is recorded when the guard drops.
    pub fn time_endpoint(&self, endpoint: &str) -> LatencyGuard {
        LatencyGuard::new(self.api_latency_seconds.clone(), endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.feature_rows.set(12.0);
        let output = metrics.render();
        assert!(output.contains("marketpulse_feature_rows 12"));
    }

    #[test]
    fn test_feed_counters() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_ingested("fred", 40);
        metrics.inc_feed_failure("csv");
        metrics.record_step("train", false);
        let output = metrics.render();
        assert!(output.contains("marketpulse_observations_ingested_total{feed=\"fred\"} 40"));
        assert!(output.contains("marketpulse_feed_failures_total"));
        assert!(output.contains("outcome=\"failed\""));
    }

    #[test]
    fn test_endpoint_timer_records_sample() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        {
            let _timer = metrics.time_endpoint("health");
        }
        let count = metrics
            .api_latency_seconds
            .with_label_values(&["health", "ok"])
            .get_sample_count();
        assert_eq!(count, 1);
    }
}
