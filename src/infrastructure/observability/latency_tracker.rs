use prometheus::HistogramVec;
use std::time::Instant;

/// Outcome label for an HTTP status code.
pub fn status_outcome(status: u16) -> &'static str {
    match status {
        500.. => "server_error",
        400..=499 => "client_error",
        _ => "ok",
    }
}

/// Times one API call. The sample lands in the `{endpoint, outcome}` series
/// when the guard drops; the outcome stays "ok" unless a status is recorded.
pub struct LatencyGuard {
    start: Instant,
    histogram: HistogramVec,
    endpoint: String,
    outcome: &'static str,
}

impl LatencyGuard {
    pub fn new(histogram: HistogramVec, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            histogram,
            endpoint: endpoint.to_string(),
            outcome: "ok",
        }
    }

    pub fn record_status(&mut self, status: u16) {
        self.outcome = status_outcome(status);
    }

    pub fn outcome(&self) -> &'static str {
        self.outcome
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        self.histogram
            .with_label_values(&[self.endpoint.as_str(), self.outcome])
            .observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::HistogramOpts;

    fn histogram() -> HistogramVec {
        HistogramVec::new(HistogramOpts::new("t_latency", "test"), &["endpoint", "outcome"])
            .unwrap()
    }

    #[test]
    fn test_status_outcome() {
        assert_eq!(status_outcome(200), "ok");
        assert_eq!(status_outcome(202), "ok");
        assert_eq!(status_outcome(404), "client_error");
        assert_eq!(status_outcome(503), "server_error");
    }

    #[test]
    fn test_sample_lands_under_recorded_outcome() {
        let hist = histogram();
        {
            let mut guard = LatencyGuard::new(hist.clone(), "news");
            guard.record_status(503);
            assert_eq!(guard.outcome(), "server_error");
        }
        {
            let _guard = LatencyGuard::new(hist.clone(), "news");
        }

        let count = |outcome: &str| {
            hist.with_label_values(&["news", outcome])
                .get_sample_count()
        };
        assert_eq!(count("server_error"), 1);
        assert_eq!(count("ok"), 1);
        assert_eq!(count("client_error"), 0);
    }
}
