//! Push-based metrics reporter.
//!
//! Periodically prints a JSON snapshot to stdout with a `METRICS_JSON:` prefix
//! so log shippers can filter it. Nothing listens for inbound requests.

use crate::domain::repositories::{FeatureFrameRepository, ModelArtifactRepository};
use crate::infrastructure::observability::metrics::Metrics;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub data: DataSnapshot,
    pub model: Option<ModelSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct DataSnapshot {
    pub feature_rows: usize,
    pub latest_feature_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ModelSnapshot {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub accuracy: Option<f64>,
}

pub struct MetricsReporter {
    frames: Arc<dyn FeatureFrameRepository>,
    artifacts: Arc<dyn ModelArtifactRepository>,
    model_name: String,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(
        frames: Arc<dyn FeatureFrameRepository>,
        artifacts: Arc<dyn ModelArtifactRepository>,
        model_name: &str,
        metrics: Metrics,
        interval_seconds: u64,
    ) -> Self {
        Self {
            frames,
            artifacts,
            model_name: model_name.to_string(),
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds),
        }
    }

    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.collect_snapshot().await {
                Ok(snapshot) => match serde_json::to_string(&snapshot) {
                    Ok(json) => {
                        println!("METRICS_JSON:{}", json);
                        info!(
                            "Feature rows: {} | Model: {} | Uptime: {}s",
                            snapshot.data.feature_rows,
                            snapshot
                                .model
                                .as_ref()
                                .map_or("none".to_string(), |m| m.id.to_string()),
                            snapshot.uptime_seconds
                        );
                    }
                    Err(e) => warn!("Failed to serialize metrics: {}", e),
                },
                Err(e) => warn!("Failed to collect metrics: {}", e),
            }
        }
    }

    async fn collect_snapshot(&self) -> anyhow::Result<MetricsSnapshot> {
        let uptime = self.start_time.elapsed().as_secs();
        let feature_rows = self.frames.count().await?;
        let latest_feature_date = self.frames.latest().await?.map(|row| row.date);
        let model = self
            .artifacts
            .latest_by_name(&self.model_name)
            .await?
            .map(|artifact| ModelSnapshot {
                id: artifact.id,
                name: artifact.name,
                created_at: artifact.created_at.to_rfc3339(),
                accuracy: artifact.metrics.get("accuracy").and_then(|v| v.as_f64()),
            });

        self.metrics.uptime_seconds.set(uptime as f64);
        if let Some(accuracy) = model.as_ref().and_then(|m| m.accuracy) {
            self.metrics.model_accuracy.set(accuracy);
        }

        Ok(MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            data: DataSnapshot {
                feature_rows,
                latest_feature_date,
            },
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{FeatureRow, NewModelArtifact};
    use crate::infrastructure::repositories::in_memory::{
        InMemoryFeatureFrameRepository, InMemoryModelArtifactRepository,
    };

    #[tokio::test]
    async fn test_snapshot_reflects_store() {
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        let artifacts = Arc::new(InMemoryModelArtifactRepository::new());
        let metrics = Metrics::new().expect("Failed to create metrics");
        let reporter =
            MetricsReporter::new(frames.clone(), artifacts.clone(), "m", metrics.clone(), 60);

        let empty = reporter.collect_snapshot().await.unwrap();
        assert_eq!(empty.data.feature_rows, 0);
        assert!(empty.model.is_none());

        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        frames.upsert(&FeatureRow::empty(date)).await.unwrap();
        artifacts
            .insert(&NewModelArtifact {
                name: "m".to_string(),
                data: vec![],
                created_at: chrono::Utc::now(),
                metrics: serde_json::json!({"accuracy": 0.55}),
            })
            .await
            .unwrap();

        let snapshot = reporter.collect_snapshot().await.unwrap();
        assert_eq!(snapshot.data.latest_feature_date, Some(date));
        assert_eq!(snapshot.model.as_ref().and_then(|m| m.accuracy), Some(0.55));
        assert!(metrics.render().contains("marketpulse_model_accuracy 0.55"));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"feature_rows\":1"));
    }
}
