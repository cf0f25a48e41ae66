use super::smartcore_predictor::SmartcoreDirectionModel;
use crate::domain::errors::TrainingError;
use crate::domain::ml::{complete_feature_vector, stratified_split, FEATURE_NAMES};
use crate::domain::repositories::{FeatureFrameRepository, ModelArtifactRepository};
use crate::domain::types::NewModelArtifact;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSettings {
    pub model_name: String,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            model_name: "spx_direction_logreg".to_string(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Summary of a successful training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub model_id: i64,
    pub model_name: String,
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub dropped_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

pub struct DirectionTrainer {
    frames: Arc<dyn FeatureFrameRepository>,
    artifacts: Arc<dyn ModelArtifactRepository>,
    settings: TrainingSettings,
}

impl DirectionTrainer {
    pub fn new(
        frames: Arc<dyn FeatureFrameRepository>,
        artifacts: Arc<dyn ModelArtifactRepository>,
        settings: TrainingSettings,
    ) -> Self {
        Self {
            frames,
            artifacts,
            settings,
        }
    }

    /// Fit on labeled FeatureFrame rows and append a new artifact.
    ///
    /// Every failure happens before the artifact write, so an error leaves the
    /// previously stored model as the latest one.
    pub async fn train_direction_model(&self) -> Result<TrainingReport, TrainingError> {
        let fraction = self.settings.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(TrainingError::InvalidTestFraction(fraction));
        }

        let labeled = self.frames.labeled().await?;
        if labeled.is_empty() {
            return Err(TrainingError::NoLabeledRows);
        }
        info!("Loaded {} labeled FeatureFrame rows", labeled.len());

        let mut rows = Vec::with_capacity(labeled.len());
        let mut labels = Vec::with_capacity(labeled.len());
        let mut dates = Vec::with_capacity(labeled.len());
        for frame in &labeled {
            let (Some(vector), Some(label)) =
                (complete_feature_vector(frame, FEATURE_NAMES), frame.label)
            else {
                continue;
            };
            rows.push(vector);
            labels.push(label);
            dates.push(frame.date);
        }
        let dropped = labeled.len() - rows.len();
        if dropped > 0 {
            warn!("Dropped {} rows with missing features", dropped);
        }
        let (Some(first_date), Some(last_date)) = (dates.first().copied(), dates.last().copied())
        else {
            return Err(TrainingError::NoCompleteRows { dropped });
        };

        let balance = class_balance(&labels);
        if balance.len() < 2 {
            let (label, count) = balance.iter().next().map_or((0, 0), |(l, c)| (*l, *c));
            return Err(TrainingError::DegenerateClasses { label, rows: count });
        }
        if let Some((label, count)) = balance.iter().find(|(_, count)| **count < 2) {
            return Err(TrainingError::InsufficientClassRows {
                label: *label,
                count: *count,
            });
        }

        let split = stratified_split(&labels, fraction, self.settings.seed);
        let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
            idx.iter().map(|i| (rows[*i].clone(), labels[*i])).unzip()
        };
        let (x_train, y_train) = pick(&split.train);
        let (x_test, y_test) = pick(&split.test);

        let columns: Vec<String> = FEATURE_NAMES.iter().map(|c| c.to_string()).collect();
        let model = SmartcoreDirectionModel::fit(columns.clone(), &x_train, &y_train)?;
        let accuracy = model
            .accuracy(&x_test, &y_test)
            .map_err(TrainingError::Fit)?;
        info!(
            "Test accuracy: {:.3} (train={}, test={})",
            accuracy,
            x_train.len(),
            x_test.len()
        );

        let blob = model
            .to_bytes()
            .map_err(|e| TrainingError::Fit(format!("serialization failed: {}", e)))?;

        let metrics = json!({
            "accuracy": accuracy,
            "train_rows": x_train.len(),
            "test_rows": x_test.len(),
            "dropped_rows": dropped,
            "class_balance": balance
                .iter()
                .map(|(label, count)| (label.to_string(), *count))
                .collect::<BTreeMap<String, usize>>(),
            "columns": columns,
            "test_fraction": fraction,
            "seed": self.settings.seed,
            "first_date": first_date,
            "last_date": last_date,
        });

        let stored = self
            .artifacts
            .insert(&NewModelArtifact {
                name: self.settings.model_name.clone(),
                data: blob,
                created_at: Utc::now(),
                metrics,
            })
            .await?;

        Ok(TrainingReport {
            model_id: stored.id,
            model_name: stored.name,
            accuracy,
            train_rows: x_train.len(),
            test_rows: x_test.len(),
            dropped_rows: dropped,
            first_date,
            last_date,
        })
    }
}

fn class_balance(labels: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FeatureRow;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryFeatureFrameRepository, InMemoryModelArtifactRepository,
    };
    use chrono::Days;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn row(i: u64, label: Option<u8>, complete: bool) -> FeatureRow {
        let mut row = FeatureRow::empty(base() + Days::new(i));
        for (j, name) in FEATURE_NAMES.iter().enumerate() {
            if complete || j > 0 {
                row.features
                    .insert(name.to_string(), (i as f64) * (j as f64 + 1.0) + (i % 3) as f64);
            }
        }
        row.label = label;
        row.target = label.map(|l| if l == 1 { 0.01 } else { -0.01 });
        row
    }

    async fn trainer(rows: Vec<FeatureRow>) -> (DirectionTrainer, Arc<InMemoryModelArtifactRepository>) {
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        frames.upsert_many(&rows).await.unwrap();
        let artifacts = Arc::new(InMemoryModelArtifactRepository::new());
        (
            DirectionTrainer::new(frames, artifacts.clone(), TrainingSettings::default()),
            artifacts,
        )
    }

    #[tokio::test]
    async fn test_train_writes_artifact_with_metrics() {
        let rows = (0..30).map(|i| row(i, Some((i % 2) as u8), true)).collect();
        let (trainer, artifacts) = trainer(rows).await;

        let report = trainer.train_direction_model().await.unwrap();
        assert_eq!(report.train_rows + report.test_rows, 30);
        assert_eq!(report.test_rows, 6);
        assert_eq!(report.dropped_rows, 0);

        let stored = artifacts
            .latest_by_name("spx_direction_logreg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, report.model_id);
        assert_eq!(stored.metrics["test_rows"], 6);
        assert_eq!(stored.metrics["class_balance"]["1"], 15);
        assert!(SmartcoreDirectionModel::from_bytes(&stored.data).is_ok());
    }

    #[tokio::test]
    async fn test_no_labeled_rows() {
        let (trainer, artifacts) = trainer(vec![row(0, None, true)]).await;
        assert!(matches!(
            trainer.train_direction_model().await,
            Err(TrainingError::NoLabeledRows)
        ));
        assert_eq!(artifacts.count_by_name("spx_direction_logreg").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_rows_are_dropped() {
        let rows = vec![row(0, Some(1), false), row(1, Some(0), false)];
        let (trainer, _) = trainer(rows).await;
        assert!(matches!(
            trainer.train_direction_model().await,
            Err(TrainingError::NoCompleteRows { dropped: 2 })
        ));
    }

    #[tokio::test]
    async fn test_single_class_is_rejected() {
        let rows = (0..10).map(|i| row(i, Some(1), true)).collect();
        let (trainer, _) = trainer(rows).await;
        assert!(matches!(
            trainer.train_direction_model().await,
            Err(TrainingError::DegenerateClasses { label: 1, rows: 10 })
        ));
    }

    #[tokio::test]
    async fn test_tiny_class_is_rejected() {
        let mut rows: Vec<FeatureRow> = (0..10).map(|i| row(i, Some(1), true)).collect();
        rows.push(row(10, Some(0), true));
        let (trainer, _) = trainer(rows).await;
        assert!(matches!(
            trainer.train_direction_model().await,
            Err(TrainingError::InsufficientClassRows { label: 0, count: 1 })
        ));
    }

    #[tokio::test]
    async fn test_invalid_fraction() {
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        let artifacts = Arc::new(InMemoryModelArtifactRepository::new());
        let trainer = DirectionTrainer::new(
            frames,
            artifacts,
            TrainingSettings {
                test_fraction: 1.0,
                ..TrainingSettings::default()
            },
        );
        assert!(matches!(
            trainer.train_direction_model().await,
            Err(TrainingError::InvalidTestFraction(_))
        ));
    }
}
