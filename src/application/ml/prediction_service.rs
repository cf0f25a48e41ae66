use super::predictor::DirectionPredictor;
use super::smartcore_predictor::SmartcoreDirectionModel;
use crate::domain::errors::PredictionError;
use crate::domain::ml::extract_feature_vector;
use crate::domain::repositories::{
    FeatureFrameRepository, ModelArtifactRepository, PredictionRepository,
};
use crate::domain::types::Prediction;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Latest direction call as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionPrediction {
    pub date: NaiveDate,
    pub probability_up: f64,
    pub label: u8,
    pub features: BTreeMap<String, f64>,
    pub model_id: i64,
}

pub struct PredictionService {
    frames: Arc<dyn FeatureFrameRepository>,
    artifacts: Arc<dyn ModelArtifactRepository>,
    predictions: Arc<dyn PredictionRepository>,
    model_name: String,
}

impl PredictionService {
    pub fn new(
        frames: Arc<dyn FeatureFrameRepository>,
        artifacts: Arc<dyn ModelArtifactRepository>,
        predictions: Arc<dyn PredictionRepository>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            frames,
            artifacts,
            predictions,
            model_name: model_name.into(),
        }
    }

    /// Predict for the latest FeatureFrame row with the latest artifact.
    ///
    /// The feature vector follows the column list stored in the artifact. The
    /// result is cached per (model, date).
    pub async fn predict_latest_direction(&self) -> Result<DirectionPrediction, PredictionError> {
        let row = self
            .frames
            .latest()
            .await?
            .ok_or(PredictionError::NoFeatureRows)?;

        let artifact = self
            .artifacts
            .latest_by_name(&self.model_name)
            .await?
            .ok_or_else(|| PredictionError::NoArtifact {
                name: self.model_name.clone(),
            })?;

        let model = SmartcoreDirectionModel::from_bytes(&artifact.data).map_err(|e| {
            PredictionError::CorruptArtifact {
                id: artifact.id,
                reason: e.to_string(),
            }
        })?;
        debug!(
            "Loaded {} artifact {} ({} columns)",
            model.name(),
            artifact.id,
            model.columns().len()
        );

        let vector = extract_feature_vector(&row, model.columns())?;
        let probability_up = model
            .predict_proba(&vector)
            .map_err(PredictionError::Inference)?;
        let label = u8::from(probability_up > 0.5);

        let details = serde_json::to_value(&row.features).map_err(anyhow::Error::from)?;
        self.predictions
            .upsert(&Prediction {
                model_id: artifact.id,
                date: row.date,
                probability_up,
                label,
                details,
            })
            .await?;

        info!(
            "Direction for {}: p_up={:.3} label={} (model {})",
            row.date, probability_up, label, artifact.id
        );

        Ok(DirectionPrediction {
            date: row.date,
            probability_up,
            label,
            features: row.features,
            model_id: artifact.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FeatureError;
    use crate::domain::ml::FEATURE_NAMES;
    use crate::domain::types::{FeatureRow, NewModelArtifact};
    use crate::infrastructure::repositories::in_memory::{
        InMemoryFeatureFrameRepository, InMemoryModelArtifactRepository,
        InMemoryPredictionRepository,
    };
    use chrono::Utc;

    const NAME: &str = "spx_direction_logreg";

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn full_row(date: NaiveDate, scale: f64) -> FeatureRow {
        let mut row = FeatureRow::empty(date);
        for (j, name) in FEATURE_NAMES.iter().enumerate() {
            row.features.insert(name.to_string(), scale * (j as f64 + 1.0));
        }
        row
    }

    fn trained_blob() -> Vec<u8> {
        let columns: Vec<String> = FEATURE_NAMES.iter().map(|c| c.to_string()).collect();
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| (0..columns.len()).map(|j| (i * (j + 1)) as f64 + (i % 4) as f64).collect())
            .collect();
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i % 4 >= 2)).collect();
        SmartcoreDirectionModel::fit(columns, &rows, &labels)
            .unwrap()
            .to_bytes()
            .unwrap()
    }

    struct Fixture {
        frames: Arc<InMemoryFeatureFrameRepository>,
        artifacts: Arc<InMemoryModelArtifactRepository>,
        predictions: Arc<InMemoryPredictionRepository>,
        service: PredictionService,
    }

    fn fixture() -> Fixture {
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        let artifacts = Arc::new(InMemoryModelArtifactRepository::new());
        let predictions = Arc::new(InMemoryPredictionRepository::new());
        let service = PredictionService::new(
            frames.clone(),
            artifacts.clone(),
            predictions.clone(),
            NAME,
        );
        Fixture {
            frames,
            artifacts,
            predictions,
            service,
        }
    }

    async fn store_artifact(f: &Fixture, data: Vec<u8>) -> i64 {
        f.artifacts
            .insert(&NewModelArtifact {
                name: NAME.to_string(),
                data,
                created_at: Utc::now(),
                metrics: serde_json::json!({}),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_no_rows_and_no_artifact() {
        let f = fixture();
        assert!(matches!(
            f.service.predict_latest_direction().await,
            Err(PredictionError::NoFeatureRows)
        ));

        f.frames.upsert(&full_row(d(2), 1.0)).await.unwrap();
        let err = f.service.predict_latest_direction().await.unwrap_err();
        assert!(matches!(err, PredictionError::NoArtifact { .. }));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_predicts_latest_row_and_caches() {
        let f = fixture();
        f.frames.upsert(&full_row(d(2), 1.0)).await.unwrap();
        f.frames.upsert(&full_row(d(3), 2.0)).await.unwrap();
        let model_id = store_artifact(&f, trained_blob()).await;

        let result = f.service.predict_latest_direction().await.unwrap();
        assert_eq!(result.date, d(3));
        assert_eq!(result.model_id, model_id);
        assert!((0.0..=1.0).contains(&result.probability_up));
        assert_eq!(result.label, u8::from(result.probability_up > 0.5));
        assert_eq!(result.features.len(), FEATURE_NAMES.len());

        let cached = f.predictions.find(model_id, d(3)).await.unwrap().unwrap();
        assert_eq!(cached.probability_up, result.probability_up);
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let f = fixture();
        let mut row = full_row(d(2), 1.0);
        row.features.remove("vix_close");
        f.frames.upsert(&row).await.unwrap();
        store_artifact(&f, trained_blob()).await;

        match f.service.predict_latest_direction().await {
            Err(PredictionError::MissingFeature(FeatureError::MissingFeature { column, date })) => {
                assert_eq!(column, "vix_close");
                assert_eq!(date, d(2));
            }
            other => panic!("expected missing feature, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_corrupt_artifact() {
        let f = fixture();
        f.frames.upsert(&full_row(d(2), 1.0)).await.unwrap();
        let id = store_artifact(&f, b"garbage".to_vec()).await;

        match f.service.predict_latest_direction().await {
            Err(PredictionError::CorruptArtifact { id: got, .. }) => assert_eq!(got, id),
            other => panic!("expected corrupt artifact, got {:?}", other),
        }
    }
}
