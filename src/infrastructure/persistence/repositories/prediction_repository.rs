use crate::domain::repositories::PredictionRepository;
use crate::domain::types::Prediction;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn upsert(&self, prediction: &Prediction) -> Result<()> {
        let details_json = serde_json::to_string(&prediction.details)?;

        sqlx::query(
            r#"
            INSERT INTO predictions (model_id, date, yhat, label, details_json)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(model_id, date) DO UPDATE SET
                yhat = excluded.yhat,
                label = excluded.label,
                details_json = excluded.details_json
            "#,
        )
        .bind(prediction.model_id)
        .bind(prediction.date)
        .bind(prediction.probability_up)
        .bind(i64::from(prediction.label))
        .bind(details_json)
        .execute(&self.pool)
        .await
        .context("Failed to cache prediction")?;

        Ok(())
    }

    async fn find(&self, model_id: i64, date: NaiveDate) -> Result<Option<Prediction>> {
        let row = sqlx::query_as::<_, (f64, i64, String)>(
            "SELECT yhat, label, details_json FROM predictions WHERE model_id = ? AND date = ?",
        )
        .bind(model_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load cached prediction")?;

        row.map(|(yhat, label, details_json)| {
            Ok(Prediction {
                model_id,
                date,
                probability_up: yhat,
                label: u8::from(label != 0),
                details: serde_json::from_str(&details_json)?,
            })
        })
        .transpose()
    }
}
