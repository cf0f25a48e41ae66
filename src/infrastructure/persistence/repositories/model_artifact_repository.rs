use crate::domain::repositories::ModelArtifactRepository;
use crate::domain::types::{ModelArtifact, NewModelArtifact};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub struct SqliteModelArtifactRepository {
    pool: SqlitePool,
}

impl SqliteModelArtifactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<ModelArtifact> {
        let metrics_json: String = row.try_get("metrics_json")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(ModelArtifact {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            data: row.try_get("data")?,
            created_at,
            metrics: serde_json::from_str(&metrics_json).context("Corrupt metrics_json")?,
        })
    }
}

#[async_trait]
impl ModelArtifactRepository for SqliteModelArtifactRepository {
    async fn insert(&self, artifact: &NewModelArtifact) -> Result<ModelArtifact> {
        let metrics_json = serde_json::to_string(&artifact.metrics)?;

        let result = sqlx::query(
            r#"
            INSERT INTO model_artifacts (name, data, created_at, metrics_json)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&artifact.name)
        .bind(&artifact.data)
        .bind(artifact.created_at)
        .bind(metrics_json)
        .execute(&self.pool)
        .await
        .context("Failed to store model artifact")?;

        let id = result.last_insert_rowid();
        info!(
            "Stored model artifact {} (id={}, {} bytes)",
            artifact.name,
            id,
            artifact.data.len()
        );

        Ok(ModelArtifact {
            id,
            name: artifact.name.clone(),
            data: artifact.data.clone(),
            created_at: artifact.created_at,
            metrics: artifact.metrics.clone(),
        })
    }

    async fn latest_by_name(&self, name: &str) -> Result<Option<ModelArtifact>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, data, created_at, metrics_json
            FROM model_artifacts
            WHERE name = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load latest model artifact")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn count_by_name(&self, name: &str) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM model_artifacts WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }
}
