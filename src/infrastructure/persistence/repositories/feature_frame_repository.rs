use crate::domain::repositories::FeatureFrameRepository;
use crate::domain::types::FeatureRow;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::info;

pub struct SqliteFeatureFrameRepository {
    pool: SqlitePool,
}

impl SqliteFeatureFrameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn write_row<'e, E>(executor: E, row: &FeatureRow) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let features_json =
            serde_json::to_string(&row.features).context("Failed to encode features")?;

        sqlx::query(
            r#"
            INSERT INTO feature_frames (date, features_json, target, label)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                features_json = excluded.features_json,
                target = excluded.target,
                label = excluded.label
            "#,
        )
        .bind(row.date)
        .bind(features_json)
        .bind(row.target)
        .bind(row.label.map(i64::from))
        .execute(executor)
        .await
        .with_context(|| format!("Failed to upsert feature frame {}", row.date))?;

        Ok(())
    }

    fn map_row(row: &SqliteRow) -> Result<FeatureRow> {
        let features_json: String = row.try_get("features_json")?;
        let label: Option<i64> = row.try_get("label")?;
        Ok(FeatureRow {
            date: row.try_get("date")?,
            features: serde_json::from_str(&features_json)
                .context("Corrupt features_json in feature_frames")?,
            target: row.try_get("target")?,
            label: label.map(|l| u8::from(l != 0)),
        })
    }
}

#[async_trait]
impl FeatureFrameRepository for SqliteFeatureFrameRepository {
    async fn upsert(&self, row: &FeatureRow) -> Result<()> {
        Self::write_row(&self.pool, row).await
    }

    async fn upsert_many(&self, rows: &[FeatureRow]) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open feature rebuild transaction")?;

        for row in rows {
            Self::write_row(&mut *tx, row).await?;
        }

        tx.commit()
            .await
            .context("Failed to commit feature rebuild")?;

        info!("Committed {} feature frames", rows.len());
        Ok(rows.len())
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<FeatureRow>> {
        let row = sqlx::query(
            "SELECT date, features_json, target, label FROM feature_frames WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load feature frame")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn latest(&self) -> Result<Option<FeatureRow>> {
        let row = sqlx::query(
            "SELECT date, features_json, target, label FROM feature_frames ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load latest feature frame")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn labeled(&self) -> Result<Vec<FeatureRow>> {
        let rows = sqlx::query(
            r#"
            SELECT date, features_json, target, label
            FROM feature_frames
            WHERE label IS NOT NULL
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load labeled feature frames")?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM feature_frames")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }
}
