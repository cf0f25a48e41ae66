use crate::domain::repositories::ObservationRepository;
use crate::domain::types::Observation;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

pub struct SqliteObservationRepository {
    pool: SqlitePool,
}

impl SqliteObservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Observation>> {
        rows.into_iter()
            .map(|row| {
                Ok(Observation {
                    date: row.try_get("date")?,
                    value: row.try_get("value")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ObservationRepository for SqliteObservationRepository {
    async fn upsert(&self, series_id: i64, observation: &Observation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO observations (series_id, date, value)
            VALUES (?, ?, ?)
            ON CONFLICT(series_id, date) DO UPDATE SET
                value = excluded.value
            "#,
        )
        .bind(series_id)
        .bind(observation.date)
        .bind(observation.value)
        .execute(&self.pool)
        .await
        .context("Failed to upsert observation")?;

        Ok(())
    }

    async fn latest_on_or_before(
        &self,
        code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Observation>> {
        let row = sqlx::query(
            r#"
            SELECT o.date AS date, o.value AS value
            FROM observations o
            JOIN series s ON s.id = o.series_id
            WHERE s.code = ? AND o.date <= ?
            ORDER BY o.date DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query as-of observation")?;

        Ok(Self::map_rows(row.into_iter().collect())?.pop())
    }

    async fn history(&self, code: &str) -> Result<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.date AS date, o.value AS value
            FROM observations o
            JOIN series s ON s.id = o.series_id
            WHERE s.code = ?
            ORDER BY o.date ASC
            "#,
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load observation history")?;

        Self::map_rows(rows)
    }

    async fn history_until(&self, code: &str, until: NaiveDate) -> Result<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.date AS date, o.value AS value
            FROM observations o
            JOIN series s ON s.id = o.series_id
            WHERE s.code = ? AND o.date <= ?
            ORDER BY o.date ASC
            "#,
        )
        .bind(code)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load observation history")?;

        Self::map_rows(rows)
    }

    async fn date_range(&self, code: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let row = sqlx::query_as::<_, (Option<NaiveDate>, Option<NaiveDate>)>(
            r#"
            SELECT MIN(o.date), MAX(o.date)
            FROM observations o
            JOIN series s ON s.id = o.series_id
            WHERE s.code = ?
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .context("Failed to query observation date range")?;

        Ok(row.0.zip(row.1))
    }
}
