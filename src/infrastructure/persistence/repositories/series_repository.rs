use crate::domain::repositories::SeriesRepository;
use crate::domain::types::{Frequency, NewSeries, Series};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

pub struct SqliteSeriesRepository {
    pool: SqlitePool,
}

impl SqliteSeriesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Series> {
        let freq: String = row.try_get("freq")?;
        Ok(Series {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            frequency: Frequency::from_str(&freq)?,
            source: row.try_get("source")?,
        })
    }
}

#[async_trait]
impl SeriesRepository for SqliteSeriesRepository {
    async fn get_or_create(&self, series: &NewSeries) -> Result<Series> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO series (code, name, freq, source)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(code) DO NOTHING
            "#,
        )
        .bind(&series.code)
        .bind(&series.name)
        .bind(series.frequency.to_string())
        .bind(&series.source)
        .execute(&self.pool)
        .await
        .context("Failed to create series")?;

        if inserted.rows_affected() > 0 {
            debug!("Created series {}", series.code);
        }

        self.find_by_code(&series.code)
            .await?
            .with_context(|| format!("Series {} missing after insert", series.code))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Series>> {
        let row = sqlx::query("SELECT id, code, name, freq, source FROM series WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load series")?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Series>> {
        let rows = sqlx::query("SELECT id, code, name, freq, source FROM series ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list series")?;

        rows.iter().map(Self::map_row).collect()
    }
}
