use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared database handle. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        let in_memory = db_url.contains(":memory:");

        // Ensure the directory exists if it's a file path
        if !in_memory && let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let mut options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` is a separate database, so keep exactly one.
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Fresh in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Round-trip query used by readiness checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // 1. Series
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS series (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                freq TEXT NOT NULL DEFAULT 'D',
                source TEXT NOT NULL DEFAULT 'FRED'
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create series table")?;

        // 2. Observations, one per (series, date)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS observations (
                series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (series_id, date)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create observations table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_observations_date
            ON observations (date);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create observation index")?;

        // 3. Feature frames, one per date
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feature_frames (
                date DATE PRIMARY KEY,
                features_json TEXT NOT NULL,
                target REAL,
                label INTEGER
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create feature_frames table")?;

        // 4. Model artifacts (append-only)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS model_artifacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                data BLOB NOT NULL,
                created_at DATETIME NOT NULL,
                metrics_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_model_artifacts_name_created
            ON model_artifacts (name, created_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create model_artifacts table")?;

        // 5. Prediction cache
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                model_id INTEGER NOT NULL REFERENCES model_artifacts(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                yhat REAL NOT NULL,
                label INTEGER NOT NULL,
                details_json TEXT NOT NULL,
                PRIMARY KEY (model_id, date)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create predictions table")?;

        // 6. News articles
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news_articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                published_at DATETIME NOT NULL,
                tickers_json TEXT NOT NULL DEFAULT '[]',
                raw_text TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL DEFAULT '',
                sentiment_label TEXT NOT NULL DEFAULT '',
                sentiment_score REAL,
                topics TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_news_published
            ON news_articles (published_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create news_articles table")?;

        info!("Database schema initialized.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_bootstrap() {
        let db = Database::in_memory().await.unwrap();
        db.ping().await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&db.pool)
                .await
                .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        for expected in [
            "feature_frames",
            "model_artifacts",
            "news_articles",
            "observations",
            "predictions",
            "series",
        ] {
            assert!(names.contains(&expected), "missing table {}", expected);
        }
    }
}
