use crate::domain::repositories::NewsRepository;
use crate::domain::types::{ArticleAnnotation, NewArticle, NewsArticle};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const ARTICLE_COLUMNS: &str = "id, source, title, url, published_at, tickers_json, raw_text, \
     summary, sentiment_label, sentiment_score, topics, created_at";

pub struct SqliteNewsRepository {
    pool: SqlitePool,
}

impl SqliteNewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<NewsArticle> {
        let tickers_json: String = row.try_get("tickers_json")?;
        Ok(NewsArticle {
            id: row.try_get("id")?,
            source: row.try_get("source")?,
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            published_at: row.try_get("published_at")?,
            tickers: serde_json::from_str(&tickers_json).unwrap_or_default(),
            raw_text: row.try_get("raw_text")?,
            summary: row.try_get("summary")?,
            sentiment_label: row.try_get("sentiment_label")?,
            sentiment_score: row.try_get("sentiment_score")?,
            topics: row.try_get("topics")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl NewsRepository for SqliteNewsRepository {
    async fn upsert(&self, article: &NewArticle) -> Result<NewsArticle> {
        let tickers_json = serde_json::to_string(&article.tickers)?;

        sqlx::query(
            r#"
            INSERT INTO news_articles (source, title, url, published_at, tickers_json, raw_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                source = excluded.source,
                title = excluded.title,
                published_at = excluded.published_at,
                tickers_json = excluded.tickers_json,
                raw_text = excluded.raw_text
            "#,
        )
        .bind(&article.source)
        .bind(&article.title)
        .bind(&article.url)
        .bind(article.published_at)
        .bind(tickers_json)
        .bind(&article.raw_text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to upsert news article")?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM news_articles WHERE url = ?",
            ARTICLE_COLUMNS
        ))
        .bind(&article.url)
        .fetch_one(&self.pool)
        .await
        .context("Failed to reload news article")?;

        Self::map_row(&row)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<NewsArticle>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM news_articles ORDER BY published_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load latest news")?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn unannotated(&self, limit: usize) -> Result<Vec<NewsArticle>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM news_articles WHERE sentiment_label = '' \
             ORDER BY published_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load unannotated news")?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn save_annotation(&self, id: i64, annotation: &ArticleAnnotation) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE news_articles
            SET summary = ?, sentiment_label = ?, sentiment_score = ?, topics = ?
            WHERE id = ?
            "#,
        )
        .bind(&annotation.summary)
        .bind(&annotation.sentiment_label)
        .bind(annotation.sentiment_score)
        .bind(&annotation.topics)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to save article annotation")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("News article {} not found", id);
        }
        Ok(())
    }
}
