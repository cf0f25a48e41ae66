//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementations of the repository traits defined in
//! `domain::repositories`. Used by unit tests and throwaway runs.
//!
//! # Limitations
//!
//! - Data is lost on restart
//! - `upsert_many` is atomic only because the whole batch is written under one lock

use crate::domain::repositories::{
    FeatureFrameRepository, ModelArtifactRepository, NewsRepository, ObservationRepository,
    PredictionRepository, SeriesRepository,
};
use crate::domain::types::{
    ArticleAnnotation, FeatureRow, ModelArtifact, NewArticle, NewModelArtifact, NewSeries,
    NewsArticle, Observation, Prediction, Series,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MarketTables {
    series: BTreeMap<String, Series>,
    observations: HashMap<i64, BTreeMap<NaiveDate, f64>>,
    next_id: i64,
}

impl MarketTables {
    fn values(&self, code: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        let series = self.series.get(code)?;
        self.observations.get(&series.id)
    }
}

/// Series registry and observation store sharing one table set, so that
/// observation lookups by code see series created through either trait.
#[derive(Clone, Default)]
pub struct InMemoryMarketStore {
    tables: Arc<RwLock<MarketTables>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeriesRepository for InMemoryMarketStore {
    async fn get_or_create(&self, series: &NewSeries) -> Result<Series> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.series.get(&series.code) {
            return Ok(existing.clone());
        }
        tables.next_id += 1;
        let created = Series {
            id: tables.next_id,
            code: series.code.clone(),
            name: series.name.clone(),
            frequency: series.frequency,
            source: series.source.clone(),
        };
        tables.series.insert(series.code.clone(), created.clone());
        Ok(created)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Series>> {
        Ok(self.tables.read().await.series.get(code).cloned())
    }

    async fn list(&self) -> Result<Vec<Series>> {
        Ok(self.tables.read().await.series.values().cloned().collect())
    }
}

#[async_trait]
impl ObservationRepository for InMemoryMarketStore {
    async fn upsert(&self, series_id: i64, observation: &Observation) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.series.values().any(|s| s.id == series_id) {
            anyhow::bail!("Unknown series id {}", series_id);
        }
        tables
            .observations
            .entry(series_id)
            .or_default()
            .insert(observation.date, observation.value);
        Ok(())
    }

    async fn latest_on_or_before(
        &self,
        code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Observation>> {
        let tables = self.tables.read().await;
        Ok(tables.values(code).and_then(|values| {
            values
                .range(..=as_of)
                .next_back()
                .map(|(date, value)| Observation::new(*date, *value))
        }))
    }

    async fn history(&self, code: &str) -> Result<Vec<Observation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .values(code)
            .map(|values| {
                values
                    .iter()
                    .map(|(date, value)| Observation::new(*date, *value))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn history_until(&self, code: &str, until: NaiveDate) -> Result<Vec<Observation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .values(code)
            .map(|values| {
                values
                    .range(..=until)
                    .map(|(date, value)| Observation::new(*date, *value))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn date_range(&self, code: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let tables = self.tables.read().await;
        Ok(tables.values(code).and_then(|values| {
            let first = values.keys().next()?;
            let last = values.keys().next_back()?;
            Some((*first, *last))
        }))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryFeatureFrameRepository {
    rows: Arc<RwLock<BTreeMap<NaiveDate, FeatureRow>>>,
}

impl InMemoryFeatureFrameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureFrameRepository for InMemoryFeatureFrameRepository {
    async fn upsert(&self, row: &FeatureRow) -> Result<()> {
        self.rows.write().await.insert(row.date, row.clone());
        Ok(())
    }

    async fn upsert_many(&self, rows: &[FeatureRow]) -> Result<usize> {
        let mut table = self.rows.write().await;
        for row in rows {
            table.insert(row.date, row.clone());
        }
        Ok(rows.len())
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<FeatureRow>> {
        Ok(self.rows.read().await.get(&date).cloned())
    }

    async fn latest(&self) -> Result<Option<FeatureRow>> {
        Ok(self.rows.read().await.values().next_back().cloned())
    }

    async fn labeled(&self) -> Result<Vec<FeatureRow>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.is_labeled())
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryModelArtifactRepository {
    artifacts: Arc<RwLock<Vec<ModelArtifact>>>,
}

impl InMemoryModelArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelArtifactRepository for InMemoryModelArtifactRepository {
    async fn insert(&self, artifact: &NewModelArtifact) -> Result<ModelArtifact> {
        let mut artifacts = self.artifacts.write().await;
        let stored = ModelArtifact {
            id: artifacts.len() as i64 + 1,
            name: artifact.name.clone(),
            data: artifact.data.clone(),
            created_at: artifact.created_at,
            metrics: artifact.metrics.clone(),
        };
        artifacts.push(stored.clone());
        Ok(stored)
    }

    async fn latest_by_name(&self, name: &str) -> Result<Option<ModelArtifact>> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .filter(|a| a.name == name)
            .max_by_key(|a| (a.created_at, a.id))
            .cloned())
    }

    async fn count_by_name(&self, name: &str) -> Result<usize> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .filter(|a| a.name == name)
            .count())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPredictionRepository {
    predictions: Arc<RwLock<HashMap<(i64, NaiveDate), Prediction>>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn upsert(&self, prediction: &Prediction) -> Result<()> {
        self.predictions
            .write()
            .await
            .insert((prediction.model_id, prediction.date), prediction.clone());
        Ok(())
    }

    async fn find(&self, model_id: i64, date: NaiveDate) -> Result<Option<Prediction>> {
        Ok(self.predictions.read().await.get(&(model_id, date)).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryNewsRepository {
    articles: Arc<RwLock<Vec<NewsArticle>>>,
}

impl InMemoryNewsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut articles: Vec<NewsArticle>, limit: usize) -> Vec<NewsArticle> {
        articles.sort_by(|a, b| (b.published_at, b.id).cmp(&(a.published_at, a.id)));
        articles.truncate(limit);
        articles
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn upsert(&self, article: &NewArticle) -> Result<NewsArticle> {
        let mut articles = self.articles.write().await;
        if let Some(existing) = articles.iter_mut().find(|a| a.url == article.url) {
            existing.source = article.source.clone();
            existing.title = article.title.clone();
            existing.published_at = article.published_at;
            existing.tickers = article.tickers.clone();
            existing.raw_text = article.raw_text.clone();
            return Ok(existing.clone());
        }
        let stored = NewsArticle {
            id: articles.len() as i64 + 1,
            source: article.source.clone(),
            title: article.title.clone(),
            url: article.url.clone(),
            published_at: article.published_at,
            tickers: article.tickers.clone(),
            raw_text: article.raw_text.clone(),
            summary: String::new(),
            sentiment_label: String::new(),
            sentiment_score: None,
            topics: String::new(),
            created_at: Utc::now(),
        };
        articles.push(stored.clone());
        Ok(stored)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<NewsArticle>> {
        let articles = self.articles.read().await.clone();
        Ok(Self::newest_first(articles, limit))
    }

    async fn unannotated(&self, limit: usize) -> Result<Vec<NewsArticle>> {
        let articles: Vec<NewsArticle> = self
            .articles
            .read()
            .await
            .iter()
            .filter(|a| !a.is_annotated())
            .cloned()
            .collect();
        Ok(Self::newest_first(articles, limit))
    }

    async fn save_annotation(&self, id: i64, annotation: &ArticleAnnotation) -> Result<()> {
        let mut articles = self.articles.write().await;
        let article = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| anyhow::anyhow!("News article {} not found", id))?;
        article.summary = annotation.summary.clone();
        article.sentiment_label = annotation.sentiment_label.clone();
        article.sentiment_score = Some(annotation.sentiment_score);
        article.topics = annotation.topics.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Frequency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_market_store_as_of_lookup() {
        let store = InMemoryMarketStore::new();
        let vix = store
            .get_or_create(&NewSeries::new("VIX", "VIX", Frequency::Daily, "CSV"))
            .await
            .unwrap();
        store
            .upsert(vix.id, &Observation::new(d(2024, 1, 2), 13.0))
            .await
            .unwrap();
        store
            .upsert(vix.id, &Observation::new(d(2024, 1, 4), 14.0))
            .await
            .unwrap();

        let hit = store.latest_on_or_before("VIX", d(2024, 1, 3)).await.unwrap();
        assert_eq!(hit, Some(Observation::new(d(2024, 1, 2), 13.0)));
        assert!(store
            .latest_on_or_before("VIX", d(2024, 1, 1))
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store.date_range("VIX").await.unwrap(),
            Some((d(2024, 1, 2), d(2024, 1, 4)))
        );
        assert!(store.upsert(99, &Observation::new(d(2024, 1, 2), 1.0)).await.is_err());
    }

    #[tokio::test]
    async fn test_artifacts_latest_prefers_highest_id_on_tie() {
        let repo = InMemoryModelArtifactRepository::new();
        let now = Utc::now();
        for byte in [1u8, 2u8] {
            repo.insert(&NewModelArtifact {
                name: "m".to_string(),
                data: vec![byte],
                created_at: now,
                metrics: serde_json::json!({}),
            })
            .await
            .unwrap();
        }
        let latest = repo.latest_by_name("m").await.unwrap().unwrap();
        assert_eq!(latest.data, vec![2]);
    }
}
