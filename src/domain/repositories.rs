//! Repository Pattern Abstractions
//!
//! Storage contracts for the observation store, the feature table, the model
//! artifact store, the prediction cache and news articles.
//!
//! # Design
//!
//! - Every observation write is an independent upsert keyed by (series, date).
//! - Feature rows are upserted by date. `upsert_many` writes all rows of a
//!   batch atomically.
//! - Model artifacts are append-only.
//!
//! Two implementations exist: SQLite (`infrastructure::persistence`) and
//! in-memory (`infrastructure::repositories`).

use crate::domain::types::{
    ArticleAnnotation, FeatureRow, ModelArtifact, NewArticle, NewModelArtifact, NewSeries,
    NewsArticle, Observation, Prediction, Series,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Return the series with this code, creating it from the descriptor if absent.
    async fn get_or_create(&self, series: &NewSeries) -> Result<Series>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Series>>;

    async fn list(&self) -> Result<Vec<Series>>;
}

#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Insert or replace the value for (series, date).
    async fn upsert(&self, series_id: i64, observation: &Observation) -> Result<()>;

    /// Most recent observation with `date <= as_of`. `None` for unknown codes.
    async fn latest_on_or_before(&self, code: &str, as_of: NaiveDate)
    -> Result<Option<Observation>>;

    /// All observations of a series, ascending by date.
    async fn history(&self, code: &str) -> Result<Vec<Observation>>;

    /// Observations with `date <= until`, ascending by date.
    async fn history_until(&self, code: &str, until: NaiveDate) -> Result<Vec<Observation>>;

    /// First and last observation dates of a series.
    async fn date_range(&self, code: &str) -> Result<Option<(NaiveDate, NaiveDate)>>;
}

#[async_trait]
pub trait FeatureFrameRepository: Send + Sync {
    async fn upsert(&self, row: &FeatureRow) -> Result<()>;

    /// Upsert all rows in a single transaction.
    async fn upsert_many(&self, rows: &[FeatureRow]) -> Result<usize>;

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<FeatureRow>>;

    async fn latest(&self) -> Result<Option<FeatureRow>>;

    /// Rows with a label, ascending by date.
    async fn labeled(&self) -> Result<Vec<FeatureRow>>;

    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait ModelArtifactRepository: Send + Sync {
    /// Append a new artifact and return it with its assigned id.
    async fn insert(&self, artifact: &NewModelArtifact) -> Result<ModelArtifact>;

    /// Latest artifact for `name` by creation timestamp (ties: highest id).
    async fn latest_by_name(&self, name: &str) -> Result<Option<ModelArtifact>>;

    async fn count_by_name(&self, name: &str) -> Result<usize>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn upsert(&self, prediction: &Prediction) -> Result<()>;

    async fn find(&self, model_id: i64, date: NaiveDate) -> Result<Option<Prediction>>;
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert by url, or refresh raw fields of an existing article (annotations kept).
    async fn upsert(&self, article: &NewArticle) -> Result<NewsArticle>;

    async fn latest(&self, limit: usize) -> Result<Vec<NewsArticle>>;

    /// Most recent articles without a sentiment label.
    async fn unannotated(&self, limit: usize) -> Result<Vec<NewsArticle>>;

    async fn save_annotation(&self, id: i64, annotation: &ArticleAnnotation) -> Result<()>;
}
