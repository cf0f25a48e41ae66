use crate::domain::types::{ArticleAnnotation, NewArticle, SeriesBatch};
use anyhow::Result;
use async_trait::async_trait;

/// Source of `(series, date, value)` batches. Transport is up to the implementation.
#[async_trait]
pub trait ObservationFeed: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch every batch this feed provides. Implementations that fetch several
    /// series may skip a failing one and return the rest.
    async fn fetch(&self) -> Result<Vec<SeriesBatch>>;
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_articles(&self) -> Result<Vec<NewArticle>>;
}

/// NLP over article text: sentiment, summary and topics.
pub trait ArticleAnnotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<ArticleAnnotation>;
}
