use crate::domain::ports::{ArticleAnnotator, NewsFeed};
use crate::domain::repositories::NewsRepository;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub annotated: usize,
    pub failed: usize,
}

/// Stores feed articles and runs the injected annotator over pending ones.
pub struct NewsService {
    articles: Arc<dyn NewsRepository>,
    annotator: Arc<dyn ArticleAnnotator>,
}

impl NewsService {
    pub fn new(articles: Arc<dyn NewsRepository>, annotator: Arc<dyn ArticleAnnotator>) -> Self {
        Self {
            articles,
            annotator,
        }
    }

    /// Upsert every article from `feed`, keyed by url. Returns the number stored.
    pub async fn ingest(&self, feed: &dyn NewsFeed) -> Result<usize> {
        let fetched = feed.fetch_articles().await?;
        let mut stored = 0;
        for article in &fetched {
            if article.title.trim().is_empty() || article.url.trim().is_empty() {
                warn!("Skipping entry with missing title/link from {}", feed.name());
                continue;
            }
            self.articles.upsert(article).await?;
            stored += 1;
        }
        info!("{}: stored {} articles", feed.name(), stored);
        Ok(stored)
    }

    /// Annotate up to `limit` of the newest unannotated articles.
    ///
    /// An article whose annotation fails is logged and left pending.
    pub async fn annotate_pending(&self, limit: usize) -> Result<AnnotationReport> {
        let pending = self.articles.unannotated(limit).await?;
        if pending.is_empty() {
            info!("No articles need NLP right now.");
            return Ok(AnnotationReport::default());
        }

        info!("Running NLP on {} articles...", pending.len());
        let mut report = AnnotationReport::default();
        for article in &pending {
            let annotation = match self.annotator.annotate(article.annotation_text()) {
                Ok(annotation) => annotation,
                Err(e) => {
                    warn!("Error processing article {}: {}", article.id, e);
                    report.failed += 1;
                    continue;
                }
            };
            self.articles.save_annotation(article.id, &annotation).await?;
            info!(
                "Updated article {}: {} ({:.2}); topics={}",
                article.id, annotation.sentiment_label, annotation.sentiment_score, annotation.topics
            );
            report.annotated += 1;
        }
        Ok(report)
    }
}
