//! The full refresh: macro feed, market files, feature rebuild, training,
//! news fetch and news NLP.
//!
//! Each step runs regardless of earlier failures. A failed step is logged and
//! recorded in the report; later steps work with whatever data is stored.

use crate::application::features::{BuildReport, FeatureBuilder};
use crate::application::ingestion::IngestionService;
use crate::application::ml::DirectionTrainer;
use crate::application::news::NewsService;
use crate::domain::ports::{NewsFeed, ObservationFeed};
use crate::infrastructure::observability::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub ok: bool,
    pub detail: String,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepOutcome>,
}

impl PipelineReport {
    pub fn failed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.ok)
            .map(|s| s.step.as_str())
            .collect()
    }

    pub fn all_ok(&self) -> bool {
        self.steps.iter().all(|s| s.ok)
    }
}

pub struct UpdatePipeline {
    ingestion: Arc<IngestionService>,
    observation_feeds: Vec<Arc<dyn ObservationFeed>>,
    builder: Arc<FeatureBuilder>,
    trainer: Arc<DirectionTrainer>,
    news: Arc<NewsService>,
    news_feeds: Vec<Arc<dyn NewsFeed>>,
    annotate_limit: usize,
    metrics: Option<Metrics>,
}

impl UpdatePipeline {
    pub fn new(
        ingestion: Arc<IngestionService>,
        builder: Arc<FeatureBuilder>,
        trainer: Arc<DirectionTrainer>,
        news: Arc<NewsService>,
        annotate_limit: usize,
    ) -> Self {
        Self {
            ingestion,
            observation_feeds: Vec::new(),
            builder,
            trainer,
            news,
            news_feeds: Vec::new(),
            annotate_limit,
            metrics: None,
        }
    }

    pub fn with_observation_feed(mut self, feed: Arc<dyn ObservationFeed>) -> Self {
        self.observation_feeds.push(feed);
        self
    }

    pub fn with_news_feed(mut self, feed: Arc<dyn NewsFeed>) -> Self {
        self.news_feeds.push(feed);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn run(&self) -> PipelineReport {
        let mut report = PipelineReport::default();
        info!("Update pipeline started");

        for feed in &self.observation_feeds {
            let started = Instant::now();
            let outcome = self.ingestion.ingest(feed.as_ref()).await;
            if let Some(metrics) = &self.metrics {
                match &outcome {
                    Ok(ingested) => metrics.inc_ingested(feed.name(), ingested.total()),
                    Err(_) => metrics.inc_feed_failure(feed.name()),
                }
            }
            let result = outcome.map(|r| format!("{} observations", r.total()));
            self.record(&mut report, &format!("ingest:{}", feed.name()), started, result);
        }

        let started = Instant::now();
        let built = self.builder.build_features_for_all_dates().await;
        if let (Some(metrics), Ok(BuildReport::Built { rows, .. })) = (&self.metrics, &built) {
            metrics.feature_rows.set(*rows as f64);
        }
        let result = built.map(|r| match r {
            BuildReport::Built { start, end, rows } => {
                format!("{} rows from {} to {}", rows, start, end)
            }
            BuildReport::NoPrimaryObservations => "no SPX observations".to_string(),
        });
        self.record(&mut report, "build_features", started, result);

        let started = Instant::now();
        let trained = self.trainer.train_direction_model().await;
        if let (Some(metrics), Ok(t)) = (&self.metrics, &trained) {
            metrics.model_accuracy.set(t.accuracy);
        }
        let result = trained
            .map(|t| format!("model {} accuracy {:.3}", t.model_id, t.accuracy))
            .map_err(anyhow::Error::from);
        self.record(&mut report, "train", started, result);

        let started = Instant::now();
        let mut fetched = 0usize;
        let mut fetch_errors = Vec::new();
        for feed in &self.news_feeds {
            match self.news.ingest(feed.as_ref()).await {
                Ok(count) => fetched += count,
                Err(e) => {
                    error!("News feed {} failed: {:#}", feed.name(), e);
                    fetch_errors.push(feed.name().to_string());
                }
            }
        }
        let result = if fetch_errors.is_empty() || fetched > 0 {
            Ok(format!("{} articles", fetched))
        } else {
            Err(anyhow::anyhow!("all news feeds failed: {}", fetch_errors.join(", ")))
        };
        self.record(&mut report, "fetch_news", started, result);

        let started = Instant::now();
        let annotated = self.news.annotate_pending(self.annotate_limit).await;
        if let (Some(metrics), Ok(a)) = (&self.metrics, &annotated) {
            metrics.news_annotated_total.inc_by(a.annotated as f64);
        }
        let result = annotated.map(|a| format!("{} annotated, {} failed", a.annotated, a.failed));
        self.record(&mut report, "annotate_news", started, result);

        info!(
            "Update pipeline finished: {}/{} steps ok",
            report.steps.iter().filter(|s| s.ok).count(),
            report.steps.len()
        );
        report
    }

    fn record(
        &self,
        report: &mut PipelineReport,
        step: &str,
        started: Instant,
        result: anyhow::Result<String>,
    ) {
        let elapsed_ms = started.elapsed().as_millis();
        let (ok, detail) = match result {
            Ok(detail) => {
                info!("   ✓ {} completed: {}", step, detail);
                (true, detail)
            }
            Err(e) => {
                error!("   ✗ {} failed: {:#}", step, e);
                (false, format!("{:#}", e))
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_step(step, ok);
        }
        report.steps.push(StepOutcome {
            step: step.to_string(),
            ok,
            detail,
            elapsed_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::features::PointInTimeLookup;
    use crate::application::ml::TrainingSettings;
    use crate::domain::repositories::FeatureFrameRepository;
    use crate::domain::types::{Frequency, NewSeries, Observation, SeriesBatch};
    use crate::infrastructure::news::VaderArticleAnnotator;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryFeatureFrameRepository, InMemoryMarketStore, InMemoryModelArtifactRepository,
        InMemoryNewsRepository,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FailingFeed;

    #[async_trait]
    impl ObservationFeed for FailingFeed {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self) -> Result<Vec<SeriesBatch>> {
            anyhow::bail!("connection refused")
        }
    }

    struct SpxFeed;

    #[async_trait]
    impl ObservationFeed for SpxFeed {
        fn name(&self) -> &str {
            "spx"
        }

        async fn fetch(&self) -> Result<Vec<SeriesBatch>> {
            let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            Ok(vec![SeriesBatch {
                series: NewSeries::new("SPX_CLOSE", "S&P 500 Close", Frequency::Daily, "TEST"),
                observations: vec![
                    Observation::new(d(2), 100.0),
                    Observation::new(d(3), 101.0),
                ],
            }])
        }
    }

    #[tokio::test]
    async fn test_failed_steps_do_not_stop_pipeline() {
        let store = Arc::new(InMemoryMarketStore::new());
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        let artifacts = Arc::new(InMemoryModelArtifactRepository::new());
        let articles = Arc::new(InMemoryNewsRepository::new());

        let ingestion = Arc::new(IngestionService::new(store.clone(), store.clone()));
        let builder = Arc::new(FeatureBuilder::new(
            PointInTimeLookup::new(store.clone()),
            frames.clone(),
        ));
        let trainer = Arc::new(DirectionTrainer::new(
            frames.clone(),
            artifacts.clone(),
            TrainingSettings::default(),
        ));
        let news = Arc::new(NewsService::new(
            articles,
            Arc::new(VaderArticleAnnotator::default()),
        ));
        let metrics = Metrics::new().unwrap();

        let pipeline = UpdatePipeline::new(ingestion, builder, trainer, news, 50)
            .with_observation_feed(Arc::new(FailingFeed))
            .with_observation_feed(Arc::new(SpxFeed))
            .with_metrics(metrics.clone());

        let report = pipeline.run().await;
        let steps: Vec<&str> = report.steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                "ingest:broken",
                "ingest:spx",
                "build_features",
                "train",
                "fetch_news",
                "annotate_news"
            ]
        );
        // Two SPX rows give a single label, which cannot train a model.
        assert_eq!(report.failed_steps(), vec!["ingest:broken", "train"]);
        assert_eq!(frames.count().await.unwrap(), 2);
        assert_eq!(metrics.feature_rows.get(), 2.0);
        assert!(metrics.render().contains("step=\"train\""));
    }
}
