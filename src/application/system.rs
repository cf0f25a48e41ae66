use anyhow::Result;
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::{
    composite::CompositeService,
    features::{FeatureBuilder, PointInTimeLookup},
    ingestion::IngestionService,
    ml::{DirectionTrainer, PredictionService, TrainingSettings},
    news::NewsService,
    pipeline::UpdatePipeline,
};
use crate::config::Config;
use crate::domain::ports::{NewsFeed, ObservationFeed};
use crate::domain::repositories::{
    FeatureFrameRepository, ModelArtifactRepository, NewsRepository, ObservationRepository,
    PredictionRepository, SeriesRepository,
};
use crate::infrastructure::core::{HttpClientFactory, HttpClientSettings};
use crate::infrastructure::feeds::{default_fred_series, CsvMarketFeed, FredFeed};
use crate::infrastructure::news::{RssNewsFeed, VaderArticleAnnotator};
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::{
    SqliteFeatureFrameRepository, SqliteModelArtifactRepository, SqliteNewsRepository,
    SqliteObservationRepository, SqlitePredictionRepository, SqliteSeriesRepository,
};

/// Wired services over one SQLite database. Shared by the CLI and the server.
pub struct Application {
    pub config: Config,
    pub database: Database,
    pub metrics: Metrics,
    pub http_client: ClientWithMiddleware,

    pub series: Arc<dyn SeriesRepository>,
    pub observations: Arc<dyn ObservationRepository>,
    pub frames: Arc<dyn FeatureFrameRepository>,
    pub artifacts: Arc<dyn ModelArtifactRepository>,
    pub predictions: Arc<dyn PredictionRepository>,
    pub articles: Arc<dyn NewsRepository>,

    pub lookup: PointInTimeLookup,
    pub ingestion: Arc<IngestionService>,
    pub feature_builder: Arc<FeatureBuilder>,
    pub composite: Arc<CompositeService>,
    pub trainer: Arc<DirectionTrainer>,
    pub predictor: Arc<PredictionService>,
    pub news: Arc<NewsService>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building MarketPulse application ({})", config.database.url);
        let database = Database::new(&config.database.url).await?;
        Self::with_database(config, database)
    }

    /// Wire services over an already opened database.
    pub fn with_database(config: Config, database: Database) -> Result<Self> {
        let pool = database.pool.clone();
        let series: Arc<dyn SeriesRepository> = Arc::new(SqliteSeriesRepository::new(pool.clone()));
        let observations: Arc<dyn ObservationRepository> =
            Arc::new(SqliteObservationRepository::new(pool.clone()));
        let frames: Arc<dyn FeatureFrameRepository> =
            Arc::new(SqliteFeatureFrameRepository::new(pool.clone()));
        let artifacts: Arc<dyn ModelArtifactRepository> =
            Arc::new(SqliteModelArtifactRepository::new(pool.clone()));
        let predictions: Arc<dyn PredictionRepository> =
            Arc::new(SqlitePredictionRepository::new(pool.clone()));
        let articles: Arc<dyn NewsRepository> = Arc::new(SqliteNewsRepository::new(pool));

        let lookup = PointInTimeLookup::new(observations.clone());
        let ingestion = Arc::new(IngestionService::new(series.clone(), observations.clone()));
        let feature_builder = Arc::new(FeatureBuilder::new(lookup.clone(), frames.clone()));
        let composite = Arc::new(CompositeService::new(
            lookup.clone(),
            frames.clone(),
            config.composite.heat.clone(),
            config.composite.risk.clone(),
        ));
        let trainer = Arc::new(DirectionTrainer::new(
            frames.clone(),
            artifacts.clone(),
            TrainingSettings {
                model_name: config.model.model_name.clone(),
                test_fraction: config.model.test_fraction,
                seed: config.model.seed,
            },
        ));
        let predictor = Arc::new(PredictionService::new(
            frames.clone(),
            artifacts.clone(),
            predictions.clone(),
            config.model.model_name.clone(),
        ));
        let news = Arc::new(NewsService::new(
            articles.clone(),
            Arc::new(VaderArticleAnnotator::default()),
        ));

        let http_client = HttpClientFactory::create_client(HttpClientSettings {
            timeout: Duration::from_secs(config.feeds.http_timeout_secs),
            max_retries: config.feeds.http_max_retries,
            ..HttpClientSettings::default()
        });
        let metrics = Metrics::new()?;

        Ok(Self {
            config,
            database,
            metrics,
            http_client,
            series,
            observations,
            frames,
            artifacts,
            predictions,
            articles,
            lookup,
            ingestion,
            feature_builder,
            composite,
            trainer,
            predictor,
            news,
        })
    }

    /// `None` when no FRED key is configured.
    pub fn fred_feed(&self) -> Option<FredFeed> {
        let Some(api_key) = self.config.feeds.fred_api_key.as_deref() else {
            warn!("FRED_API_KEY is not set; skipping FRED feed");
            return None;
        };
        Some(FredFeed::new(
            self.http_client.clone(),
            &self.config.feeds.fred_base_url,
            api_key,
            default_fred_series(),
        ))
    }

    pub fn market_feeds(&self) -> Vec<CsvMarketFeed> {
        vec![
            CsvMarketFeed::spy(self.config.feeds.spy_csv_path.clone()),
            CsvMarketFeed::vix(self.config.feeds.vix_csv_path.clone()),
        ]
    }

    pub fn news_feeds(&self) -> Vec<RssNewsFeed> {
        self.config
            .feeds
            .rss_sources
            .iter()
            .map(|source| {
                RssNewsFeed::new(
                    &source.name,
                    &source.url,
                    self.http_client.clone(),
                    self.config.feeds.news_max_items,
                )
            })
            .collect()
    }

    /// Pipeline over every configured feed.
    pub fn update_pipeline(&self) -> UpdatePipeline {
        let mut pipeline = UpdatePipeline::new(
            self.ingestion.clone(),
            self.feature_builder.clone(),
            self.trainer.clone(),
            self.news.clone(),
            self.config.model.annotate_limit,
        )
        .with_metrics(self.metrics.clone());

        if let Some(fred) = self.fred_feed() {
            pipeline = pipeline.with_observation_feed(Arc::new(fred) as Arc<dyn ObservationFeed>);
        }
        for feed in self.market_feeds() {
            pipeline = pipeline.with_observation_feed(Arc::new(feed) as Arc<dyn ObservationFeed>);
        }
        for feed in self.news_feeds() {
            pipeline = pipeline.with_news_feed(Arc::new(feed) as Arc<dyn NewsFeed>);
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::from_lookup(&|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "NEWS_RSS_FEEDS" => Some("Wire=https://wire.test/rss".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_wires_feeds_from_config() {
        let app = Application::build(test_config()).await.unwrap();
        assert!(app.fred_feed().is_none());
        assert_eq!(app.market_feeds().len(), 2);
        assert_eq!(app.news_feeds().len(), 1);
        assert_eq!(app.frames.count().await.unwrap(), 0);
    }
}
