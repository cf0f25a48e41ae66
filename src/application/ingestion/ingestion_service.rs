use crate::domain::ports::ObservationFeed;
use crate::domain::repositories::{ObservationRepository, SeriesRepository};
use crate::domain::types::SeriesBatch;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Rows stored per series code during one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub feed: String,
    pub stored: BTreeMap<String, usize>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.stored.values().sum()
    }
}

/// Writes feed batches into the observation store.
///
/// Each observation is an independent upsert, so a failure part-way leaves
/// only complete rows behind and a re-run converges on the same state.
pub struct IngestionService {
    series: Arc<dyn SeriesRepository>,
    observations: Arc<dyn ObservationRepository>,
}

impl IngestionService {
    pub fn new(
        series: Arc<dyn SeriesRepository>,
        observations: Arc<dyn ObservationRepository>,
    ) -> Self {
        Self {
            series,
            observations,
        }
    }

    pub async fn store_batch(&self, batch: &SeriesBatch) -> Result<usize> {
        let series = self.series.get_or_create(&batch.series).await?;
        for observation in &batch.observations {
            self.observations
                .upsert(series.id, observation)
                .await
                .with_context(|| format!("Failed to store {} at {}", series.code, observation.date))?;
        }
        info!(
            " -> stored {} rows for {}",
            batch.observations.len(),
            series.code
        );
        Ok(batch.observations.len())
    }

    pub async fn ingest(&self, feed: &dyn ObservationFeed) -> Result<IngestReport> {
        info!("Running feed {}", feed.name());
        let batches = feed.fetch().await?;

        let mut report = IngestReport {
            feed: feed.name().to_string(),
            ..IngestReport::default()
        };
        for batch in &batches {
            let count = self.store_batch(batch).await?;
            *report.stored.entry(batch.series.code.clone()).or_insert(0) += count;
        }
        info!("Feed {} stored {} observations", feed.name(), report.total());
        Ok(report)
    }
}
