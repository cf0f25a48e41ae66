use super::lookup::PointInTimeLookup;
use crate::domain::features::compute_feature_row;
use crate::domain::repositories::FeatureFrameRepository;
use crate::domain::series::{self, TRACKED_SERIES};
use crate::domain::types::FeatureRow;
use anyhow::Result;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a bulk rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildReport {
    Built {
        start: NaiveDate,
        end: NaiveDate,
        rows: usize,
    },
    /// `SPX_CLOSE` is unknown or empty; nothing was written.
    NoPrimaryObservations,
}

/// Derives and stores FeatureFrame rows from the observation store.
pub struct FeatureBuilder {
    lookup: PointInTimeLookup,
    frames: Arc<dyn FeatureFrameRepository>,
}

impl FeatureBuilder {
    pub fn new(lookup: PointInTimeLookup, frames: Arc<dyn FeatureFrameRepository>) -> Self {
        Self { lookup, frames }
    }

    /// Compute and upsert the row for `date`. Running it twice yields the same row.
    pub async fn build_features_for_date(&self, date: NaiveDate) -> Result<FeatureRow> {
        // Tomorrow's close is the only value read past `date`; it feeds the label.
        let horizon = date.checked_add_days(Days::new(1)).unwrap_or(date);
        let history = self.lookup.load_history(TRACKED_SERIES, Some(horizon)).await?;

        let row = compute_feature_row(&history, date);
        self.frames.upsert(&row).await?;
        Ok(row)
    }

    /// Rebuild one row per calendar day between the first and last `SPX_CLOSE`
    /// observation, inclusive, committing the whole run atomically.
    pub async fn build_features_for_all_dates(&self) -> Result<BuildReport> {
        let history = self.lookup.load_history(TRACKED_SERIES, None).await?;

        let Some((start, end)) = history.date_range(series::SPX_CLOSE) else {
            warn!(
                "No {} observations found. Skipping feature build.",
                series::SPX_CLOSE
            );
            return Ok(BuildReport::NoPrimaryObservations);
        };

        info!("Building features from {} to {}", start, end);

        let rows: Vec<FeatureRow> = start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| compute_feature_row(&history, day))
            .collect();

        let written = self.frames.upsert_many(&rows).await?;
        info!("Feature build complete: {} rows", written);

        Ok(BuildReport::Built {
            start,
            end,
            rows: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::SeriesRepository;
    use crate::domain::series::feature;
    use crate::domain::types::{Frequency, NewSeries, Observation};
    use crate::domain::repositories::ObservationRepository;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryFeatureFrameRepository, InMemoryMarketStore,
    };

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn put(store: &InMemoryMarketStore, code: &str, points: &[(NaiveDate, f64)]) {
        let series = store
            .get_or_create(&NewSeries::new(code, code, Frequency::Daily, "TEST"))
            .await
            .unwrap();
        for (date, value) in points {
            store
                .upsert(series.id, &Observation::new(*date, *value))
                .await
                .unwrap();
        }
    }

    fn builder(store: InMemoryMarketStore) -> (FeatureBuilder, Arc<InMemoryFeatureFrameRepository>) {
        let frames = Arc::new(InMemoryFeatureFrameRepository::new());
        let builder = FeatureBuilder::new(PointInTimeLookup::new(Arc::new(store)), frames.clone());
        (builder, frames)
    }

    #[tokio::test]
    async fn test_build_for_date_is_idempotent() {
        let store = InMemoryMarketStore::new();
        put(&store, series::SPX_CLOSE, &[(d(2024, 1, 2), 100.0), (d(2024, 1, 3), 101.0)]).await;
        let (builder, frames) = builder(store);

        let first = builder.build_features_for_date(d(2024, 1, 2)).await.unwrap();
        let second = builder.build_features_for_date(d(2024, 1, 2)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(frames.count().await.unwrap(), 1);
        assert_eq!(first.label, Some(1));
        assert!((first.target.unwrap() - 0.01).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_bulk_build_covers_calendar_days() {
        let store = InMemoryMarketStore::new();
        put(&store, series::SPX_CLOSE, &[(d(2024, 1, 5), 100.0), (d(2024, 1, 8), 99.0)]).await;
        put(&store, series::VIX, &[(d(2024, 1, 4), 13.0)]).await;
        let (builder, frames) = builder(store);

        let report = builder.build_features_for_all_dates().await.unwrap();
        assert_eq!(
            report,
            BuildReport::Built {
                start: d(2024, 1, 5),
                end: d(2024, 1, 8),
                rows: 4
            }
        );

        // Weekend rows carry Friday's close forward
        let saturday = frames.find_by_date(d(2024, 1, 6)).await.unwrap().unwrap();
        assert_eq!(saturday.feature(feature::SPX_CLOSE), Some(100.0));
        assert_eq!(saturday.feature(feature::VIX_CLOSE), Some(13.0));
        assert_eq!(saturday.feature(feature::SPX_RET_1D), Some(0.0));

        let sunday = frames.find_by_date(d(2024, 1, 7)).await.unwrap().unwrap();
        assert_eq!(sunday.label, Some(0));

        let last = frames.find_by_date(d(2024, 1, 8)).await.unwrap().unwrap();
        assert!(last.feature(feature::SPX_RET_1D).unwrap() < 0.0);
        assert_eq!(last.target, Some(0.0));
    }

    #[tokio::test]
    async fn test_bulk_build_without_primary_series_is_noop() {
        let store = InMemoryMarketStore::new();
        put(&store, series::VIX, &[(d(2024, 1, 4), 13.0)]).await;
        let (builder, frames) = builder(store);

        let report = builder.build_features_for_all_dates().await.unwrap();
        assert_eq!(report, BuildReport::NoPrimaryObservations);
        assert_eq!(frames.count().await.unwrap(), 0);
    }
}
