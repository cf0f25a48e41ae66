use crate::domain::history::ObservationHistory;
use crate::domain::repositories::ObservationRepository;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

/// As-of access to the observation store.
///
/// Single lookups go to storage. Bulk work should call [`Self::load_history`]
/// once and evaluate against the in-memory index instead.
#[derive(Clone)]
pub struct PointInTimeLookup {
    observations: Arc<dyn ObservationRepository>,
}

impl PointInTimeLookup {
    pub fn new(observations: Arc<dyn ObservationRepository>) -> Self {
        Self { observations }
    }

    /// Value of the most recent observation of `code` dated on or before `as_of`.
    ///
    /// `Ok(None)` for an unknown series or one with nothing at or before the
    /// date; storage failures are errors.
    pub async fn value_as_of(&self, code: &str, as_of: NaiveDate) -> Result<Option<f64>> {
        Ok(self
            .observations
            .latest_on_or_before(code, as_of)
            .await?
            .map(|obs| obs.value))
    }

    /// Load `codes` into an as-of index, optionally cut at `until` (inclusive).
    pub async fn load_history(
        &self,
        codes: &[&str],
        until: Option<NaiveDate>,
    ) -> Result<ObservationHistory> {
        let mut history = ObservationHistory::new();
        for code in codes {
            let observations = match until {
                Some(until) => self.observations.history_until(code, until).await?,
                None => self.observations.history(code).await?,
            };
            history.insert_series(code, &observations);
        }
        Ok(history)
    }

    pub fn observations(&self) -> &Arc<dyn ObservationRepository> {
        &self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::AsOfSource;
    use crate::domain::repositories::SeriesRepository;
    use crate::domain::types::{Frequency, NewSeries, Observation};
    use crate::infrastructure::repositories::in_memory::InMemoryMarketStore;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn seeded() -> PointInTimeLookup {
        let store = InMemoryMarketStore::new();
        let cpi = store
            .get_or_create(&NewSeries::new("CPI", "CPI", Frequency::Monthly, "FRED"))
            .await
            .unwrap();
        for (date, value) in [(d(2024, 1, 1), 300.0), (d(2024, 2, 1), 302.0)] {
            store.upsert(cpi.id, &Observation::new(date, value)).await.unwrap();
        }
        PointInTimeLookup::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_value_as_of_uses_latest_prior_observation() {
        let lookup = seeded().await;
        assert_eq!(lookup.value_as_of("CPI", d(2024, 1, 31)).await.unwrap(), Some(300.0));
        assert_eq!(lookup.value_as_of("CPI", d(2024, 2, 1)).await.unwrap(), Some(302.0));
        assert_eq!(lookup.value_as_of("CPI", d(2024, 6, 1)).await.unwrap(), Some(302.0));
    }

    #[tokio::test]
    async fn test_value_as_of_absent_cases() {
        let lookup = seeded().await;
        assert_eq!(lookup.value_as_of("CPI", d(2023, 12, 31)).await.unwrap(), None);
        assert_eq!(lookup.value_as_of("GDP", d(2024, 6, 1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_loaded_history_matches_store() {
        let lookup = seeded().await;
        let history = lookup
            .load_history(&["CPI", "GDP"], Some(d(2024, 1, 15)))
            .await
            .unwrap();
        assert_eq!(history.len("CPI"), 1);
        assert_eq!(history.value_as_of("CPI", d(2024, 6, 1)), Some(300.0));
        assert_eq!(history.value_as_of("GDP", d(2024, 6, 1)), None);
    }
}
