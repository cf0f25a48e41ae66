//! In-memory as-of index over observation histories.

use crate::domain::types::Observation;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Anything that can answer "value of series S as of date D".
///
/// Returns the value of the latest observation with `date <= as_of`, or `None`
/// when the series is unknown or has nothing at or before `as_of`.
pub trait AsOfSource {
    fn value_as_of(&self, code: &str, as_of: NaiveDate) -> Option<f64>;
}

/// Per-series ordered histories, loaded once and queried many times.
#[derive(Debug, Clone, Default)]
pub struct ObservationHistory {
    series: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl ObservationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add observations for `code`. A later value for the same date replaces the earlier one.
    pub fn insert_series(&mut self, code: &str, observations: &[Observation]) {
        let entry = self.series.entry(code.to_string()).or_default();
        for obs in observations {
            entry.insert(obs.date, obs.value);
        }
    }

    pub fn insert(&mut self, code: &str, date: NaiveDate, value: f64) {
        self.series
            .entry(code.to_string())
            .or_default()
            .insert(date, value);
    }

    pub fn len(&self, code: &str) -> usize {
        self.series.get(code).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(BTreeMap::is_empty)
    }

    /// First and last date recorded for `code`.
    pub fn date_range(&self, code: &str) -> Option<(NaiveDate, NaiveDate)> {
        let points = self.series.get(code)?;
        let first = points.keys().next()?;
        let last = points.keys().next_back()?;
        Some((*first, *last))
    }
}

impl AsOfSource for ObservationHistory {
    fn value_as_of(&self, code: &str, as_of: NaiveDate) -> Option<f64> {
        self.series
            .get(code)?
            .range(..=as_of)
            .next_back()
            .map(|(_, value)| *value)
    }
}
