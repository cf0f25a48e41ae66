//! Per-date feature row computation.
//!
//! A row for date `d` only reads values as of `d` (and `d - 1` for the one-day
//! return); the forward label is the only input read as of `d + 1`.

use crate::domain::history::AsOfSource;
use crate::domain::series::{self, feature};
use crate::domain::types::FeatureRow;
use chrono::{Days, NaiveDate};

/// Relative change `current / previous - 1`; `None` when previous is zero.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

/// Forward return and direction label: `(tomorrow / today - 1, 1 if > 0 else 0)`.
pub fn forward_label(today: Option<f64>, tomorrow: Option<f64>) -> (Option<f64>, Option<u8>) {
    match (today, tomorrow) {
        (Some(today), Some(tomorrow)) => match pct_change(today, tomorrow) {
            Some(target) => (Some(target), Some(u8::from(target > 0.0))),
            None => (None, None),
        },
        _ => (None, None),
    }
}

/// Build the feature row for `date` from any as-of source.
pub fn compute_feature_row(source: &impl AsOfSource, date: NaiveDate) -> FeatureRow {
    let mut row = FeatureRow::empty(date);
    let yesterday = date.checked_sub_days(Days::new(1));
    let tomorrow = date.checked_add_days(Days::new(1));

    let spx_today = source.value_as_of(series::SPX_CLOSE, date);
    let spx_yesterday = yesterday.and_then(|d| source.value_as_of(series::SPX_CLOSE, d));
    let spx_tomorrow = tomorrow.and_then(|d| source.value_as_of(series::SPX_CLOSE, d));

    let mut put = |name: &str, value: Option<f64>| {
        if let Some(v) = value {
            row.features.insert(name.to_string(), v);
        }
    };

    put(feature::SPX_CLOSE, spx_today);
    put(
        feature::SPX_RET_1D,
        spx_yesterday.zip(spx_today).and_then(|(y, t)| pct_change(y, t)),
    );
    put(feature::VIX_CLOSE, source.value_as_of(series::VIX, date));
    put(feature::SPY_VOLUME, source.value_as_of(series::SPY_VOLUME, date));
    put(feature::CPI_LEVEL, source.value_as_of(series::CPI, date));
    put(feature::UNRATE, source.value_as_of(series::UNEMPLOYMENT, date));

    let us10y = source.value_as_of(series::US10Y, date);
    let us2y = source.value_as_of(series::US2Y, date);
    put(feature::US10Y, us10y);
    put(feature::US2Y, us2y);
    put(feature::TERM_SPREAD, us10y.zip(us2y).map(|(l, s)| l - s));

    let (target, label) = forward_label(spx_today, spx_tomorrow);
    row.target = target;
    row.label = label;
    row
}
