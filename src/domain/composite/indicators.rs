//! Indicators computed from raw observation histories.

use crate::domain::types::Observation;
use chrono::NaiveDate;

/// Look-back for the CPI year-over-year comparison.
pub const YOY_LOOKBACK_DAYS: u64 = 365;

/// `(now / year_ago - 1) * 100`; `None` when the year-ago value is zero.
pub fn year_over_year_pct(now: f64, year_ago: f64) -> Option<f64> {
    if year_ago == 0.0 {
        return None;
    }
    Some((now / year_ago - 1.0) * 100.0)
}

/// Drawdown from the running peak at the last observation on or before `as_of`.
///
/// `observations` must be ascending by date. Returns 0 at a new peak, a
/// negative fraction below it, and `None` when nothing precedes `as_of`.
pub fn drawdown_at(observations: &[Observation], as_of: NaiveDate) -> Option<f64> {
    let mut peak = f64::NEG_INFINITY;
    let mut drawdown = None;

    for obs in observations.iter().take_while(|o| o.date <= as_of) {
        if obs.value > peak {
            peak = obs.value;
        }
        drawdown = Some(if peak != 0.0 {
            (obs.value - peak) / peak
        } else {
            0.0
        });
    }

    drawdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(d(i as u32 + 1), *v))
            .collect()
    }

    #[test]
    fn test_drawdown_after_peak() {
        let obs = series(&[100.0, 110.0, 105.0]);
        let dd = drawdown_at(&obs, d(3)).unwrap();
        assert!((dd - (105.0 - 110.0) / 110.0).abs() < 1e-12);
        assert!((dd + 0.0455).abs() < 1e-4);
    }

    #[test]
    fn test_drawdown_zero_at_new_peak() {
        let obs = series(&[100.0, 110.0, 105.0]);
        assert_eq!(drawdown_at(&obs, d(2)), Some(0.0));
        assert_eq!(drawdown_at(&obs, d(1)), Some(0.0));
    }

    #[test]
    fn test_drawdown_ignores_later_observations() {
        let obs = series(&[100.0, 90.0, 200.0]);
        let dd = drawdown_at(&obs, d(2)).unwrap();
        assert!((dd + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_drawdown_carries_last_observation() {
        let obs = vec![Observation::new(d(1), 100.0), Observation::new(d(2), 80.0)];
        // d(5) has no observation: the one from d(2) applies
        assert!((drawdown_at(&obs, d(5)).unwrap() + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_drawdown_absent_without_history() {
        assert_eq!(drawdown_at(&[], d(1)), None);
        let obs = series(&[100.0]);
        let before = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(drawdown_at(&obs, before), None);
    }

    #[test]
    fn test_year_over_year() {
        let yoy = year_over_year_pct(309.0, 300.0).unwrap();
        assert!((yoy - 3.0).abs() < 1e-9);
        assert_eq!(year_over_year_pct(309.0, 0.0), None);
    }
}
