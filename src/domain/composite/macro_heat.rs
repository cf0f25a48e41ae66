//! Macro Heat Index.
//!
//! Weighted blend of inflation, labour-market tightness and curve steepness,
//! each normalized to `[0, 1]`, scaled to 0-100.
//!
//! - CPI YoY above `cpi_floor` raises heat, saturating at `cpi_ceiling`.
//! - Unemployment is inverted: a rate at `unemp_floor` is maximally hot.
//! - A steeper 10y-2y curve raises heat.

use super::snapshot::{round1, unit_range, CompositeScore, SnapshotInputs, CPI_YOY, UNEMP_RATE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIndexParams {
    pub cpi_floor: f64,
    pub cpi_ceiling: f64,
    pub unemp_floor: f64,
    pub unemp_ceiling: f64,
    pub spread_floor: f64,
    pub spread_ceiling: f64,
    pub cpi_weight: f64,
    pub unemp_weight: f64,
    pub spread_weight: f64,
    /// Scores below this are "Cool".
    pub cool_below: f64,
    /// Scores at or above this are "Hot".
    pub hot_at: f64,
}

impl Default for HeatIndexParams {
    fn default() -> Self {
        Self {
            cpi_floor: 2.0,
            cpi_ceiling: 8.0,
            unemp_floor: 3.0,
            unemp_ceiling: 10.0,
            spread_floor: -1.5,
            spread_ceiling: 2.0,
            cpi_weight: 0.45,
            unemp_weight: 0.35,
            spread_weight: 0.20,
            cool_below: 40.0,
            hot_at: 70.0,
        }
    }
}

impl HeatIndexParams {
    pub fn score(&self, snapshot: &SnapshotInputs) -> CompositeScore {
        let (Some(cpi_yoy), Some(unemp), Some(spread)) = (
            snapshot.get(CPI_YOY),
            snapshot.get(UNEMP_RATE),
            snapshot.term_spread(),
        ) else {
            return CompositeScore::unknown();
        };

        let inflation = unit_range(cpi_yoy, self.cpi_floor, self.cpi_ceiling);
        let labour = 1.0 - unit_range(unemp, self.unemp_floor, self.unemp_ceiling);
        let curve = unit_range(spread, self.spread_floor, self.spread_ceiling);

        let weight_sum = self.cpi_weight + self.unemp_weight + self.spread_weight;
        if weight_sum <= 0.0 {
            return CompositeScore::unknown();
        }
        let blended = (self.cpi_weight * inflation
            + self.unemp_weight * labour
            + self.spread_weight * curve)
            / weight_sum;
        let score = round1(blended * 100.0);

        CompositeScore {
            score: Some(score),
            label: self.label_for(score),
        }
    }

    pub fn label_for(&self, score: f64) -> &'static str {
        if score < self.cool_below {
            "Cool"
        } else if score < self.hot_at {
            "Neutral"
        } else {
            "Hot"
        }
    }
}

/// Macro Heat Index with the default parameters.
pub fn compute_macro_heat_index(snapshot: &SnapshotInputs) -> CompositeScore {
    HeatIndexParams::default().score(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::composite::snapshot::{TERM_SPREAD, US10Y, US2Y};

    #[test]
    fn test_missing_unemployment_is_unknown() {
        let snapshot = SnapshotInputs::new()
            .with(CPI_YOY, 3.0)
            .with(TERM_SPREAD, 0.5);
        let result = compute_macro_heat_index(&snapshot);
        assert_eq!(result.score, None);
        assert_eq!(result.label, "Unknown");
    }

    #[test]
    fn test_missing_spread_is_unknown() {
        let snapshot = SnapshotInputs::new()
            .with(CPI_YOY, 3.0)
            .with(UNEMP_RATE, 4.0)
            .with(US10Y, 4.0);
        assert!(compute_macro_heat_index(&snapshot).is_unknown());
    }

    #[test]
    fn test_hot_economy() {
        // Inflation saturated, unemployment at floor, steep curve
        let snapshot = SnapshotInputs::new()
            .with(CPI_YOY, 9.0)
            .with(UNEMP_RATE, 3.0)
            .with(TERM_SPREAD, 2.5);
        let result = compute_macro_heat_index(&snapshot);
        assert_eq!(result.score, Some(100.0));
        assert_eq!(result.label, "Hot");
    }

    #[test]
    fn test_cool_economy() {
        let snapshot = SnapshotInputs::new()
            .with(CPI_YOY, 1.0)
            .with(UNEMP_RATE, 10.0)
            .with(TERM_SPREAD, -2.0);
        let result = compute_macro_heat_index(&snapshot);
        assert_eq!(result.score, Some(0.0));
        assert_eq!(result.label, "Cool");
    }

    #[test]
    fn test_mid_range_value() {
        // cpi 5% -> 0.5, unemp 6.5% -> 1 - 0.5 = 0.5, spread 0.25 -> 0.5
        let snapshot = SnapshotInputs::new()
            .with(CPI_YOY, 5.0)
            .with(UNEMP_RATE, 6.5)
            .with(US10Y, 4.25)
            .with(US2Y, 4.0);
        let result = compute_macro_heat_index(&snapshot);
        assert_eq!(result.score, Some(50.0));
        assert_eq!(result.label, "Neutral");
    }

    #[test]
    fn test_lower_unemployment_is_hotter() {
        let base = SnapshotInputs::new()
            .with(CPI_YOY, 3.0)
            .with(TERM_SPREAD, 0.0);
        let tight = compute_macro_heat_index(&base.clone().with(UNEMP_RATE, 3.5));
        let slack = compute_macro_heat_index(&base.with(UNEMP_RATE, 8.0));
        assert!(tight.score.unwrap() > slack.score.unwrap());
    }

    #[test]
    fn test_label_thresholds() {
        let params = HeatIndexParams::default();
        assert_eq!(params.label_for(39.9), "Cool");
        assert_eq!(params.label_for(40.0), "Neutral");
        assert_eq!(params.label_for(69.9), "Neutral");
        assert_eq!(params.label_for(70.0), "Hot");
    }
}
