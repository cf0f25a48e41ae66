//! Risk Barometer: implied volatility and distance from the index peak, 0-100.
//! Higher means more stress.

use super::snapshot::{round1, unit_range, CompositeScore, SnapshotInputs, SPX_DRAWDOWN, VIX};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBarometerParams {
    pub vix_floor: f64,
    pub vix_ceiling: f64,
    /// Drawdown magnitude (as a fraction) that maps to full stress.
    pub max_drawdown: f64,
    pub drawdown_weight: f64,
    pub vix_weight: f64,
    /// Scores below this are "Calm".
    pub calm_below: f64,
    /// Scores at or above this are "Stressed".
    pub stressed_at: f64,
}

impl Default for RiskBarometerParams {
    fn default() -> Self {
        Self {
            vix_floor: 10.0,
            vix_ceiling: 40.0,
            max_drawdown: 0.5,
            drawdown_weight: 0.6,
            vix_weight: 0.4,
            calm_below: 30.0,
            stressed_at: 60.0,
        }
    }
}

impl RiskBarometerParams {
    pub fn score(&self, snapshot: &SnapshotInputs) -> CompositeScore {
        let (Some(vix), Some(drawdown)) = (snapshot.get(VIX), snapshot.get(SPX_DRAWDOWN)) else {
            return CompositeScore::unknown();
        };
        if self.max_drawdown <= 0.0 {
            return CompositeScore::unknown();
        }

        let volatility = unit_range(vix, self.vix_floor, self.vix_ceiling);
        // Drawdowns are <= 0; anything above the peak counts as zero stress.
        let depth = drawdown.clamp(-self.max_drawdown, 0.0).abs() / self.max_drawdown;

        let weight_sum = self.drawdown_weight + self.vix_weight;
        if weight_sum <= 0.0 {
            return CompositeScore::unknown();
        }
        let blended = (self.drawdown_weight * depth + self.vix_weight * volatility) / weight_sum;
        let score = round1(blended * 100.0);

        CompositeScore {
            score: Some(score),
            label: self.label_for(score),
        }
    }

    pub fn label_for(&self, score: f64) -> &'static str {
        if score < self.calm_below {
            "Calm"
        } else if score < self.stressed_at {
            "Cautious"
        } else {
            "Stressed"
        }
    }
}

/// Risk Barometer with the default parameters.
pub fn compute_risk_barometer(snapshot: &SnapshotInputs) -> CompositeScore {
    RiskBarometerParams::default().score(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vix_is_unknown() {
        let snapshot = SnapshotInputs::new().with(SPX_DRAWDOWN, -0.1);
        let result = compute_risk_barometer(&snapshot);
        assert_eq!(result, CompositeScore::unknown());
    }

    #[test]
    fn test_missing_drawdown_is_unknown() {
        let snapshot = SnapshotInputs::new().with(VIX, 20.0);
        assert!(compute_risk_barometer(&snapshot).is_unknown());
    }

    #[test]
    fn test_calm_market_at_peak() {
        let snapshot = SnapshotInputs::new().with(VIX, 10.0).with(SPX_DRAWDOWN, 0.0);
        let result = compute_risk_barometer(&snapshot);
        assert_eq!(result.score, Some(0.0));
        assert_eq!(result.label, "Calm");
    }

    #[test]
    fn test_cautious_market() {
        // vix 25 -> 0.5, drawdown -10% -> 0.2 ; 0.6*0.2 + 0.4*0.5 = 0.32
        let snapshot = SnapshotInputs::new().with(VIX, 25.0).with(SPX_DRAWDOWN, -0.10);
        let result = compute_risk_barometer(&snapshot);
        assert_eq!(result.score, Some(32.0));
        assert_eq!(result.label, "Cautious");
    }

    #[test]
    fn test_crash_saturates() {
        let snapshot = SnapshotInputs::new().with(VIX, 80.0).with(SPX_DRAWDOWN, -0.7);
        let result = compute_risk_barometer(&snapshot);
        assert_eq!(result.score, Some(100.0));
        assert_eq!(result.label, "Stressed");
    }

    #[test]
    fn test_custom_thresholds() {
        let params = RiskBarometerParams {
            calm_below: 10.0,
            stressed_at: 20.0,
            ..Default::default()
        };
        assert_eq!(params.label_for(15.0), "Cautious");
        assert_eq!(params.label_for(20.0), "Stressed");
    }
}
