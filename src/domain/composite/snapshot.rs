use serde::Serialize;
use std::collections::BTreeMap;

pub const CPI_YOY: &str = "cpi_yoy";
pub const UNEMP_RATE: &str = "unemp_rate";
pub const TERM_SPREAD: &str = "term_spread_10y_2y";
pub const US10Y: &str = "us10y";
pub const US2Y: &str = "us2y";
pub const VIX: &str = "vix";
pub const SPX_DRAWDOWN: &str = "spx_drawdown";

pub const UNKNOWN: &str = "Unknown";

/// Flat mapping of named composite inputs. Absent keys mean "not available".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotInputs {
    values: BTreeMap<String, f64>,
}

impl SnapshotInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Insert when present; `None` leaves the key absent.
    pub fn set(&mut self, key: &str, value: Option<f64>) {
        match value {
            Some(v) => {
                self.values.insert(key.to_string(), v);
            }
            None => {
                self.values.remove(key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// The 10y-2y spread, given directly or derived from both legs.
    pub fn term_spread(&self) -> Option<f64> {
        self.get(TERM_SPREAD)
            .or_else(|| Some(self.get(US10Y)? - self.get(US2Y)?))
    }
}

impl<'a> FromIterator<(&'a str, f64)> for SnapshotInputs {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// A 0-100 composite score with its bucket label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeScore {
    pub score: Option<f64>,
    pub label: &'static str,
}

impl CompositeScore {
    pub fn unknown() -> Self {
        Self {
            score: None,
            label: UNKNOWN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.score.is_none()
    }
}

/// Position of `value` within `[floor, ceiling]`, clamped to `[0, 1]`.
pub(crate) fn unit_range(value: f64, floor: f64, ceiling: f64) -> f64 {
    if ceiling <= floor {
        return 0.0;
    }
    ((value - floor) / (ceiling - floor)).clamp(0.0, 1.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
