//! Composite indices for the macro dashboard.
//!
//! All calculators are pure and never fail: a missing input yields
//! [`CompositeScore::unknown`].

pub mod indicators;
pub mod macro_heat;
pub mod risk_barometer;
pub mod snapshot;

pub use indicators::{drawdown_at, year_over_year_pct, YOY_LOOKBACK_DAYS};
pub use macro_heat::{compute_macro_heat_index, HeatIndexParams};
pub use risk_barometer::{compute_risk_barometer, RiskBarometerParams};
pub use snapshot::{CompositeScore, SnapshotInputs};
