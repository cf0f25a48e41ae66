//! Well-known series codes and feature names.
//!
//! Series codes are the natural keys of the observation store; feature names
//! are the keys of a [`FeatureRow`](crate::domain::types::FeatureRow) map.

/// Primary index used for returns, labels and drawdown.
pub const SPX_CLOSE: &str = "SPX_CLOSE";
pub const SPY_VOLUME: &str = "SPY_VOLUME";
pub const VIX: &str = "VIX";
pub const CPI: &str = "CPI";
pub const UNEMPLOYMENT: &str = "Unemployment";
pub const US10Y: &str = "US10Y";
pub const US2Y: &str = "US2Y";

/// Series read by the feature builder.
pub const TRACKED_SERIES: &[&str] = &[SPX_CLOSE, SPY_VOLUME, VIX, CPI, UNEMPLOYMENT, US10Y, US2Y];

pub mod feature {
    pub const SPX_CLOSE: &str = "spx_close";
    pub const SPX_RET_1D: &str = "spx_ret_1d";
    pub const VIX_CLOSE: &str = "vix_close";
    pub const SPY_VOLUME: &str = "spy_volume";
    pub const CPI_LEVEL: &str = "cpi_level";
    pub const UNRATE: &str = "unrate";
    pub const US10Y: &str = "us10y";
    pub const US2Y: &str = "us2y";
    pub const TERM_SPREAD: &str = "term_spread_10y_2y";
}
