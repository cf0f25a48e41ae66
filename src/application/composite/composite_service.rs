//! Dashboard composites evaluated against the observation store and the
//! latest FeatureFrame row.

use crate::application::features::PointInTimeLookup;
use crate::domain::composite::snapshot::{self as keys, CompositeScore, SnapshotInputs};
use crate::domain::composite::{
    drawdown_at, year_over_year_pct, HeatIndexParams, RiskBarometerParams, YOY_LOOKBACK_DAYS,
};
use crate::domain::repositories::FeatureFrameRepository;
use crate::domain::series::{self, feature};
use anyhow::Result;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// One-row macro card: raw levels from the latest FeatureFrame plus composites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroSnapshot {
    pub as_of: NaiveDate,
    pub cpi_yoy: Option<f64>,
    pub cpi_level: Option<f64>,
    pub unemp_rate: Option<f64>,
    pub us10y: Option<f64>,
    pub us2y: Option<f64>,
    pub term_spread_10y_2y: Option<f64>,
    pub vix: Option<f64>,
    pub spx_close: Option<f64>,
    pub spx_drawdown: Option<f64>,
    pub macro_heat_index: Option<f64>,
    pub macro_heat_label: &'static str,
    pub risk_barometer_score: Option<f64>,
    pub risk_barometer_label: &'static str,
}

pub struct CompositeService {
    lookup: PointInTimeLookup,
    frames: Arc<dyn FeatureFrameRepository>,
    heat: HeatIndexParams,
    risk: RiskBarometerParams,
}

impl CompositeService {
    pub fn new(
        lookup: PointInTimeLookup,
        frames: Arc<dyn FeatureFrameRepository>,
        heat: HeatIndexParams,
        risk: RiskBarometerParams,
    ) -> Self {
        Self {
            lookup,
            frames,
            heat,
            risk,
        }
    }

    /// CPI year-over-year change in percent, using as-of values at `date`
    /// and 365 days earlier.
    pub async fn compute_cpi_yoy(&self, date: NaiveDate) -> Result<Option<f64>> {
        let Some(now) = self.lookup.value_as_of(series::CPI, date).await? else {
            return Ok(None);
        };
        let Some(year_ago_date) = date.checked_sub_days(Days::new(YOY_LOOKBACK_DAYS)) else {
            return Ok(None);
        };
        let Some(year_ago) = self.lookup.value_as_of(series::CPI, year_ago_date).await? else {
            return Ok(None);
        };
        Ok(year_over_year_pct(now, year_ago))
    }

    /// Drawdown of `SPX_CLOSE` from its running peak at `date`.
    pub async fn compute_spx_drawdown(&self, date: NaiveDate) -> Result<Option<f64>> {
        let history = self
            .lookup
            .observations()
            .history_until(series::SPX_CLOSE, date)
            .await?;
        Ok(drawdown_at(&history, date))
    }

    pub fn macro_heat(&self, inputs: &SnapshotInputs) -> CompositeScore {
        self.heat.score(inputs)
    }

    pub fn risk_barometer(&self, inputs: &SnapshotInputs) -> CompositeScore {
        self.risk.score(inputs)
    }

    /// Snapshot for the latest FeatureFrame date, `None` when the table is empty.
    pub async fn macro_snapshot(&self) -> Result<Option<MacroSnapshot>> {
        let Some(row) = self.frames.latest().await? else {
            return Ok(None);
        };

        let cpi_yoy = self.compute_cpi_yoy(row.date).await?;
        let spx_drawdown = self.compute_spx_drawdown(row.date).await?;

        let mut inputs = SnapshotInputs::new();
        inputs.set(keys::CPI_YOY, cpi_yoy);
        inputs.set(keys::UNEMP_RATE, row.feature(feature::UNRATE));
        inputs.set(keys::US10Y, row.feature(feature::US10Y));
        inputs.set(keys::US2Y, row.feature(feature::US2Y));
        inputs.set(keys::TERM_SPREAD, row.feature(feature::TERM_SPREAD));
        inputs.set(keys::VIX, row.feature(feature::VIX_CLOSE));
        inputs.set(keys::SPX_DRAWDOWN, spx_drawdown);

        let heat = self.macro_heat(&inputs);
        let risk = self.risk_barometer(&inputs);
        debug!(
            "Macro snapshot {}: heat={:?} risk={:?}",
            row.date, heat.score, risk.score
        );

        Ok(Some(MacroSnapshot {
            as_of: row.date,
            cpi_yoy,
            cpi_level: row.feature(feature::CPI_LEVEL),
            unemp_rate: row.feature(feature::UNRATE),
            us10y: row.feature(feature::US10Y),
            us2y: row.feature(feature::US2Y),
            term_spread_10y_2y: row.feature(feature::TERM_SPREAD),
            vix: row.feature(feature::VIX_CLOSE),
            spx_close: row.feature(feature::SPX_CLOSE),
            spx_drawdown,
            macro_heat_index: heat.score,
            macro_heat_label: heat.label,
            risk_barometer_score: risk.score,
            risk_barometer_label: risk.label,
        }))
    }
}
