//! Overrides for composite label thresholds and input ranges.

use super::{parse_var, EnvLookup};
use crate::domain::composite::{HeatIndexParams, RiskBarometerParams};
use anyhow::{ensure, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeEnvConfig {
    pub heat: HeatIndexParams,
    pub risk: RiskBarometerParams,
}

impl CompositeEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let mut heat = HeatIndexParams::default();
        heat.cool_below = parse_var(lookup, "MACRO_HEAT_COOL_BELOW", heat.cool_below)?;
        heat.hot_at = parse_var(lookup, "MACRO_HEAT_HOT_AT", heat.hot_at)?;
        ensure!(
            heat.cool_below < heat.hot_at,
            "MACRO_HEAT_COOL_BELOW must be below MACRO_HEAT_HOT_AT"
        );

        let mut risk = RiskBarometerParams::default();
        risk.vix_floor = parse_var(lookup, "RISK_VIX_FLOOR", risk.vix_floor)?;
        risk.vix_ceiling = parse_var(lookup, "RISK_VIX_CEILING", risk.vix_ceiling)?;
        risk.calm_below = parse_var(lookup, "RISK_CALM_BELOW", risk.calm_below)?;
        risk.stressed_at = parse_var(lookup, "RISK_STRESSED_AT", risk.stressed_at)?;
        ensure!(
            risk.vix_floor < risk.vix_ceiling,
            "RISK_VIX_FLOOR must be below RISK_VIX_CEILING"
        );
        ensure!(
            risk.calm_below < risk.stressed_at,
            "RISK_CALM_BELOW must be below RISK_STRESSED_AT"
        );

        Ok(Self { heat, risk })
    }
}
