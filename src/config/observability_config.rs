//! Observability configuration parsing from environment variables.

use super::{parse_var, EnvLookup};
use anyhow::Result;

/// Push-based metrics reporter settings
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub report_interval_secs: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_interval_secs: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        Ok(Self {
            enabled: lookup("OBSERVABILITY_ENABLED")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
            report_interval_secs: parse_var(lookup, "METRICS_REPORT_INTERVAL_SECS", 60u64)?.max(1),
        })
    }
}
