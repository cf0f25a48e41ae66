//! Configuration module for MarketPulse.
//!
//! Settings are read from environment variables (optionally seeded from a
//! `.env` file by the binaries) and grouped by concern: Database, Server,
//! Feeds, Model, Composites and Observability.
//!
//! Every loader takes an [`EnvLookup`] so tests can supply a map instead of
//! mutating the process environment.

mod composite_config;
mod database_config;
mod feed_config;
mod model_config;
mod observability_config;
mod server_config;

pub use composite_config::CompositeEnvConfig;
pub use database_config::DatabaseEnvConfig;
pub use feed_config::{FeedEnvConfig, RssSource};
pub use model_config::ModelEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// Key → value resolver used by every config loader.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parse `key` with `T::from_str`, falling back to `default` when unset or blank.
pub(crate) fn parse_var<T>(lookup: EnvLookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

pub(crate) fn string_var(lookup: EnvLookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Startup readiness: which required keys are missing and what looks off.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseEnvConfig,
    pub server: ServerEnvConfig,
    pub feeds: FeedEnvConfig,
    pub model: ModelEnvConfig,
    pub composite: CompositeEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        Ok(Self {
            database: DatabaseEnvConfig::from_lookup(lookup),
            server: ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?,
            feeds: FeedEnvConfig::from_lookup(lookup).context("Failed to load feed config")?,
            model: ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?,
            composite: CompositeEnvConfig::from_lookup(lookup)
                .context("Failed to load composite config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)
                .context("Failed to load observability config")?,
        })
    }

    /// Missing API keys are reported here rather than failing the load.
    pub fn readiness(&self) -> ReadinessReport {
        let mut missing = Vec::new();
        let mut warnings = Vec::new();

        if self.feeds.fred_api_key.is_none() {
            missing.push("FRED_API_KEY".to_string());
        }
        if self.feeds.rss_sources.is_empty() {
            warnings.push("NEWS_RSS_FEEDS is empty; news fetch will be skipped".to_string());
        }
        for path in [&self.feeds.spy_csv_path, &self.feeds.vix_csv_path] {
            if !path.exists() {
                warnings.push(format!("Market CSV {} not found", path.display()));
            }
        }

        ReadinessReport {
            ready: missing.is_empty(),
            missing,
            warnings,
        }
    }
}
