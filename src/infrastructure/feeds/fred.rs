//! FRED `series/observations` feed.

use crate::domain::ports::ObservationFeed;
use crate::domain::series;
use crate::domain::types::{Frequency, NewSeries, Observation, SeriesBatch};
use crate::infrastructure::core::build_url_with_query;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

pub const FRED_API_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// A FRED series id and the local series it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct FredSeries {
    pub fred_id: &'static str,
    pub series: NewSeries,
}

impl FredSeries {
    fn new(fred_id: &'static str, code: &str, name: &str, frequency: Frequency) -> Self {
        Self {
            fred_id,
            series: NewSeries::new(code, name, frequency, "FRED"),
        }
    }
}

/// Series pulled by default.
pub fn default_fred_series() -> Vec<FredSeries> {
    vec![
        FredSeries::new("CPIAUCSL", series::CPI, "CPI All Items", Frequency::Monthly),
        FredSeries::new("CPILFESL", "CoreCPI", "Core CPI", Frequency::Monthly),
        FredSeries::new("PCEPI", "PCE", "PCE Price Index", Frequency::Monthly),
        FredSeries::new("PCEPILFE", "CorePCE", "Core PCE Price Index", Frequency::Monthly),
        FredSeries::new("UNRATE", series::UNEMPLOYMENT, "Unemployment Rate", Frequency::Monthly),
        FredSeries::new("ICSA", "JoblessClaims", "Initial Jobless Claims", Frequency::Weekly),
        FredSeries::new("FEDFUNDS", "FFR", "Effective Fed Funds Rate", Frequency::Monthly),
        FredSeries::new("DGS10", series::US10Y, "10-Year Treasury Yield", Frequency::Daily),
        FredSeries::new("DGS2", series::US2Y, "2-Year Treasury Yield", Frequency::Daily),
    ]
}

#[derive(Debug, Deserialize)]
struct FredResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

/// Parse a FRED JSON payload. Missing values ("."), unparsable rows and
/// non-finite numbers are skipped.
pub fn parse_observations(body: &[u8]) -> Result<Vec<Observation>> {
    let payload: FredResponse =
        serde_json::from_slice(body).context("Failed to parse FRED response")?;

    let mut observations = Vec::with_capacity(payload.observations.len());
    for raw in payload.observations {
        if raw.value.trim() == "." {
            continue;
        }
        let (Ok(date), Some(value)) = (
            NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d"),
            raw.value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        ) else {
            warn!("Skipping malformed FRED row {} = {}", raw.date, raw.value);
            continue;
        };
        observations.push(Observation::new(date, value));
    }
    Ok(observations)
}

pub struct FredFeed {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    series: Vec<FredSeries>,
}

impl FredFeed {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: &str,
        api_key: &str,
        series: Vec<FredSeries>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            series,
        }
    }

    async fn fetch_series(&self, fred_id: &str) -> Result<Vec<Observation>> {
        let url = build_url_with_query(
            &self.base_url,
            &[
                ("series_id", fred_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("FRED request for {} failed", fred_id))?
            .error_for_status()
            .with_context(|| format!("FRED returned an error for {}", fred_id))?;

        let body = response.bytes().await?;
        parse_observations(&body)
    }
}

#[async_trait]
impl ObservationFeed for FredFeed {
    fn name(&self) -> &str {
        "fred"
    }

    /// A failing series is logged and skipped; the others still load.
    async fn fetch(&self) -> Result<Vec<SeriesBatch>> {
        let mut batches = Vec::with_capacity(self.series.len());
        for entry in &self.series {
            info!("Fetching {} -> {} ...", entry.fred_id, entry.series.code);
            match self.fetch_series(entry.fred_id).await {
                Ok(observations) => batches.push(SeriesBatch {
                    series: entry.series.clone(),
                    observations,
                }),
                Err(e) => warn!("Skipping {}: {:#}", entry.fred_id, e),
            }
        }
        Ok(batches)
    }
}
