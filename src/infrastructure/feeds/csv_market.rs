//! Market closes from CSV exports (`date` column plus value columns).

use crate::domain::ports::ObservationFeed;
use crate::domain::series;
use crate::domain::types::{Frequency, NewSeries, Observation, SeriesBatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Maps one CSV column onto a series.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvColumn {
    pub column: String,
    pub series: NewSeries,
}

impl CsvColumn {
    pub fn new(column: &str, series: NewSeries) -> Self {
        Self {
            column: column.to_string(),
            series,
        }
    }
}

pub struct CsvMarketFeed {
    path: PathBuf,
    columns: Vec<CsvColumn>,
}

impl CsvMarketFeed {
    pub fn new(path: impl Into<PathBuf>, columns: Vec<CsvColumn>) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    /// ETF export: `Close` stands in for the index close, `Volume` for ETF volume.
    pub fn spy(path: impl Into<PathBuf>) -> Self {
        Self::new(
            path,
            vec![
                CsvColumn::new(
                    "close",
                    NewSeries::new(series::SPX_CLOSE, "S&P 500 Close", Frequency::Daily, "CSV"),
                ),
                CsvColumn::new(
                    "volume",
                    NewSeries::new(series::SPY_VOLUME, "SPY Volume", Frequency::Daily, "CSV"),
                ),
            ],
        )
    }

    pub fn vix(path: impl Into<PathBuf>) -> Self {
        Self::new(
            path,
            vec![CsvColumn::new(
                "close",
                NewSeries::new(series::VIX, "VIX Index", Frequency::Daily, "CSV"),
            )],
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse CSV content into one batch per mapped column.
///
/// Header names are matched case-insensitively. Empty, unparsable and
/// non-finite (`nan`, `inf`) cells are skipped for that column only.
pub fn parse_market_csv<R: Read>(reader: R, columns: &[CsvColumn]) -> Result<Vec<SeriesBatch>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("CSV file has no header row")?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| h == "date")
        .context("CSV file has no 'date' column")?;

    let mut targets = Vec::with_capacity(columns.len());
    for mapping in columns {
        let idx = headers
            .iter()
            .position(|h| *h == mapping.column.to_lowercase())
            .with_context(|| format!("CSV file has no '{}' column", mapping.column))?;
        targets.push((idx, mapping, Vec::new()));
    }

    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            warn!("Skipping CSV record {} with invalid date", line + 1);
            continue;
        };
        for (idx, mapping, observations) in targets.iter_mut() {
            let Some(cell) = record.get(*idx).filter(|cell| !cell.is_empty()) else {
                continue;
            };
            match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    observations.push(Observation::new(date, value));
                }
                _ => warn!(
                    "Skipping {} value '{}' on {}",
                    mapping.series.code, cell, date
                ),
            }
        }
    }

    Ok(targets
        .into_iter()
        .map(|(_, mapping, mut observations)| {
            observations.sort_by_key(|o| o.date);
            SeriesBatch {
                series: mapping.series.clone(),
                observations,
            }
        })
        .collect())
}

#[async_trait]
impl ObservationFeed for CsvMarketFeed {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self) -> Result<Vec<SeriesBatch>> {
        info!("Reading market CSV {}", self.path.display());
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        parse_market_csv(bytes.as_slice(), &self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_spy_export() {
        let data = "Date,Open,High,Low,Close,Volume\n\
                    2024-01-03 00:00:00-05:00,1,1,1,470.5,1000\n\
                    2024-01-02,1,1,1,472.1,\n\
                    garbage,1,1,1,1,1\n";
        let feed = CsvMarketFeed::spy("unused.csv");

        let batches = parse_market_csv(data.as_bytes(), &feed.columns).unwrap();
        assert_eq!(batches.len(), 2);

        let close = &batches[0];
        assert_eq!(close.series.code, series::SPX_CLOSE);
        assert_eq!(close.observations.len(), 2);
        assert_eq!(close.observations[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(close.observations[1].value, 470.5);

        let volume = &batches[1];
        assert_eq!(volume.series.code, series::SPY_VOLUME);
        assert_eq!(volume.observations.len(), 1);
    }

    #[test]
    fn test_non_finite_cells_skip_only_that_column() {
        let data = "Date,Close,Volume\n\
                    2024-01-02,100,5\n\
                    2024-01-03,nan,6\n\
                    2024-01-04,102,inf\n\
                    2024-01-05,-Infinity,8\n";
        let feed = CsvMarketFeed::spy("unused.csv");

        let batches = parse_market_csv(data.as_bytes(), &feed.columns).unwrap();
        let dates = |i: usize| -> Vec<u32> {
            batches[i].observations.iter().map(|o| o.date.day()).collect()
        };
        assert_eq!(dates(0), vec![2, 4]);
        assert_eq!(dates(1), vec![2, 3, 5]);
        assert!(batches
            .iter()
            .flat_map(|b| &b.observations)
            .all(|o| o.value.is_finite()));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let data = "date,open\n2024-01-02,1\n";
        let feed = CsvMarketFeed::vix("unused.csv");
        assert!(parse_market_csv(data.as_bytes(), &feed.columns).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let feed = CsvMarketFeed::vix("/nonexistent/vix.csv");
        assert!(feed.fetch().await.is_err());
    }
}
