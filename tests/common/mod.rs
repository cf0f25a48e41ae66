#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use marketpulse::application::system::Application;
use marketpulse::config::Config;
use marketpulse::domain::types::{Frequency, NewSeries, Observation, SeriesBatch};
use std::collections::HashMap;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DATABASE_URL".to_string(), "sqlite::memory:".to_string());
    vars.insert("NEWS_RSS_FEEDS".to_string(), String::new());
    for (k, v) in pairs {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(&|key| vars.get(key).cloned()).unwrap()
}

/// Application over a fresh in-memory database.
pub async fn test_app(pairs: &[(&str, &str)]) -> Application {
    Application::build(config_with(pairs)).await.unwrap()
}

pub fn batch(code: &str, freq: Frequency, points: &[(NaiveDate, f64)]) -> SeriesBatch {
    SeriesBatch {
        series: NewSeries::new(code, code, freq, "TEST"),
        observations: points
            .iter()
            .map(|(date, value)| Observation::new(*date, *value))
            .collect(),
    }
}

pub async fn store(app: &Application, code: &str, freq: Frequency, points: &[(NaiveDate, f64)]) {
    app.ingestion
        .store_batch(&batch(code, freq, points))
        .await
        .unwrap();
}

/// Sixty calendar days of every tracked series. SPX drifts up with a
/// periodic pullback so both label classes are represented.
pub async fn seed_full_history(app: &Application) -> (NaiveDate, NaiveDate) {
    let start = d(2024, 1, 1);
    let days: Vec<NaiveDate> = (0..60)
        .map(|i| start.checked_add_days(Days::new(i)).unwrap())
        .collect();

    let spx: Vec<(NaiveDate, f64)> = days
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let swing = ((i * 37) % 11) as f64 * 0.6;
            (*date, 4700.0 + i as f64 * 2.0 + swing)
        })
        .collect();
    let vix: Vec<(NaiveDate, f64)> = days
        .iter()
        .enumerate()
        .map(|(i, date)| (*date, 13.0 + (i % 7) as f64))
        .collect();
    let volume: Vec<(NaiveDate, f64)> = days
        .iter()
        .enumerate()
        .map(|(i, date)| (*date, 70_000_000.0 + (i % 5) as f64 * 1_000_000.0))
        .collect();
    let us10y: Vec<(NaiveDate, f64)> = days
        .iter()
        .enumerate()
        .map(|(i, date)| (*date, 4.0 + i as f64 * 0.005))
        .collect();
    let us2y: Vec<(NaiveDate, f64)> = days
        .iter()
        .enumerate()
        .map(|(i, date)| (*date, 4.4 - i as f64 * 0.003))
        .collect();

    store(app, "SPX_CLOSE", Frequency::Daily, &spx).await;
    store(app, "VIX", Frequency::Daily, &vix).await;
    store(app, "SPY_VOLUME", Frequency::Daily, &volume).await;
    store(app, "US10Y", Frequency::Daily, &us10y).await;
    store(app, "US2Y", Frequency::Daily, &us2y).await;
    store(
        app,
        "CPI",
        Frequency::Monthly,
        &[
            (d(2023, 1, 1), 299.2),
            (d(2023, 12, 1), 308.7),
            (d(2024, 1, 1), 309.7),
            (d(2024, 2, 1), 310.3),
        ],
    )
    .await;
    store(
        app,
        "Unemployment",
        Frequency::Monthly,
        &[(d(2023, 12, 1), 3.7), (d(2024, 1, 1), 3.7), (d(2024, 2, 1), 3.9)],
    )
    .await;

    (days[0], days[days.len() - 1])
}
