use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sampling cadence of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "D"),
            Frequency::Weekly => write!(f, "W"),
            Frequency::Monthly => write!(f, "M"),
        }
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" => Ok(Frequency::Weekly),
            "M" => Ok(Frequency::Monthly),
            _ => anyhow::bail!("Invalid frequency: {}. Must be 'D', 'W' or 'M'", s),
        }
    }
}

/// A named time series. `code` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub frequency: Frequency,
    pub source: String,
}

/// Descriptor used for get-or-create; existing series keep their stored metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeries {
    pub code: String,
    pub name: String,
    pub frequency: Frequency,
    pub source: String,
}

impl NewSeries {
    pub fn new(code: &str, name: &str, frequency: Frequency, source: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            frequency,
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A batch of observations for one series, as produced by an ingestion feed.
#[derive(Debug, Clone)]
pub struct SeriesBatch {
    pub series: NewSeries,
    pub observations: Vec<Observation>,
}

/// One row of the daily feature table.
///
/// `features` is sparse: a feature whose inputs were absent is not present.
/// `target` and `label` are either both set or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub features: BTreeMap<String, f64>,
    pub target: Option<f64>,
    pub label: Option<u8>,
}

impl FeatureRow {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            features: BTreeMap::new(),
            target: None,
            label: None,
        }
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}

/// Serialized classifier plus metadata. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub id: i64,
    pub name: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub metrics: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct NewModelArtifact {
    pub name: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub metrics: serde_json::Value,
}

/// Cached prediction, unique per (model, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub model_id: i64,
    pub date: NaiveDate,
    pub probability_up: f64,
    pub label: u8,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub tickers: Vec<String>,
    pub raw_text: String,
    pub summary: String,
    pub sentiment_label: String,
    pub sentiment_score: Option<f64>,
    pub topics: String,
    pub created_at: DateTime<Utc>,
}

impl NewsArticle {
    /// Text used for annotation: the body when we have it, the headline otherwise.
    pub fn annotation_text(&self) -> &str {
        if self.raw_text.trim().is_empty() {
            &self.title
        } else {
            &self.raw_text
        }
    }

    pub fn is_annotated(&self) -> bool {
        !self.sentiment_label.is_empty()
    }
}

/// Raw article as delivered by a news feed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub tickers: Vec<String>,
    pub raw_text: String,
}

/// NLP output for one article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleAnnotation {
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub summary: String,
    pub topics: String,
}
