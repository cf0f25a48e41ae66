//! Ingestion feed configuration: FRED, market CSV files, RSS news and the
//! shared HTTP client settings.

use super::{parse_var, string_var, EnvLookup};
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const DEFAULT_RSS_FEEDS: &str = "Reuters=https://feeds.reuters.com/reuters/businessNews,\
CNBC=https://www.cnbc.com/id/100003114/device/rss/rss.html";

/// One RSS feed and the source name stored on its articles.
#[derive(Debug, Clone, PartialEq)]
pub struct RssSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEnvConfig {
    pub fred_api_key: Option<String>,
    pub fred_base_url: String,
    pub spy_csv_path: PathBuf,
    pub vix_csv_path: PathBuf,
    pub rss_sources: Vec<RssSource>,
    pub news_max_items: usize,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
}

impl FeedEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let fred_api_key = lookup("FRED_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let rss_raw = lookup("NEWS_RSS_FEEDS").unwrap_or_else(|| DEFAULT_RSS_FEEDS.to_string());
        let rss_sources = parse_rss_sources(&rss_raw)?;

        let http_timeout_secs = parse_var(lookup, "HTTP_TIMEOUT_SECS", 30u64)?;
        if http_timeout_secs == 0 {
            bail!("HTTP_TIMEOUT_SECS must be positive");
        }

        Ok(Self {
            fred_api_key,
            fred_base_url: string_var(lookup, "FRED_BASE_URL", DEFAULT_FRED_BASE_URL),
            spy_csv_path: PathBuf::from(string_var(lookup, "SPY_CSV_PATH", "data/spy.csv")),
            vix_csv_path: PathBuf::from(string_var(lookup, "VIX_CSV_PATH", "data/vix.csv")),
            rss_sources,
            news_max_items: parse_var(lookup, "NEWS_MAX_ITEMS", 25usize)?,
            http_timeout_secs,
            http_max_retries: parse_var(lookup, "HTTP_MAX_RETRIES", 3u32)?,
        })
    }
}

/// `Name=url` pairs separated by commas. A bare url uses its host as the name.
fn parse_rss_sources(raw: &str) -> Result<Vec<RssSource>> {
    let mut sources = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, url) = match entry.split_once('=') {
            Some((name, url)) => (name.trim().to_string(), url.trim().to_string()),
            None => {
                let parsed = url::Url::parse(entry)
                    .map_err(|e| anyhow::anyhow!("Invalid RSS url {}: {}", entry, e))?;
                let host = parsed.host_str().unwrap_or("rss").to_string();
                (host, entry.to_string())
            }
        };
        if url::Url::parse(&url).is_err() {
            bail!("Invalid RSS url for {}: {}", name, url);
        }
        sources.push(RssSource { name, url });
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_config_defaults() {
        let config = FeedEnvConfig::from_lookup(&|_| None).unwrap();
        assert!(config.fred_api_key.is_none());
        assert_eq!(config.fred_base_url, DEFAULT_FRED_BASE_URL);
        assert_eq!(config.rss_sources.len(), 2);
        assert_eq!(config.rss_sources[0].name, "Reuters");
        assert_eq!(config.http_max_retries, 3);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = FeedEnvConfig::from_lookup(&|key| match key {
            "FRED_API_KEY" => Some("   ".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.fred_api_key.is_none());
    }

    #[test]
    fn test_rss_sources_parsing() {
        let sources = parse_rss_sources("https://news.example.com/feed.xml, Wire=https://w.test/rss").unwrap();
        assert_eq!(sources[0].name, "news.example.com");
        assert_eq!(sources[1].name, "Wire");
        assert!(parse_rss_sources("Bad=not a url").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = FeedEnvConfig::from_lookup(&|key| match key {
            "HTTP_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }
}
