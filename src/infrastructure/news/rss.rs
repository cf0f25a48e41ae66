use crate::domain::ports::NewsFeed;
use crate::domain::types::NewArticle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use rss::Channel;
use std::io::Cursor;
use tracing::{debug, info};

/// One RSS source, fetched once per call.
pub struct RssNewsFeed {
    source: String,
    url: String,
    client: ClientWithMiddleware,
    max_items: usize,
}

impl RssNewsFeed {
    pub fn new(source: &str, url: &str, client: ClientWithMiddleware, max_items: usize) -> Self {
        Self {
            source: source.to_string(),
            url: url.to_string(),
            client,
            max_items,
        }
    }
}

/// Convert a parsed channel into articles. Items without a title or link are dropped.
/// RSS dates are RFC 2822; unparsable or missing dates fall back to `now`.
pub fn channel_articles(
    channel: &Channel,
    source: &str,
    max_items: usize,
    now: DateTime<Utc>,
) -> Vec<NewArticle> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                debug!("Skipping entry with missing title/link");
                return None;
            }
            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(now);
            let tickers = item
                .categories()
                .iter()
                .map(|c| c.name().trim())
                .filter(|c| !c.is_empty() && c.len() <= 5 && c.chars().all(|ch| ch.is_ascii_uppercase()))
                .map(str::to_string)
                .collect();

            Some(NewArticle {
                source: source.to_string(),
                title: title.to_string(),
                url: link.to_string(),
                published_at,
                tickers,
                raw_text: item.description().unwrap_or("").trim().to_string(),
            })
        })
        .take(max_items)
        .collect()
}

#[async_trait]
impl NewsFeed for RssNewsFeed {
    fn name(&self) -> &str {
        &self.source
    }

    async fn fetch_articles(&self) -> Result<Vec<NewArticle>> {
        info!("Fetching feed: {} ({})", self.source, self.url);
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch RSS feed {}", self.url))?
            .error_for_status()?
            .bytes()
            .await?;

        let channel = Channel::read_from(Cursor::new(bytes))
            .with_context(|| format!("Failed to parse RSS feed {}", self.url))?;
        let articles = channel_articles(&channel, &self.source, self.max_items, Utc::now());
        info!("  -> {} entries from {}", articles.len(), self.source);
        Ok(articles)
    }
}
