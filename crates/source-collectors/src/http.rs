//! Shared HTTP plumbing for collectors.
//!
//! Every call carries a bounded timeout so one slow feed becomes that
//! collector's failure instead of stalling the aggregation. RSS feeds go
//! through the rss2json proxy, which normalizes arbitrary RSS/Atom into a
//! single JSON shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const RSS_PROXY_URL: &str = "https://api.rss2json.com/v1/api.json";

/// Per-call timeout for all feed fetches.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("feed invalid: {0}")]
    Invalid(String),
}

/// Thin JSON/RSS fetch client shared by all collectors.
#[derive(Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET a JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))
    }

    /// Fetch an RSS feed through the rss2json proxy.
    pub async fn fetch_rss(&self, feed_url: &str) -> Result<RssFeed, FeedError> {
        let response = self
            .client
            .get(RSS_PROXY_URL)
            .query(&[("rss_url", feed_url)])
            .send()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let feed: RssFeed = response
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        if feed.status != "ok" {
            return Err(FeedError::Invalid(format!("proxy status {}", feed.status)));
        }

        Ok(feed)
    }
}

impl Default for HttpFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// rss2json response envelope.
#[derive(Debug, Deserialize)]
pub struct RssFeed {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_envelope_parses() {
        let raw = r#"{
            "status": "ok",
            "items": [
                {"guid": "g1", "title": "Alert", "description": "d", "pubDate": "2026-02-01 10:30:00", "link": "https://example.org/a"}
            ]
        }"#;
        let feed: RssFeed = serde_json::from_str(raw).unwrap();
        assert_eq!(feed.status, "ok");
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].pub_date.as_deref(), Some("2026-02-01 10:30:00"));
    }

    #[test]
    fn test_rss_item_tolerates_missing_fields() {
        let item: RssItem = serde_json::from_str("{}").unwrap();
        assert!(item.guid.is_none());
        assert!(item.title.is_none());
    }
}
