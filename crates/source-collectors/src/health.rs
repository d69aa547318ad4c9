//! Health collectors. WHO and ProMED are both proxied RSS feeds with the
//! same shape, so one collector covers both with a per-source severity
//! floor (WHO outbreak notices run high, ProMED digests medium).

use crate::{normalize, parse_feed_time, Collector, CollectorResult, HttpFeed, SourceConfig};
use async_trait::async_trait;
use event_core::{Severity, UnifiedEvent};
use serde_json::json;

pub struct RssHealthCollector {
    config: SourceConfig,
    http: HttpFeed,
    severity: Severity,
}

impl RssHealthCollector {
    pub fn new(config: SourceConfig, http: HttpFeed, severity: Severity) -> Self {
        Self {
            config,
            http,
            severity,
        }
    }

    fn normalize_item(&self, item: crate::http::RssItem) -> UnifiedEvent {
        let raw = json!({
            "guid": item.guid.clone(),
            "title": item.title.clone(),
            "pubDate": item.pub_date.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: item.guid,
                title: item.title,
                summary: item.description,
                time: item.pub_date.as_deref().and_then(parse_feed_time),
                severity: Some(self.severity),
                tags: vec!["health".to_string()],
                url: item.link,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for RssHealthCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed = match self.http.fetch_rss(&self.config.endpoint).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .items
            .into_iter()
            .map(|item| self.normalize_item(item))
            .collect();
        CollectorResult::ok(events)
    }
}
