//! NOAA SWPC space weather alerts. The feed is a bare JSON array of
//! alert products with free-text bodies and no location.

use crate::{normalize, parse_feed_time, Collector, CollectorResult, HttpFeed, SourceConfig};
use async_trait::async_trait;
use event_core::{Severity, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;

pub struct SwpcCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct SwpcAlert {
    product_id: Option<String>,
    message: Option<String>,
    issue_datetime: Option<String>,
}

impl SwpcCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_alert(&self, alert: SwpcAlert) -> UnifiedEvent {
        let raw = json!({
            "product_id": alert.product_id.clone(),
            "issue_datetime": alert.issue_datetime.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: alert.product_id,
                title: alert
                    .message
                    .or_else(|| Some("Space Weather Alert".to_string())),
                summary: alert.issue_datetime.clone(),
                time: alert.issue_datetime.as_deref().and_then(parse_feed_time),
                severity: Some(Severity::Medium),
                tags: vec![
                    "space".to_string(),
                    "solar".to_string(),
                    "noaa".to_string(),
                ],
                url: Some("https://www.swpc.noaa.gov/".to_string()),
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for SwpcCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let alerts: Vec<SwpcAlert> = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(alerts) => alerts,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = alerts
            .into_iter()
            .map(|a| self.normalize_alert(a))
            .collect();
        CollectorResult::ok(events)
    }
}
