//! Gateway client with direct-aggregation fallback.
//!
//! Consumers prefer the shared gateway (which caches) but keep working
//! when it is down by collecting straight from the sources.

use crate::Pipeline;
use event_core::UnifiedEvent;
use tracing::warn;

pub struct FallbackClient {
    client: reqwest::Client,
    gateway_url: Option<String>,
}

impl FallbackClient {
    pub fn new(client: reqwest::Client, gateway_url: Option<String>) -> Self {
        Self {
            client,
            gateway_url,
        }
    }

    /// Gateway base URL from `GEOWATCH_GATEWAY_URL`, if set.
    pub fn from_env(client: reqwest::Client) -> Self {
        let gateway_url = std::env::var("GEOWATCH_GATEWAY_URL")
            .ok()
            .filter(|u| !u.is_empty());
        Self::new(client, gateway_url)
    }

    async fn fetch_from_gateway(&self, base_url: &str) -> Result<Vec<UnifiedEvent>, String> {
        let url = format!("{}/api/v1/events", base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("gateway returned status {}", response.status()));
        }
        response.json().await.map_err(|e| e.to_string())
    }

    /// Events from the gateway when reachable, otherwise a direct
    /// aggregation run. Same shape either way.
    pub async fn fetch_events(&self, pipeline: &Pipeline) -> Vec<UnifiedEvent> {
        if let Some(base_url) = self.gateway_url.as_deref() {
            match self.fetch_from_gateway(base_url).await {
                Ok(events) => return events,
                Err(e) => {
                    warn!(gateway = base_url, "gateway unreachable, collecting directly: {e}");
                }
            }
        }
        pipeline.fetch_all_events().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_gateway_reports_error() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let fallback = FallbackClient::new(client, Some("http://127.0.0.1:9".to_string()));
        let err = fallback
            .fetch_from_gateway("http://127.0.0.1:9")
            .await
            .unwrap_err();
        assert!(!err.is_empty());
        assert!(fallback.gateway_url.is_some());
    }
}
