//! Nearby infrastructure resolution for the fusion pipeline.
//!
//! Three sub-sources feed one asset set:
//! - Overpass spatial queries for fixed infrastructure (power, telecom,
//!   transport),
//! - bundled submarine cable geometry,
//! - a simulated AIS fleet along fixed shipping lanes.
//!
//! The combined lookup is fail-open: a failing sub-source yields its empty
//! subset and the survivors are still returned. Radius policy is entirely
//! caller-determined.

use event_core::Asset;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub mod ais;
pub mod cables;
pub mod overpass;
pub mod weather;

pub use ais::fleet_snapshot;
pub use cables::nearby_cables;
pub use overpass::DEFAULT_OVERPASS_URL;
pub use weather::WeatherResolver;

/// Per-call HTTP timeout. A slow upstream becomes that sub-source's
/// failure instead of stalling the whole analysis.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream error: {0}")]
    Status(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Degree window used to keep only vessels plausibly relevant to an event.
pub const VESSEL_WINDOW_DEG: f64 = 1.0;

/// Resolver for fixed and floating infrastructure around a point.
pub struct InfraResolver {
    client: reqwest::Client,
    overpass_url: String,
}

impl InfraResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_overpass_url(client, DEFAULT_OVERPASS_URL)
    }

    pub fn with_overpass_url(client: reqwest::Client, overpass_url: impl Into<String>) -> Self {
        Self {
            client,
            overpass_url: overpass_url.into(),
        }
    }

    /// Build the shared HTTP client with the bounded per-call timeout.
    pub fn default_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default()
    }

    /// Fixed infrastructure from the Overpass index.
    pub async fn fetch_nearby_infrastructure(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Asset>, ResolverError> {
        overpass::fetch_nearby(&self.client, &self.overpass_url, lat, lon, radius_km).await
    }

    /// Cables whose charted route passes within `radius_km`.
    pub fn nearby_cables(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<Asset> {
        cables::nearby_cables(lat, lon, radius_km)
    }

    /// Simulated vessels within [`VESSEL_WINDOW_DEG`] of the point.
    pub fn nearby_vessels(&self, lat: f64, lon: f64, at: chrono::DateTime<chrono::Utc>) -> Vec<Asset> {
        ais::fleet_snapshot(at)
            .into_iter()
            .filter(|v| {
                (v.location.lat - lat).abs() < VESSEL_WINDOW_DEG
                    && (v.location.lon - lon).abs() < VESSEL_WINDOW_DEG
            })
            .collect()
    }

    /// Union of all sub-sources, fail-open.
    ///
    /// A failing Overpass query must not suppress cable or vessel results.
    pub async fn fetch_nearby_assets(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<Asset> {
        let mut assets = match self.fetch_nearby_infrastructure(lat, lon, radius_km).await {
            Ok(infra) => infra,
            Err(e) => {
                warn!(lat, lon, radius_km, "infrastructure lookup failed: {e}");
                Vec::new()
            }
        };

        assets.extend(self.nearby_cables(lat, lon, radius_km));
        assets.extend(self.nearby_vessels(lat, lon, chrono::Utc::now()));
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_vessel_window_filter() {
        let resolver = InfraResolver::new(InfraResolver::default_client());
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();

        // Tokyo Bay: the anchored Kestrel sits at (34.8, 139.8)
        let near_tokyo = resolver.nearby_vessels(35.0, 139.8, at);
        assert!(near_tokyo.iter().any(|v| v.id == "vessel-004"));

        // North Atlantic: no lanes simulated there
        let atlantic = resolver.nearby_vessels(45.0, -40.0, at);
        assert!(atlantic.is_empty());
    }

    #[tokio::test]
    async fn test_fail_open_returns_cables_when_overpass_unreachable() {
        // Point the resolver at a closed port: the Overpass leg fails fast
        // while cables and vessels still come back.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let resolver = InfraResolver::with_overpass_url(client, "http://127.0.0.1:9/interpreter");

        let assets = resolver.fetch_nearby_assets(35.0, 139.8, 50.0).await;
        assert!(
            assets.iter().any(|a| a.id == "cable-tokyo-bay-express"),
            "cable subset should survive an Overpass outage"
        );
        assert!(assets.iter().any(|a| a.id == "vessel-004"));
    }
}
