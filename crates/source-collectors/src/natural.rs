//! Natural disaster collectors: USGS, GDACS, NASA EONET and NOAA alerts.

use crate::{normalize, parse_feed_time, Collector, CollectorResult, HttpFeed, SourceConfig};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use event_core::{Severity, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// USGS GeoJSON summary feed.
pub struct UsgsEarthquakeCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct UsgsFeed {
    #[serde(default)]
    features: Vec<UsgsFeature>,
}

#[derive(Debug, Deserialize)]
struct UsgsFeature {
    id: Option<String>,
    properties: UsgsProperties,
    geometry: Option<UsgsGeometry>,
}

#[derive(Debug, Deserialize)]
struct UsgsProperties {
    mag: Option<f64>,
    title: Option<String>,
    /// Milliseconds since the Unix epoch.
    time: Option<i64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsgsGeometry {
    /// `[lon, lat, depth_km]`
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Magnitude to severity mapping used for all seismic events.
pub fn magnitude_severity(mag: f64) -> Severity {
    if mag >= 6.0 {
        Severity::Critical
    } else if mag >= 4.5 {
        Severity::High
    } else if mag >= 3.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl UsgsEarthquakeCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_feature(&self, feature: UsgsFeature) -> UnifiedEvent {
        let mag = feature.properties.mag.unwrap_or(0.0);
        let depth = feature
            .geometry
            .as_ref()
            .and_then(|g| g.coordinates.get(2))
            .copied();
        let coords = feature.geometry.as_ref().and_then(|g| {
            match (g.coordinates.get(1), g.coordinates.get(0)) {
                (Some(&lat), Some(&lon)) => Some((lat, lon)),
                _ => None,
            }
        });
        let time = feature
            .properties
            .time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        let raw = json!({
            "id": feature.id.clone(),
            "mag": mag,
            "depth_km": depth,
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: feature.id,
                title: feature.properties.title,
                summary: Some(format!(
                    "Magnitude: {}. Depth: {} km.",
                    mag,
                    depth.unwrap_or(0.0)
                )),
                time,
                severity: Some(magnitude_severity(mag)),
                confidence: Some(1.0),
                coords,
                tags: vec!["earthquake".to_string(), "seismic".to_string()],
                url: feature.properties.url,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for UsgsEarthquakeCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed: UsgsFeed = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        debug!(count = feed.features.len(), "usgs features fetched");
        let events = feed
            .features
            .into_iter()
            .map(|f| self.normalize_feature(f))
            .collect();
        CollectorResult::ok(events)
    }
}

/// GDACS alert feed via the RSS proxy.
pub struct GdacsCollector {
    config: SourceConfig,
    http: HttpFeed,
}

/// GDACS encodes alert level as a color word in the title or description.
pub fn gdacs_severity(title: &str, description: &str) -> Severity {
    if title.contains("Red") || description.contains("Red") {
        Severity::Critical
    } else if title.contains("Orange") || description.contains("Orange") {
        Severity::High
    } else {
        Severity::Medium
    }
}

impl GdacsCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_item(&self, item: crate::http::RssItem) -> UnifiedEvent {
        let title = item.title.clone().unwrap_or_default();
        let description = item.description.clone().unwrap_or_default();
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
                severity: Some(gdacs_severity(&title, &description)),
                confidence: Some(0.9),
                // The RSS proxy strips georss, so no charted position exists.
                coords: None,
                tags: vec!["disaster".to_string(), "gdacs".to_string()],
                url: item.link,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for GdacsCollector {
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

/// NASA EONET open events.
pub struct EonetCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct EonetFeed {
    #[serde(default)]
    events: Vec<EonetEvent>,
}

#[derive(Debug, Deserialize)]
struct EonetEvent {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    #[serde(default)]
    categories: Vec<EonetCategory>,
    #[serde(default)]
    geometry: Vec<EonetGeometry>,
}

#[derive(Debug, Deserialize)]
struct EonetCategory {
    id: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EonetGeometry {
    date: Option<DateTime<Utc>>,
    /// `[lon, lat]` for Point geometry.
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl EonetCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_event(&self, event: EonetEvent) -> UnifiedEvent {
        let category_title = event
            .categories
            .first()
            .and_then(|c| c.title.clone())
            .unwrap_or_else(|| "Unclassified".to_string());
        let category_id = event.categories.first().and_then(|c| c.id.clone());
        let geo = event.geometry.first();
        let coords = geo.and_then(|g| match (g.coordinates.get(1), g.coordinates.get(0)) {
            (Some(&lat), Some(&lon)) => Some((lat, lon)),
            _ => None,
        });

        let mut tags = vec!["nasa".to_string(), "satellite".to_string()];
        if let Some(id) = category_id {
            tags.push(id);
        }

        let summary = event
            .description
            .clone()
            .unwrap_or_else(|| format!("Event detected by NASA EONET ({category_title})"));
        let raw = json!({
            "id": event.id.clone(),
            "title": event.title.clone(),
            "category": category_title,
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: event.id,
                title: event.title,
                summary: Some(summary),
                time: geo.and_then(|g| g.date),
                severity: Some(Severity::Medium),
                confidence: Some(1.0),
                coords,
                tags,
                url: event.link,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for EonetCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed: EonetFeed = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .events
            .into_iter()
            .map(|e| self.normalize_event(e))
            .collect();
        CollectorResult::ok(events)
    }
}

/// NWS active alert feed.
pub struct NoaaAlertCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct NoaaFeed {
    #[serde(default)]
    features: Vec<NoaaFeature>,
}

#[derive(Debug, Deserialize)]
struct NoaaFeature {
    properties: NoaaProperties,
    geometry: Option<NoaaGeometry>,
}

#[derive(Debug, Deserialize)]
struct NoaaProperties {
    id: Option<String>,
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
    sent: Option<DateTime<Utc>>,
    effective: Option<DateTime<Utc>>,
    instruction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum NoaaGeometry {
    Polygon {
        /// Rings of `[lon, lat]` pairs.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    #[serde(other)]
    Other,
}

/// NWS severity vocabulary to the internal scale.
pub fn alert_severity(raw: Option<&str>) -> Severity {
    match raw {
        Some("Extreme") => Severity::Critical,
        Some("Severe") => Severity::High,
        Some("Moderate") => Severity::Medium,
        _ => Severity::Low,
    }
}

impl NoaaAlertCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_feature(&self, feature: NoaaFeature) -> UnifiedEvent {
        // Polygon alerts collapse to their first vertex. Zone-coded alerts
        // carry no geometry and stay unplotted.
        let coords = match &feature.geometry {
            Some(NoaaGeometry::Polygon { coordinates }) => coordinates
                .first()
                .and_then(|ring| ring.first())
                .map(|&[lon, lat]| (lat, lon)),
            _ => None,
        };
        let props = feature.properties;
        let event_name = props.event.clone().unwrap_or_default();

        let mut tags = vec!["weather".to_string(), "noaa".to_string()];
        if !event_name.is_empty() {
            tags.push(event_name);
        }

        let raw = json!({
            "id": props.id.clone(),
            "event": props.event.clone(),
            "severity": props.severity.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: props.id,
                title: props.headline.or(props.event),
                summary: props.description,
                time: props.sent.or(props.effective),
                severity: Some(alert_severity(props.severity.as_deref())),
                confidence: Some(0.95),
                coords,
                tags,
                url: props.instruction,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for NoaaAlertCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed: NoaaFeed = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .features
            .into_iter()
            .map(|f| self.normalize_feature(f))
            .collect();
        CollectorResult::ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_sources;
    use event_core::EventCategory;

    fn config_for(id: &str) -> SourceConfig {
        default_sources().into_iter().find(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_magnitude_severity_thresholds() {
        assert_eq!(magnitude_severity(6.0), Severity::Critical);
        assert_eq!(magnitude_severity(5.9), Severity::High);
        assert_eq!(magnitude_severity(4.5), Severity::High);
        assert_eq!(magnitude_severity(3.0), Severity::Medium);
        assert_eq!(magnitude_severity(2.9), Severity::Low);
    }

    #[test]
    fn test_usgs_feature_normalizes() {
        let collector =
            UsgsEarthquakeCollector::new(config_for("usgs_earthquake"), HttpFeed::new());
        let feature: UsgsFeature = serde_json::from_str(
            r#"{
                "id": "us7000abcd",
                "properties": {"mag": 6.2, "title": "M 6.2 - near Honshu", "time": 1767225600000, "url": "https://example.org/eq"},
                "geometry": {"coordinates": [139.8, 35.1, 40.0]}
            }"#,
        )
        .unwrap();

        let event = collector.normalize_feature(feature);
        assert_eq!(event.id, "us7000abcd");
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.category, EventCategory::Natural);
        assert_eq!(event.coords(), Some((35.1, 139.8)));
        assert_eq!(event.summary, "Magnitude: 6.2. Depth: 40 km.");
        assert!(event.tags.contains(&"earthquake".to_string()));
    }

    #[test]
    fn test_usgs_tolerates_missing_geometry() {
        let collector =
            UsgsEarthquakeCollector::new(config_for("usgs_earthquake"), HttpFeed::new());
        let feature: UsgsFeature =
            serde_json::from_str(r#"{"properties": {"mag": 2.1}}"#).unwrap();
        let event = collector.normalize_feature(feature);
        assert_eq!(event.severity, Severity::Low);
        assert_eq!(event.coords(), None);
        assert!(!event.id.is_empty());
    }

    #[test]
    fn test_gdacs_color_severity() {
        assert_eq!(gdacs_severity("Red alert: Cyclone", ""), Severity::Critical);
        assert_eq!(gdacs_severity("Flood", "Orange impact"), Severity::High);
        assert_eq!(gdacs_severity("Green alert", ""), Severity::Medium);
    }

    #[test]
    fn test_gdacs_item_leaves_coords_absent() {
        let collector = GdacsCollector::new(config_for("gdacs_disaster"), HttpFeed::new());
        let item = crate::http::RssItem {
            guid: Some("gdacs-1".to_string()),
            title: Some("Orange alert: Tropical Cyclone".to_string()),
            description: Some("Landfall expected".to_string()),
            pub_date: Some("2026-02-01 10:30:00".to_string()),
            link: Some("https://gdacs.org/1".to_string()),
        };
        let event = collector.normalize_item(item);
        assert_eq!(event.severity, Severity::High);
        assert_eq!(event.coords(), None);
        assert_eq!(event.confidence, 0.9);
    }

    #[test]
    fn test_eonet_event_uses_latest_geometry_and_category_tag() {
        let collector = EonetCollector::new(config_for("nasa_eonet"), HttpFeed::new());
        let raw: EonetEvent = serde_json::from_str(
            r#"{
                "id": "EONET_1",
                "title": "Wildfire, CA",
                "categories": [{"id": "wildfires", "title": "Wildfires"}],
                "geometry": [{"date": "2026-02-01T00:00:00Z", "coordinates": [-120.5, 38.2]}]
            }"#,
        )
        .unwrap();
        let event = collector.normalize_event(raw);
        assert_eq!(event.coords(), Some((38.2, -120.5)));
        assert_eq!(event.severity, Severity::Medium);
        assert!(event.tags.contains(&"wildfires".to_string()));
        assert!(event.summary.contains("Wildfires"));
    }

    #[test]
    fn test_alert_severity_vocabulary() {
        assert_eq!(alert_severity(Some("Extreme")), Severity::Critical);
        assert_eq!(alert_severity(Some("Severe")), Severity::High);
        assert_eq!(alert_severity(Some("Moderate")), Severity::Medium);
        assert_eq!(alert_severity(Some("Minor")), Severity::Low);
        assert_eq!(alert_severity(None), Severity::Low);
    }

    #[test]
    fn test_noaa_polygon_first_vertex() {
        let collector = NoaaAlertCollector::new(config_for("noaa_weather"), HttpFeed::new());
        let feature: NoaaFeature = serde_json::from_str(
            r#"{
                "properties": {"id": "nws-1", "event": "Tornado Warning", "severity": "Extreme", "sent": "2026-02-01T10:00:00Z"},
                "geometry": {"type": "Polygon", "coordinates": [[[-97.1, 35.4], [-97.0, 35.5]]]}
            }"#,
        )
        .unwrap();
        let event = collector.normalize_feature(feature);
        assert_eq!(event.coords(), Some((35.4, -97.1)));
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.title, "Tornado Warning");
    }

    #[test]
    fn test_noaa_zone_alert_stays_unplotted() {
        let collector = NoaaAlertCollector::new(config_for("noaa_weather"), HttpFeed::new());
        let feature: NoaaFeature = serde_json::from_str(
            r#"{"properties": {"event": "Wind Advisory", "severity": "Moderate"}, "geometry": null}"#,
        )
        .unwrap();
        let event = collector.normalize_feature(feature);
        assert_eq!(event.coords(), None);
        assert_eq!(event.severity, Severity::Medium);
    }
}
