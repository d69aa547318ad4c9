//! Infrastructure collectors: IODA outage summaries and the TeleGeography
//! submarine cable map.

use crate::{normalize, Collector, CollectorResult, HttpFeed, SourceConfig};
use async_trait::async_trait;
use event_core::{Severity, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;

/// Cable entries kept per run. The map is static inventory, not alerting,
/// so a handful is enough context.
const CABLE_CAP: usize = 5;

/// IODA outage summary feed.
pub struct IodaCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct IodaFeed {
    #[serde(default)]
    data: Vec<IodaOutage>,
}

#[derive(Debug, Deserialize)]
struct IodaOutage {
    entity: Option<IodaEntity>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IodaEntity {
    code: Option<String>,
    name: Option<String>,
}

impl IodaCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_outage(&self, outage: IodaOutage) -> UnifiedEvent {
        let name = outage
            .entity
            .as_ref()
            .and_then(|e| e.name.clone())
            .unwrap_or_else(|| "Unknown region".to_string());
        let code = outage.entity.as_ref().and_then(|e| e.code.clone());
        let score = outage.score.unwrap_or(0.0);

        let raw = json!({
            "entity": code.clone(),
            "score": score,
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: code.map(|c| format!("ioda-{c}")),
                title: Some(format!("Internet Outage: {name}")),
                summary: Some(format!(
                    "Significant drop in connectivity detected. Outage score: {score}."
                )),
                severity: Some(Severity::High),
                tags: vec![
                    "internet".to_string(),
                    "outage".to_string(),
                    "infrastructure".to_string(),
                ],
                url: Some("https://ioda.inetintel.cc.gatech.edu/".to_string()),
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for IodaCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed: IodaFeed = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .data
            .into_iter()
            .map(|o| self.normalize_outage(o))
            .collect();
        CollectorResult::ok(events)
    }
}

/// TeleGeography cable map. Static inventory surfaced as low-severity
/// context events so operators see charted routes near live incidents.
pub struct SubmarineCableCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct CableMap {
    #[serde(default)]
    features: Vec<CableFeature>,
}

#[derive(Debug, Deserialize)]
struct CableFeature {
    properties: CableProperties,
    geometry: Option<CableGeometry>,
}

#[derive(Debug, Deserialize)]
struct CableProperties {
    id: Option<String>,
    name: Option<String>,
    owners: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CableGeometry {
    /// MultiLineString: segments of `[lon, lat]` pairs.
    #[serde(default)]
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl SubmarineCableCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_feature(&self, feature: CableFeature) -> UnifiedEvent {
        // Landing-point approximation: the first charted vertex.
        let coords = feature
            .geometry
            .as_ref()
            .and_then(|g| g.coordinates.first())
            .and_then(|segment| segment.first())
            .map(|&[lon, lat]| (lat, lon));
        let props = feature.properties;

        let raw = json!({
            "id": props.id.clone(),
            "name": props.name.clone(),
            "owners": props.owners.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: props.id,
                title: props.name,
                summary: Some(format!(
                    "Submarine Cable. Owners: {}",
                    props.owners.as_deref().unwrap_or("Unknown")
                )),
                severity: Some(Severity::Low),
                confidence: Some(1.0),
                coords,
                tags: vec!["cable".to_string(), "infrastructure".to_string()],
                url: props.url,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for SubmarineCableCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let map: CableMap = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(map) => map,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = map
            .features
            .into_iter()
            .take(CABLE_CAP)
            .map(|f| self.normalize_feature(f))
            .collect();
        CollectorResult::ok(events)
    }
}
