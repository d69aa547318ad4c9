//! Fusion analyzer: correlates one event with nearby infrastructure,
//! weather and maritime traffic, and attaches a risk analysis.
//!
//! Everything network-facing degrades; the scoring itself is pure
//! functions over resolved assets so the interesting behavior is testable
//! offline.

use crate::enrich::Enricher;
use chrono::Utc;
use event_core::geo::euclidean_deg_km;
use event_core::{
    Asset, EventCategory, ImpactType, ImpactedAsset, RiskAnalysis, RiskFactors, RiskLevel,
    UnifiedEvent,
};
use infra_resolver::{InfraResolver, WeatherResolver};
use regex::Regex;
use risk_engine::{calculate_risk, threat_score};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::{info, warn};

/// A vessel below this speed over a charted cable is treated as anchored
/// or drifting on it.
pub const DRIFT_SPEED_KNOTS: f64 = 1.0;

/// Degree window for the vessel-over-cable correlation.
pub const CABLE_CORRELATION_DEG: f64 = 0.05;

/// Score forced onto a cable with a correlated drifting vessel.
pub const CORRELATED_CABLE_SCORE: u8 = 95;

fn magnitude_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Magnitude: ([0-9.]+)").unwrap())
}

/// Radius of concern in km, derived from category and, for earthquakes,
/// the magnitude embedded in the normalized summary.
pub fn impact_radius_km(event: &UnifiedEvent) -> f64 {
    if event.category == EventCategory::Natural {
        let quake = event.title.to_lowercase().contains("earthquake")
            || event.tags.iter().any(|t| t == "earthquake");
        if quake {
            let mag = magnitude_pattern()
                .captures(&event.summary)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            return if mag >= 8.0 {
                300.0
            } else if mag >= 7.0 {
                100.0
            } else if mag >= 6.0 {
                50.0
            } else {
                20.0
            };
        }
        return 30.0;
    }
    if event.category == EventCategory::Conflicts {
        return 10.0;
    }
    5.0
}

/// A drifting vessel sitting on a charted cable route.
#[derive(Debug, Clone, PartialEq)]
pub struct CableThreat {
    pub cable_id: String,
    pub vessel_id: String,
    pub vessel_name: String,
}

/// Every (cable, vessel) pair where the vessel is near-stationary within
/// [`CABLE_CORRELATION_DEG`] of the cable.
pub fn correlate_cable_threats(cables: &[Asset], vessels: &[Asset]) -> Vec<CableThreat> {
    let mut threats = Vec::new();
    for cable in cables {
        for vessel in vessels {
            let drifting = vessel
                .speed_knots()
                .map(|s| s < DRIFT_SPEED_KNOTS)
                .unwrap_or(false);
            let close = (vessel.location.lat - cable.location.lat).abs() < CABLE_CORRELATION_DEG
                && (vessel.location.lon - cable.location.lon).abs() < CABLE_CORRELATION_DEG;
            if drifting && close {
                threats.push(CableThreat {
                    cable_id: cable.id.clone(),
                    vessel_id: vessel.id.clone(),
                    vessel_name: vessel.name.clone(),
                });
            }
        }
    }
    threats
}

fn merge_math(details: &Value, math: &str) -> Value {
    match details {
        Value::Object(map) => {
            let mut map = map.clone();
            map.insert("math".to_string(), Value::String(math.to_string()));
            Value::Object(map)
        }
        _ => json!({ "math": math }),
    }
}

/// Score every asset against the event. Correlated cables are overridden
/// to [`CORRELATED_CABLE_SCORE`] and carry a typed alert.
pub fn score_assets(
    event_lat: f64,
    event_lon: f64,
    threat: f64,
    radius_km: f64,
    assets: Vec<Asset>,
    threats: &[CableThreat],
) -> Vec<ImpactedAsset> {
    assets
        .into_iter()
        .map(|asset| {
            let distance = euclidean_deg_km(
                asset.location.lat,
                asset.location.lon,
                event_lat,
                event_lon,
            );
            let mut calc = calculate_risk(threat, asset.asset_type, distance, radius_km);

            let alert = threats
                .iter()
                .find(|t| t.cable_id == asset.id)
                .map(|t| format!("THREAT: {} Anchored Nearby!", t.vessel_name));
            if alert.is_some() {
                calc.score = CORRELATED_CABLE_SCORE;
            }

            let details = merge_math(&asset.details, &calc.details);
            let impact_type = if calc.score > 80 {
                ImpactType::DirectHit
            } else {
                ImpactType::Shockwave
            };
            let estimated_damage = if calc.score > 80 {
                "Critical Failure"
            } else {
                "Operational Risk"
            };

            ImpactedAsset {
                asset: Asset {
                    details,
                    risk_score: calc.score,
                    ..asset
                },
                distance,
                risk_score: calc.score,
                vulnerability: calc.vulnerability,
                criticality: calc.criticality,
                impact_type,
                estimated_damage: estimated_damage.to_string(),
                alert,
            }
        })
        .collect()
}

/// Global score over the scored assets: sum of the top five, dampened by
/// a third and clamped to 100. Sorts the slice descending as a side
/// effect so callers ship it ordered.
pub fn aggregate_score(impacted: &mut [ImpactedAsset]) -> u8 {
    impacted.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    let total: u32 = impacted
        .iter()
        .take(5)
        .map(|a| a.risk_score as u32)
        .sum();
    ((total as f64 / 3.0).round().min(100.0)) as u8
}

fn recommendation_for(impacted: &[ImpactedAsset]) -> String {
    match impacted.iter().map(|a| a.risk_score).max() {
        Some(max) => format!(
            "Alert: {} assets at risk. Max Risk: {}%",
            impacted.len(),
            max
        ),
        None => "No significant infrastructure risk.".to_string(),
    }
}

/// Per-event fusion front end.
pub struct FusionAnalyzer {
    resolver: InfraResolver,
    weather: WeatherResolver,
    enricher: Enricher,
}

impl FusionAnalyzer {
    pub fn new(resolver: InfraResolver, weather: WeatherResolver, enricher: Enricher) -> Self {
        Self {
            resolver,
            weather,
            enricher,
        }
    }

    /// Wire up from the environment: `GEOWATCH_OVERPASS_URL` overrides the
    /// Overpass endpoint, AI capabilities come from `Enricher::from_env`.
    pub fn from_env() -> Self {
        let client = InfraResolver::default_client();
        let resolver = match std::env::var("GEOWATCH_OVERPASS_URL") {
            Ok(url) if !url.is_empty() => {
                InfraResolver::with_overpass_url(client.clone(), url)
            }
            _ => InfraResolver::new(client.clone()),
        };
        Self::new(
            resolver,
            WeatherResolver::new(client.clone()),
            Enricher::from_env(client),
        )
    }

    /// Enrich and analyze one event. Never errors: every failing upstream
    /// leg degrades to an empty contribution.
    pub async fn analyze_event_impact(&self, event: UnifiedEvent) -> UnifiedEvent {
        let mut event = self.enricher.enrich(event).await;
        let radius_km = impact_radius_km(&event);

        let (infra, cables, vessels, weather) = match event.coords() {
            Some((lat, lon)) => {
                let (infra, weather) = tokio::join!(
                    self.resolver.fetch_nearby_infrastructure(lat, lon, radius_km),
                    self.weather.fetch_event_weather(lat, lon)
                );
                let infra = match infra {
                    Ok(assets) => assets,
                    Err(e) => {
                        warn!(event = %event.id, "infrastructure lookup failed: {e}");
                        Vec::new()
                    }
                };
                let cables = self.resolver.nearby_cables(lat, lon, radius_km);
                let vessels = self.resolver.nearby_vessels(lat, lon, Utc::now());
                (infra, cables, vessels, weather)
            }
            None => (Vec::new(), Vec::new(), Vec::new(), None),
        };

        let threats = correlate_cable_threats(&cables, &vessels);
        if !threats.is_empty() {
            info!(
                event = %event.id,
                count = threats.len(),
                "drifting vessel correlated with cable route"
            );
        }

        let threat = threat_score(&event, weather.as_ref());
        let (event_lat, event_lon) = event.coords().unwrap_or((0.0, 0.0));

        let mut assets = infra;
        assets.extend(cables);
        assets.extend(vessels);
        let mut impacted =
            score_assets(event_lat, event_lon, threat, radius_km, assets, &threats);
        let score = aggregate_score(&mut impacted);

        event.analysis = Some(RiskAnalysis {
            score,
            level: RiskLevel::from_score(score),
            recommendation: recommendation_for(&impacted),
            impacted_assets: impacted,
            weather_context: weather,
            factors: RiskFactors {
                threat_score: threat,
                consequence_score: 0.8,
                vulnerability_score: 0.5,
            },
            timestamp: Utc::now(),
        });
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use event_core::{AssetType, GeoPoint, Severity};

    fn event(category: EventCategory, title: &str, summary: &str) -> UnifiedEvent {
        UnifiedEvent {
            id: "e1".to_string(),
            source: "Test".to_string(),
            category,
            severity: Severity::Critical,
            confidence: 1.0,
            title: title.to_string(),
            summary: summary.to_string(),
            time: Utc::now(),
            lat: Some(35.0),
            lon: Some(139.8),
            country: None,
            tags: vec![],
            url: None,
            raw_payload: Value::Null,
            ai_insights: None,
            translated: None,
            analysis: None,
        }
    }

    fn asset(id: &str, asset_type: AssetType, lat: f64, lon: f64, details: Value) -> Asset {
        Asset {
            id: id.to_string(),
            asset_type,
            name: id.to_string(),
            location: GeoPoint { lat, lon },
            details,
            risk_score: 0,
        }
    }

    #[test]
    fn test_earthquake_radius_by_magnitude() {
        let radius = |summary: &str| {
            impact_radius_km(&event(
                EventCategory::Natural,
                "M 8.1 - offshore",
                summary,
            ))
        };
        // title lacks "earthquake" but normalized quakes carry the tag
        let mut quake = event(EventCategory::Natural, "M 8.1 - offshore", "Magnitude: 8.1. Depth: 30 km.");
        quake.tags.push("earthquake".to_string());
        assert_eq!(impact_radius_km(&quake), 300.0);

        let mut quake7 = quake.clone();
        quake7.summary = "Magnitude: 7.2. Depth: 10 km.".to_string();
        assert_eq!(impact_radius_km(&quake7), 100.0);

        let mut quake6 = quake.clone();
        quake6.summary = "Magnitude: 6.0. Depth: 10 km.".to_string();
        assert_eq!(impact_radius_km(&quake6), 50.0);

        let mut small = quake.clone();
        small.summary = "Magnitude: 4.4. Depth: 5 km.".to_string();
        assert_eq!(impact_radius_km(&small), 20.0);

        // Non-quake natural events get the generic storm/flood radius
        assert_eq!(radius("Flooding along the coast"), 30.0);
    }

    #[test]
    fn test_radius_by_category() {
        assert_eq!(
            impact_radius_km(&event(EventCategory::Conflicts, "Clashes", "")),
            10.0
        );
        assert_eq!(
            impact_radius_km(&event(EventCategory::Cyber, "CVE", "")),
            5.0
        );
    }

    #[test]
    fn test_correlation_requires_drift_and_proximity() {
        let cables = vec![asset(
            "cable-1",
            AssetType::SubmarineCable,
            35.0,
            139.8,
            json!({}),
        )];
        let drifting = asset(
            "vessel-1",
            AssetType::Vessel,
            35.02,
            139.82,
            json!({"speed": 0.0}),
        );
        let underway = asset(
            "vessel-2",
            AssetType::Vessel,
            35.02,
            139.82,
            json!({"speed": 11.0}),
        );
        let far = asset(
            "vessel-3",
            AssetType::Vessel,
            35.2,
            139.8,
            json!({"speed": 0.0}),
        );

        let threats = correlate_cable_threats(
            &cables,
            &[drifting.clone(), underway, far],
        );
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].cable_id, "cable-1");
        assert_eq!(threats[0].vessel_name, "vessel-1");
    }

    #[test]
    fn test_correlated_cable_overridden_to_95_with_alert() {
        let cable = asset("cable-1", AssetType::SubmarineCable, 35.0, 139.8, json!({}));
        let threats = vec![CableThreat {
            cable_id: "cable-1".to_string(),
            vessel_id: "vessel-1".to_string(),
            vessel_name: "Kestrel".to_string(),
        }];
        // Distance beyond the radius would normally score zero
        let impacted = score_assets(36.0, 139.8, 1.0, 10.0, vec![cable], &threats);
        assert_eq!(impacted[0].risk_score, 95);
        assert_eq!(impacted[0].impact_type, ImpactType::DirectHit);
        assert_eq!(impacted[0].estimated_damage, "Critical Failure");
        assert_eq!(
            impacted[0].alert.as_deref(),
            Some("THREAT: Kestrel Anchored Nearby!")
        );
    }

    #[test]
    fn test_uncorrelated_assets_score_normally() {
        let plant = asset("plant-1", AssetType::PowerPlant, 35.01, 139.8, json!({}));
        let impacted = score_assets(35.0, 139.8, 1.0, 50.0, vec![plant], &[]);
        // d ≈ 1.11 km, prox ≈ 0.978, 1.0 * 0.978 * 0.3 * 0.8 ≈ 0.235
        assert_eq!(impacted[0].risk_score, 23);
        assert_eq!(impacted[0].impact_type, ImpactType::Shockwave);
        assert!(impacted[0].alert.is_none());
        assert!(impacted[0].asset.details.get("math").is_some());
    }

    #[test]
    fn test_aggregate_dampening_and_clamp() {
        let make = |score: u8| {
            let a = asset("a", AssetType::Vessel, 0.0, 0.0, json!({}));
            ImpactedAsset {
                asset: a,
                distance: 0.0,
                risk_score: score,
                vulnerability: 0.5,
                criticality: 0.5,
                impact_type: ImpactType::Shockwave,
                estimated_damage: "Operational Risk".to_string(),
                alert: None,
            }
        };

        // Six max-risk assets: only five count, 500/3 clamps to 100
        let mut many: Vec<_> = (0..6).map(|_| make(100)).collect();
        assert_eq!(aggregate_score(&mut many), 100);

        // A single moderate asset dampens to a third
        let mut one = vec![make(60)];
        assert_eq!(aggregate_score(&mut one), 20);

        let mut none: Vec<ImpactedAsset> = Vec::new();
        assert_eq!(aggregate_score(&mut none), 0);
    }

    #[test]
    fn test_aggregate_sorts_descending() {
        let make = |id: &str, score: u8| {
            let a = asset(id, AssetType::Vessel, 0.0, 0.0, json!({}));
            ImpactedAsset {
                asset: a,
                distance: 0.0,
                risk_score: score,
                vulnerability: 0.5,
                criticality: 0.5,
                impact_type: ImpactType::Shockwave,
                estimated_damage: "Operational Risk".to_string(),
                alert: None,
            }
        };
        let mut assets = vec![make("low", 10), make("high", 90), make("mid", 50)];
        aggregate_score(&mut assets);
        let ids: Vec<_> = assets.iter().map(|a| a.asset.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_recommendation_strings() {
        assert_eq!(
            recommendation_for(&[]),
            "No significant infrastructure risk."
        );
        let a = asset("a", AssetType::Vessel, 0.0, 0.0, json!({}));
        let impacted = vec![ImpactedAsset {
            asset: a,
            distance: 0.0,
            risk_score: 95,
            vulnerability: 0.5,
            criticality: 0.5,
            impact_type: ImpactType::DirectHit,
            estimated_damage: "Critical Failure".to_string(),
            alert: None,
        }];
        assert_eq!(
            recommendation_for(&impacted),
            "Alert: 1 assets at risk. Max Risk: 95%"
        );
    }
}
