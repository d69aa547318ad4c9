//! Pure risk scoring functions.
//!
//! Implements the multiplicative model:
//!
//! ```text
//! risk = threat * proximity * vulnerability * criticality
//! ```
//!
//! Any factor at zero collapses the score to zero — an asset outside the
//! impact radius or a fully hardened asset contributes nothing. No additive
//! base risk leaks through. All functions here are side-effect free; the
//! fusion analyzer owns I/O and orchestration.

use event_core::{AssetType, Severity, UnifiedEvent, WeatherContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wind speed above which weather amplifies fire/storm threats (km/h).
pub const WIND_AMPLIFICATION_KPH: f64 = 50.0;

/// Vulnerability (0 = hardened, 1 = fragile) and criticality
/// (0 = minor, 1 = severe consequence if lost) per asset type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetProfile {
    pub vulnerability: f64,
    pub criticality: f64,
}

/// Fixed vulnerability/criticality lookup.
///
/// Unknown types get the neutral (0.5, 0.5) profile.
pub fn asset_profile(asset_type: AssetType) -> AssetProfile {
    let (vulnerability, criticality) = match asset_type {
        AssetType::NuclearPowerPlant => (0.1, 1.0), // Hardened but critical
        AssetType::PowerPlant => (0.3, 0.8),
        AssetType::Substation => (0.4, 0.6),
        AssetType::SubmarineCable => (0.8, 0.9), // Fragile and critical
        AssetType::TelecomTower => (0.6, 0.5),
        AssetType::DataCenter => (0.2, 0.7),
        AssetType::Vessel => (0.5, 0.5),
        AssetType::Airport => (0.3, 0.7),
        AssetType::Seaport => (0.3, 0.7),
        AssetType::Other => (0.5, 0.5),
    };
    AssetProfile {
        vulnerability,
        criticality,
    }
}

/// Normalized threat score in [0, 1].
///
/// Baseline from severity (critical 1.0, high 0.8, medium 0.5, low 0.3),
/// amplified when strong wind meets a fire (+0.2) or storm (+0.1) event.
/// Amplifications are additive and independently applicable, capped at 1.0.
pub fn threat_score(event: &UnifiedEvent, weather: Option<&WeatherContext>) -> f64 {
    let mut score = event.severity.baseline_threat();

    if let Some(wx) = weather {
        if wx.wind_kph > WIND_AMPLIFICATION_KPH {
            let title = event.title.to_lowercase();
            if title.contains("fire") {
                score += 0.2;
            }
            if title.contains("storm") {
                score += 0.1;
            }
        }
    }

    score.min(1.0)
}

/// Result of one per-asset risk computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCalc {
    /// Integer risk score, 0-100.
    pub score: u8,
    pub vulnerability: f64,
    pub criticality: f64,
    /// Human-readable factor trace for diagnostics.
    pub details: String,
}

/// Per-asset risk from threat, proximity and the asset profile.
///
/// Proximity decays linearly from 1 at the event center to 0 at the impact
/// radius edge and never goes negative.
pub fn calculate_risk(
    threat: f64,
    asset_type: AssetType,
    distance_km: f64,
    impact_radius_km: f64,
) -> RiskCalc {
    let profile = asset_profile(asset_type);

    let proximity = if impact_radius_km > 0.0 {
        (1.0 - distance_km / impact_radius_km).max(0.0)
    } else {
        0.0
    };

    let effective_threat = threat * proximity;
    let risk = effective_threat * profile.vulnerability * profile.criticality;
    let score = (risk * 100.0).round().clamp(0.0, 100.0) as u8;

    debug!(
        ?asset_type,
        distance_km, impact_radius_km, score, "per-asset risk computed"
    );

    RiskCalc {
        score,
        vulnerability: profile.vulnerability,
        criticality: profile.criticality,
        details: format!(
            "T({:.2}) * V({}) * C({})",
            effective_threat, profile.vulnerability, profile.criticality
        ),
    }
}

/// Threat baseline for a bare severity, without any event context.
/// Convenience for callers that only hold a severity.
pub fn severity_threat(severity: Severity) -> f64 {
    severity.baseline_threat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use event_core::EventCategory;
    use serde_json::Value;

    fn make_event(severity: Severity, title: &str) -> UnifiedEvent {
        UnifiedEvent {
            id: "evt-1".to_string(),
            source: "Test".to_string(),
            category: EventCategory::Natural,
            severity,
            confidence: 1.0,
            title: title.to_string(),
            summary: String::new(),
            time: Utc::now(),
            lat: None,
            lon: None,
            country: None,
            tags: vec![],
            url: None,
            raw_payload: Value::Null,
            ai_insights: None,
            translated: None,
            analysis: None,
        }
    }

    fn windy(wind_kph: f64) -> WeatherContext {
        WeatherContext {
            temp_c: 20.0,
            wind_kph,
            condition: "Clear sky".to_string(),
        }
    }

    #[test]
    fn test_threat_baselines() {
        assert_eq!(threat_score(&make_event(Severity::Critical, "x"), None), 1.0);
        assert_eq!(threat_score(&make_event(Severity::High, "x"), None), 0.8);
        assert_eq!(threat_score(&make_event(Severity::Medium, "x"), None), 0.5);
        assert_eq!(threat_score(&make_event(Severity::Low, "x"), None), 0.3);
    }

    #[test]
    fn test_wind_amplifies_fire_and_storm() {
        let fire = make_event(Severity::Medium, "Wildfire near ridge");
        let wx = windy(60.0);
        assert!((threat_score(&fire, Some(&wx)) - 0.7).abs() < 1e-9);

        let storm = make_event(Severity::Medium, "Tropical Storm warning");
        assert!((threat_score(&storm, Some(&wx)) - 0.6).abs() < 1e-9);

        // Both keywords stack additively
        let both = make_event(Severity::Medium, "Firestorm advisory");
        assert!((threat_score(&both, Some(&wx)) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_amplification_caps_at_one() {
        let event = make_event(Severity::Critical, "Fire and storm front");
        let wx = windy(80.0);
        assert_eq!(threat_score(&event, Some(&wx)), 1.0);
    }

    #[test]
    fn test_calm_wind_never_amplifies() {
        let fire = make_event(Severity::Medium, "Fire reported");
        let wx = windy(30.0);
        assert_eq!(threat_score(&fire, Some(&wx)), 0.5);
    }

    #[test]
    fn test_profile_table() {
        let cable = asset_profile(AssetType::SubmarineCable);
        assert_eq!(cable.vulnerability, 0.8);
        assert_eq!(cable.criticality, 0.9);

        let nuclear = asset_profile(AssetType::NuclearPowerPlant);
        assert_eq!(nuclear.vulnerability, 0.1);
        assert_eq!(nuclear.criticality, 1.0);

        let unknown = asset_profile(AssetType::Other);
        assert_eq!(unknown.vulnerability, 0.5);
        assert_eq!(unknown.criticality, 0.5);
    }

    #[test]
    fn test_outside_radius_scores_zero() {
        // Proximity clamps to zero at and past the radius edge
        let calc = calculate_risk(1.0, AssetType::SubmarineCable, 100.0, 50.0);
        assert_eq!(calc.score, 0);

        let edge = calculate_risk(1.0, AssetType::PowerPlant, 50.0, 50.0);
        assert_eq!(edge.score, 0);
    }

    #[test]
    fn test_zero_radius_scores_zero() {
        let calc = calculate_risk(1.0, AssetType::SubmarineCable, 0.0, 0.0);
        assert_eq!(calc.score, 0);
    }

    #[test]
    fn test_cable_outscores_nuclear_plant() {
        // V*C: cable 0.72 vs nuclear 0.10 — fragility dominates hardening
        let cable = calculate_risk(1.0, AssetType::SubmarineCable, 10.0, 100.0);
        let nuclear = calculate_risk(1.0, AssetType::NuclearPowerPlant, 10.0, 100.0);
        assert!(cable.score > nuclear.score);

        // proximity 0.9 -> 0.9 * 0.8 * 0.9 = 0.648
        assert_eq!(cable.score, 65);
        // 0.9 * 0.1 * 1.0 = 0.09
        assert_eq!(nuclear.score, 9);
    }

    #[test]
    fn test_direct_hit_scores_full_product() {
        let calc = calculate_risk(1.0, AssetType::SubmarineCable, 0.0, 50.0);
        assert_eq!(calc.score, 72); // 1.0 * 0.8 * 0.9
        assert!(calc.details.contains("V(0.8)"));
    }
}
