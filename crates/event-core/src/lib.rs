//! Canonical data model for the GeoWatch fusion pipeline.
//!
//! Every source feed converges to [`UnifiedEvent`]; the fusion stage attaches
//! a [`RiskAnalysis`] computed against nearby [`Asset`]s. Base event fields
//! are immutable once a normalizer has produced them — later stages only add
//! `ai_insights`, `translated` and `analysis`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod geo;

pub use geo::{haversine_km, DEG_TO_KM};

/// Ordinal event severity: low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Baseline threat contribution used by the risk engine.
    pub fn baseline_threat(&self) -> f64 {
        match self {
            Severity::Critical => 1.0,
            Severity::High => 0.8,
            Severity::Medium => 0.5,
            Severity::Low => 0.3,
        }
    }
}

/// Event domain category.
///
/// Unknown wire values collapse to `General` so a new upstream taxonomy
/// entry never fails a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Natural,
    Cyber,
    Protests,
    Conflicts,
    Health,
    Terrorism,
    Infrastructure,
    Geopolitics,
    Transport,
    #[serde(other)]
    General,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Natural => "natural",
            EventCategory::Cyber => "cyber",
            EventCategory::Protests => "protests",
            EventCategory::Conflicts => "conflicts",
            EventCategory::Health => "health",
            EventCategory::Terrorism => "terrorism",
            EventCategory::Infrastructure => "infrastructure",
            EventCategory::Geopolitics => "geopolitics",
            EventCategory::Transport => "transport",
            EventCategory::General => "general",
        }
    }
}

/// The canonical normalized event record.
///
/// Invariants:
/// - `severity` and `confidence` are always present.
/// - `lat`/`lon` are either both present or both absent. Normalizers go
///   through [`UnifiedEvent::set_coords`] so a partial pair cannot appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedEvent {
    pub id: String,
    /// Human-readable origin label ("USGS", "GDACS", ...).
    pub source: String,
    pub category: EventCategory,
    pub severity: Severity,
    /// Source reliability weight in [0, 1].
    pub confidence: f64,
    pub title: String,
    pub summary: String,
    /// Event occurrence time, not ingestion time.
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Untouched original record, opaque to downstream consumers.
    #[serde(rename = "rawPayload", default)]
    pub raw_payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<Translation>,
    /// Populated only for geolocated high/critical events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<RiskAnalysis>,
}

impl UnifiedEvent {
    /// Coordinates when the event is geolocated.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Set both coordinates at once, rejecting non-finite values.
    /// Keeps the both-or-neither invariant intact.
    pub fn set_coords(&mut self, lat: f64, lon: f64) {
        if lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) {
            self.lat = Some(lat);
            self.lon = Some(lon);
        }
    }

    /// Whether the fusion analyzer should run on this event.
    pub fn qualifies_for_analysis(&self) -> bool {
        self.coords().is_some() && self.severity >= Severity::High
    }
}

/// Optional AI enrichment bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_objects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_transcript: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (hostile) to 1.0 (benign).
    pub score: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub title: String,
    pub summary: String,
    pub lang: String,
}

/// Infrastructure asset kinds the risk engine knows how to profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    NuclearPowerPlant,
    PowerPlant,
    Substation,
    DataCenter,
    TelecomTower,
    Airport,
    Seaport,
    SubmarineCable,
    Vessel,
    #[serde(other)]
    Other,
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// An infrastructure entity returned by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub name: String,
    pub location: GeoPoint,
    /// Free-form provenance bag (operator, capacity, vessel speed, ...).
    #[serde(default)]
    pub details: Value,
    /// Overwritten by the risk engine within one analysis pass; never
    /// persisted across events.
    #[serde(default)]
    pub risk_score: u8,
}

impl Asset {
    /// Vessel speed in knots when the details bag carries one.
    pub fn speed_knots(&self) -> Option<f64> {
        self.details.get("speed").and_then(Value::as_f64)
    }
}

/// Asset annotated with the per-event risk computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactedAsset {
    #[serde(flatten)]
    pub asset: Asset,
    /// Distance from the event in km.
    pub distance: f64,
    pub risk_score: u8,
    pub vulnerability: f64,
    pub criticality: f64,
    pub impact_type: ImpactType,
    pub estimated_damage: String,
    /// Correlation alert (e.g. drifting vessel over a cable). Typed field,
    /// not a details-bag side channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    DirectHit,
    Shockwave,
}

/// Risk level derived from the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed thresholds: >80 critical, >50 high, >20 medium, else low.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 80 => RiskLevel::Critical,
            s if s > 50 => RiskLevel::High,
            s if s > 20 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// Current weather snapshot used for threat amplification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherContext {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub condition: String,
}

/// Diagnostic factor breakdown attached to every analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactors {
    pub threat_score: f64,
    pub consequence_score: f64,
    pub vulnerability_score: f64,
}

/// Per-event aggregate risk analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Global risk, 0-100.
    pub score: u8,
    pub level: RiskLevel,
    /// Sorted descending by `risk_score`.
    pub impacted_assets: Vec<ImpactedAsset>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_context: Option<WeatherContext>,
    pub factors: RiskFactors,
    pub timestamp: DateTime<Utc>,
}
