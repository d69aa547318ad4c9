//! Source registry and feed collectors.
//!
//! Each external feed gets one [`Collector`]: a fetch-and-normalize adapter
//! that never lets an error escape its own boundary — all failures come
//! back as `CollectorResult { events: [], error: Some(..) }`. Shared
//! normalization is a free function over an explicit [`PartialEvent`], not
//! inherited state, and new sources register one entry in the constructor
//! table instead of extending a class hierarchy.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use event_core::{EventCategory, Severity, UnifiedEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod conflict;
pub mod cyber;
pub mod health;
pub mod http;
pub mod infrastructure;
pub mod natural;
pub mod space;

pub use http::{FeedError, HttpFeed};

/// Static configuration for one external source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: EventCategory,
    pub enabled: bool,
    pub endpoint: String,
    pub api_key_required: bool,
}

impl SourceConfig {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        category: EventCategory,
        enabled: bool,
        endpoint: &str,
        api_key_required: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            enabled,
            endpoint: endpoint.to_string(),
            api_key_required,
        }
    }
}

/// A malformed registry is the one fail-fast error class: runtime fetch
/// errors degrade, setup errors do not.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate source id: {0}")]
    DuplicateId(String),
    #[error("enabled source {0} has an empty endpoint")]
    EmptyEndpoint(String),
    #[error("no source registered for id {0}")]
    UnknownSource(String),
}

/// Validate a registry before any collector runs.
pub fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for source in sources {
        if !seen.insert(source.id.as_str()) {
            return Err(ConfigError::DuplicateId(source.id.clone()));
        }
        if source.enabled && source.endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint(source.id.clone()));
        }
        if source.enabled && collector_ctor(&source.id).is_none() {
            return Err(ConfigError::UnknownSource(source.id.clone()));
        }
    }
    Ok(())
}

/// The built-in source catalog.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "usgs_earthquake",
            "USGS Earthquakes",
            "Real-time seismic data from the US Geological Survey.",
            EventCategory::Natural,
            true,
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson",
            false,
        ),
        SourceConfig::new(
            "gdacs_disaster",
            "GDACS Disasters",
            "Global Disaster Alert and Coordination System (UN/EU).",
            EventCategory::Natural,
            true,
            "https://www.gdacs.org/xml/rss.xml",
            false,
        ),
        SourceConfig::new(
            "nasa_eonet",
            "NASA EONET",
            "Earth Observatory Natural Event Tracker.",
            EventCategory::Natural,
            true,
            "https://eonet.gsfc.nasa.gov/api/v3/events?status=open&limit=20",
            false,
        ),
        SourceConfig::new(
            "noaa_weather",
            "NOAA Weather Alerts",
            "Severe weather alerts from the US National Weather Service.",
            EventCategory::Natural,
            true,
            "https://api.weather.gov/alerts/active",
            false,
        ),
        SourceConfig::new(
            "gdelt_project",
            "GDELT Project",
            "Global Database of Events, Language, and Tone.",
            EventCategory::Conflicts,
            true,
            "https://api.gdeltproject.org/api/v2/doc/doc",
            false,
        ),
        SourceConfig::new(
            "acled_conflict",
            "ACLED (Armed Conflict)",
            "Real-time conflict data. Requires an API key for full access.",
            EventCategory::Conflicts,
            false,
            "https://api.acleddata.com/acled/read",
            true,
        ),
        SourceConfig::new(
            "ioda_outages",
            "IODA Internet Outages",
            "Internet Outage Detection and Analysis (CAIDA).",
            EventCategory::Infrastructure,
            true,
            "https://api.ioda.inetintel.cc.gatech.edu/v2/outages/summary",
            false,
        ),
        SourceConfig::new(
            "submarine_cables",
            "Submarine Cables",
            "Global submarine cable map data (TeleGeography).",
            EventCategory::Infrastructure,
            true,
            "https://raw.githubusercontent.com/telegeography/www.submarinecablemap.com/master/web/public/api/v3/cable/cable-geo.json",
            false,
        ),
        SourceConfig::new(
            "who_don",
            "WHO Outbreaks",
            "World Health Organization Disease Outbreak News.",
            EventCategory::Health,
            true,
            "https://www.who.int/rss-feeds/disease-outbreak-news.xml",
            false,
        ),
        SourceConfig::new(
            "promed_mail",
            "ProMED Mail",
            "Program for Monitoring Emerging Diseases.",
            EventCategory::Health,
            true,
            "https://promedmail.org/feed",
            false,
        ),
        SourceConfig::new(
            "noaa_space",
            "NOAA Space Weather",
            "Solar flares and geomagnetic storms from SWPC.",
            EventCategory::General,
            true,
            "https://services.swpc.noaa.gov/json/alerts.json",
            false,
        ),
        SourceConfig::new(
            "cisa_kev",
            "CISA KEV Catalog",
            "Known exploited vulnerabilities catalog.",
            EventCategory::Cyber,
            true,
            "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json",
            false,
        ),
        SourceConfig::new(
            "urlhaus_payloads",
            "URLhaus Payloads",
            "Recent malware payloads observed by abuse.ch URLhaus.",
            EventCategory::Cyber,
            true,
            "https://urlhaus-api.abuse.ch/v1",
            false,
        ),
    ]
}

/// Result of one collector run. `error` is diagnostic, never fatal.
#[derive(Debug, Default)]
pub struct CollectorResult {
    pub events: Vec<UnifiedEvent>,
    pub error: Option<String>,
}

impl CollectorResult {
    pub fn ok(events: Vec<UnifiedEvent>) -> Self {
        Self {
            events,
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            events: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// A source-specific fetch-and-normalize adapter.
#[async_trait]
pub trait Collector: Send + Sync {
    fn source(&self) -> &SourceConfig;

    /// Fetch and normalize. Must never panic or error past this boundary.
    async fn fetch(&self) -> CollectorResult;
}

type CollectorCtor = fn(SourceConfig, HttpFeed) -> Box<dyn Collector>;

/// Source id → collector constructor. Adding a source is one more row.
const COLLECTOR_TABLE: &[(&str, CollectorCtor)] = &[
    ("usgs_earthquake", |c, h| {
        Box::new(natural::UsgsEarthquakeCollector::new(c, h))
    }),
    ("gdacs_disaster", |c, h| {
        Box::new(natural::GdacsCollector::new(c, h))
    }),
    ("nasa_eonet", |c, h| Box::new(natural::EonetCollector::new(c, h))),
    ("noaa_weather", |c, h| {
        Box::new(natural::NoaaAlertCollector::new(c, h))
    }),
    ("gdelt_project", |c, h| {
        Box::new(conflict::GdeltCollector::new(c, h))
    }),
    ("acled_conflict", |c, h| {
        Box::new(conflict::AcledCollector::from_env(c, h))
    }),
    ("ioda_outages", |c, h| {
        Box::new(infrastructure::IodaCollector::new(c, h))
    }),
    ("submarine_cables", |c, h| {
        Box::new(infrastructure::SubmarineCableCollector::new(c, h))
    }),
    ("who_don", |c, h| {
        Box::new(health::RssHealthCollector::new(c, h, Severity::High))
    }),
    ("promed_mail", |c, h| {
        Box::new(health::RssHealthCollector::new(c, h, Severity::Medium))
    }),
    ("noaa_space", |c, h| Box::new(space::SwpcCollector::new(c, h))),
    ("cisa_kev", |c, h| Box::new(cyber::CisaKevCollector::new(c, h))),
    ("urlhaus_payloads", |c, h| {
        Box::new(cyber::UrlhausCollector::new(c, h))
    }),
];

fn collector_ctor(id: &str) -> Option<CollectorCtor> {
    COLLECTOR_TABLE
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, ctor)| *ctor)
}

/// Build the collector registered for this source, if any.
pub fn collector_for(config: SourceConfig, http: HttpFeed) -> Option<Box<dyn Collector>> {
    collector_ctor(&config.id).map(|ctor| ctor(config, http))
}

/// Normalizer input: whatever fields a source could extract. Everything is
/// optional; [`normalize`] fills defensible defaults so a malformed record
/// degrades instead of failing the batch.
#[derive(Debug, Default)]
pub struct PartialEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub severity: Option<Severity>,
    pub confidence: Option<f64>,
    pub coords: Option<(f64, f64)>,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub url: Option<String>,
}

/// Build a structurally valid [`UnifiedEvent`] from partial source data.
///
/// Defaults: generated uuid id, severity medium, confidence 0.8, time =
/// now. Coordinates are taken only as a pair — never fabricated.
pub fn normalize(raw: Value, partial: PartialEvent, config: &SourceConfig) -> UnifiedEvent {
    let mut tags = partial.tags;
    tags.push(config.category.as_str().to_string());
    tags.push(config.id.clone());

    let (lat, lon) = match partial.coords {
        Some((lat, lon)) if lat.is_finite() && lon.is_finite() => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    UnifiedEvent {
        id: partial
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        source: config.name.clone(),
        category: config.category,
        severity: partial.severity.unwrap_or(Severity::Medium),
        confidence: partial.confidence.unwrap_or(0.8).clamp(0.0, 1.0),
        title: partial.title.unwrap_or_else(|| "Unknown Event".to_string()),
        summary: partial.summary.unwrap_or_default(),
        time: partial.time.unwrap_or_else(Utc::now),
        lat,
        lon,
        country: partial.country,
        tags,
        url: partial.url,
        raw_payload: raw,
        ai_insights: None,
        translated: None,
        analysis: None,
    }
}

/// Parse the loose timestamp formats feeds hand back. Returns `None`
/// rather than guessing when nothing matches.
pub fn parse_feed_time(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // rss2json / URLhaus style: "2026-02-01 10:30:00"
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// GDELT `seendate` format: `YYYYMMDDTHHMMSSZ`.
pub fn parse_gdelt_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y%m%dT%H%M%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Bare `YYYY-MM-DD` dates get the current wall-clock hour and minute so
/// relative-recency sorting stays meaningful. Documented heuristic, not a
/// correctness guarantee.
pub fn bare_date_to_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    let now = Utc::now();
    date.and_hms_opt(now.hour(), now.minute(), 0)
        .map(|naive| naive.and_utc())
}
