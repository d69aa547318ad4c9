//! Conflict collectors: GDELT news monitoring and the keyed ACLED feed.

use crate::{
    bare_date_to_datetime, normalize, parse_gdelt_time, Collector, CollectorResult, HttpFeed,
    SourceConfig,
};
use async_trait::async_trait;
use event_core::{Severity, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;

const GDELT_QUERY: &str = "conflict%20OR%20riot%20OR%20protest";
const GDELT_MAX_RECORDS: u32 = 30;

/// GDELT doc 2.0 article list.
pub struct GdeltCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct GdeltFeed {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

#[derive(Debug, Deserialize)]
struct GdeltArticle {
    url: Option<String>,
    title: Option<String>,
    seendate: Option<String>,
    sourcecountry: Option<String>,
    language: Option<String>,
}

impl GdeltCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn query_url(&self) -> String {
        format!(
            "{}?query={}&mode=artlist&maxrecords={}&format=json",
            self.config.endpoint, GDELT_QUERY, GDELT_MAX_RECORDS
        )
    }

    fn normalize_article(&self, article: GdeltArticle) -> UnifiedEvent {
        let raw = json!({
            "url": article.url.clone(),
            "title": article.title.clone(),
            "seendate": article.seendate.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                // The article URL is the only stable identifier GDELT gives.
                id: article.url.clone(),
                title: article.title,
                summary: Some(format!(
                    "Source: {}. Language: {}",
                    article.sourcecountry.as_deref().unwrap_or("unknown"),
                    article.language.as_deref().unwrap_or("unknown")
                )),
                time: article.seendate.as_deref().and_then(parse_gdelt_time),
                severity: Some(Severity::Medium),
                confidence: Some(0.7),
                // Article lists carry no geocoding. Unplotted, never 0,0.
                coords: None,
                country: article.sourcecountry,
                tags: vec![
                    "conflict".to_string(),
                    "news".to_string(),
                    "gdelt".to_string(),
                ],
                url: article.url,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for GdeltCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let feed: GdeltFeed = match self.http.fetch_json(&self.query_url()).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .articles
            .into_iter()
            .map(|a| self.normalize_article(a))
            .collect();
        CollectorResult::ok(events)
    }
}

/// ACLED read API. Inert without a key: the run reports a configuration
/// error instead of hammering an endpoint that will reject it.
pub struct AcledCollector {
    config: SourceConfig,
    http: HttpFeed,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AcledFeed {
    #[serde(default)]
    data: Vec<AcledRecord>,
}

#[derive(Debug, Deserialize)]
struct AcledRecord {
    event_id_cnty: Option<String>,
    event_date: Option<String>,
    event_type: Option<String>,
    sub_event_type: Option<String>,
    actor1: Option<String>,
    location: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    fatalities: Option<String>,
    notes: Option<String>,
}

/// Fatality count and event type drive ACLED severity.
pub fn acled_severity(fatalities: u32, event_type: &str) -> Severity {
    if fatalities > 10 {
        Severity::Critical
    } else if fatalities > 0 {
        Severity::High
    } else if event_type.to_lowercase().contains("protest") {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl AcledCollector {
    pub fn new(config: SourceConfig, http: HttpFeed, api_key: Option<String>) -> Self {
        Self {
            config,
            http,
            api_key,
        }
    }

    pub fn from_env(config: SourceConfig, http: HttpFeed) -> Self {
        let api_key = std::env::var("ACLED_API_KEY").ok().filter(|k| !k.is_empty());
        Self::new(config, http, api_key)
    }

    fn normalize_record(&self, record: AcledRecord) -> UnifiedEvent {
        let event_type = record.event_type.clone().unwrap_or_default();
        let fatalities = record
            .fatalities
            .as_deref()
            .and_then(|f| f.parse::<u32>().ok())
            .unwrap_or(0);
        let coords = match (
            record.latitude.as_deref().and_then(|v| v.parse::<f64>().ok()),
            record.longitude.as_deref().and_then(|v| v.parse::<f64>().ok()),
        ) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        };
        let location = record.location.clone().unwrap_or_default();

        let mut tags = Vec::new();
        if let Some(actor) = record.actor1.clone() {
            tags.push(actor);
        }
        if let Some(sub) = record.sub_event_type.clone() {
            tags.push(sub);
        }
        tags.push("acled".to_string());

        let raw = json!({
            "event_id_cnty": record.event_id_cnty.clone(),
            "event_type": record.event_type.clone(),
            "fatalities": record.fatalities.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: record.event_id_cnty.map(|id| format!("acled-{id}")),
                title: Some(format!("{event_type} in {location}")),
                summary: record.notes.or_else(|| {
                    record
                        .sub_event_type
                        .map(|s| format!("Reported {s}."))
                }),
                // Bare dates get the current wall clock so recency sorting
                // stays useful.
                time: record.event_date.as_deref().and_then(bare_date_to_datetime),
                severity: Some(acled_severity(fatalities, &event_type)),
                confidence: Some(0.9),
                coords,
                country: record.location,
                tags,
                url: Some("https://acleddata.com".to_string()),
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for AcledCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let Some(key) = self.api_key.as_deref() else {
            return CollectorResult::failed(
                "ACLED requires an API key. Set ACLED_API_KEY to enable this source.",
            );
        };

        let url = format!("{}?key={}&limit=50", self.config.endpoint, key);
        let feed: AcledFeed = match self.http.fetch_json(&url).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .data
            .into_iter()
            .map(|r| self.normalize_record(r))
            .collect();
        CollectorResult::ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_sources;

    fn config_for(id: &str) -> SourceConfig {
        default_sources().into_iter().find(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_gdelt_query_url_caps_records() {
        let collector = GdeltCollector::new(config_for("gdelt_project"), HttpFeed::new());
        let url = collector.query_url();
        assert!(url.contains("maxrecords=30"));
        assert!(url.contains("format=json"));
        assert!(url.starts_with("https://api.gdeltproject.org/api/v2/doc/doc?"));
    }

    #[test]
    fn test_gdelt_article_unplotted_with_parsed_seendate() {
        let collector = GdeltCollector::new(config_for("gdelt_project"), HttpFeed::new());
        let article: GdeltArticle = serde_json::from_str(
            r#"{"url": "https://news.example/1", "title": "Clashes reported", "seendate": "20260201T103000Z", "sourcecountry": "Sudan", "language": "English"}"#,
        )
        .unwrap();
        let event = collector.normalize_article(article);
        assert_eq!(event.id, "https://news.example/1");
        assert_eq!(event.coords(), None);
        assert_eq!(event.severity, Severity::Medium);
        assert_eq!(event.summary, "Source: Sudan. Language: English");
        assert_eq!(event.time.to_rfc3339(), "2026-02-01T10:30:00+00:00");
    }

    #[test]
    fn test_acled_severity_rules() {
        assert_eq!(acled_severity(11, "Battles"), Severity::Critical);
        assert_eq!(acled_severity(1, "Battles"), Severity::High);
        assert_eq!(acled_severity(0, "Protests"), Severity::Medium);
        assert_eq!(acled_severity(0, "Strategic developments"), Severity::Low);
    }

    #[tokio::test]
    async fn test_acled_without_key_reports_error_without_fetching() {
        let collector =
            AcledCollector::new(config_for("acled_conflict"), HttpFeed::new(), None);
        let result = collector.fetch().await;
        assert!(result.events.is_empty());
        assert!(result.error.unwrap().contains("ACLED_API_KEY"));
    }

    #[test]
    fn test_acled_record_normalizes() {
        let collector = AcledCollector::new(
            config_for("acled_conflict"),
            HttpFeed::new(),
            Some("k".to_string()),
        );
        let record: AcledRecord = serde_json::from_str(
            r#"{
                "event_id_cnty": "SDN-100", "event_date": "2026-02-01",
                "event_type": "Battles", "sub_event_type": "Armed clash",
                "actor1": "Militia A", "location": "Khartoum",
                "latitude": "15.5007", "longitude": "32.5599",
                "fatalities": "12", "notes": "Heavy fighting."
            }"#,
        )
        .unwrap();
        let event = collector.normalize_record(record);
        assert_eq!(event.id, "acled-SDN-100");
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.title, "Battles in Khartoum");
        assert_eq!(event.coords(), Some((15.5007, 32.5599)));
        assert!(event.tags.contains(&"Armed clash".to_string()));
        assert_eq!(event.time.date_naive().to_string(), "2026-02-01");
    }
}
