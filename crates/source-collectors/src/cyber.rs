//! Cyber collectors: CISA's exploited-vulnerability catalog and URLhaus
//! malware payload sightings. Neither feed is geolocated.

use crate::{normalize, parse_feed_time, Collector, CollectorResult, HttpFeed, SourceConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use event_core::{Severity, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;

/// Newest catalog entries kept per run.
const CISA_KEV_CAP: usize = 20;
/// Newest payload sightings kept per run.
const URLHAUS_CAP: usize = 15;

pub struct CisaKevCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct KevCatalog {
    #[serde(default)]
    vulnerabilities: Vec<KevEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KevEntry {
    #[serde(rename = "cveID")]
    cve_id: Option<String>,
    vulnerability_name: Option<String>,
    short_description: Option<String>,
    vendor_project: Option<String>,
    product: Option<String>,
    date_added: Option<String>,
}

impl CisaKevCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_entry(&self, entry: KevEntry) -> UnifiedEvent {
        let cve = entry.cve_id.clone().unwrap_or_else(|| "CVE-?".to_string());
        let time = entry
            .date_added
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());

        let raw = json!({
            "cveID": entry.cve_id.clone(),
            "vendorProject": entry.vendor_project.clone(),
            "product": entry.product.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: Some(format!("cisa-{cve}")),
                title: Some(format!(
                    "{cve}: {}",
                    entry.vulnerability_name.as_deref().unwrap_or("Unnamed")
                )),
                summary: Some(format!(
                    "{}\nVendor: {}, Product: {}.",
                    entry.short_description.as_deref().unwrap_or(""),
                    entry.vendor_project.as_deref().unwrap_or("Unknown"),
                    entry.product.as_deref().unwrap_or("Unknown")
                )),
                time,
                // Presence in the catalog means active exploitation.
                severity: Some(Severity::High),
                confidence: Some(1.0),
                tags: vec![
                    "cve".to_string(),
                    "vulnerability".to_string(),
                    "exploited".to_string(),
                    "cisa".to_string(),
                ],
                url: Some(
                    "https://www.cisa.gov/known-exploited-vulnerabilities-catalog".to_string(),
                ),
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for CisaKevCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let catalog: KevCatalog = match self.http.fetch_json(&self.config.endpoint).await {
            Ok(catalog) => catalog,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = catalog
            .vulnerabilities
            .into_iter()
            .take(CISA_KEV_CAP)
            .map(|v| self.normalize_entry(v))
            .collect();
        CollectorResult::ok(events)
    }
}

pub struct UrlhausCollector {
    config: SourceConfig,
    http: HttpFeed,
}

#[derive(Debug, Deserialize)]
struct UrlhausFeed {
    #[serde(default)]
    payloads: Vec<UrlhausPayload>,
}

#[derive(Debug, Deserialize)]
struct UrlhausPayload {
    sha256_hash: Option<String>,
    file_type: Option<String>,
    signature: Option<String>,
    firstseen: Option<String>,
    urlhaus_link: Option<String>,
}

impl UrlhausCollector {
    pub fn new(config: SourceConfig, http: HttpFeed) -> Self {
        Self { config, http }
    }

    fn normalize_payload(&self, payload: UrlhausPayload) -> UnifiedEvent {
        let hash = payload.sha256_hash.clone().unwrap_or_default();
        let short_hash: String = hash.chars().take(12).collect();
        let file_type = payload
            .file_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string());

        let raw = json!({
            "sha256_hash": payload.sha256_hash.clone(),
            "file_type": payload.file_type.clone(),
            "signature": payload.signature.clone(),
        });
        normalize(
            raw,
            crate::PartialEvent {
                id: (!short_hash.is_empty()).then(|| format!("urlhaus-{short_hash}")),
                title: Some(format!("Malware Payload: {file_type}")),
                summary: Some(format!(
                    "Signatures: {}. Hash: {hash}",
                    payload.signature.as_deref().unwrap_or("Unknown")
                )),
                time: payload.firstseen.as_deref().and_then(parse_feed_time),
                severity: Some(Severity::Medium),
                confidence: Some(0.9),
                tags: vec!["malware".to_string(), "urlhaus".to_string(), file_type],
                url: payload.urlhaus_link,
                ..Default::default()
            },
            &self.config,
        )
    }
}

#[async_trait]
impl Collector for UrlhausCollector {
    fn source(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> CollectorResult {
        let url = format!("{}/payloads/recent/", self.config.endpoint);
        let feed: UrlhausFeed = match self.http.fetch_json(&url).await {
            Ok(feed) => feed,
            Err(e) => return CollectorResult::failed(e),
        };
        let events = feed
            .payloads
            .into_iter()
            .take(URLHAUS_CAP)
            .map(|p| self.normalize_payload(p))
            .collect();
        CollectorResult::ok(events)
    }
}
