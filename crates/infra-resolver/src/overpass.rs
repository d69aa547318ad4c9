//! Fixed infrastructure lookup via the Overpass API.
//!
//! One spatial query per event covers power, telecom and transport POIs.
//! Only tagged nodes are consumed — ways and relations would need centroid
//! computation and are left to the upstream index.

use event_core::{Asset, AssetType, GeoPoint};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::ResolverError;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Overpass QL query for nearby infrastructure nodes.
///
/// `out body 20` caps the result set: the risk engine's per-event load is
/// bounded at the source, not trimmed for display.
pub fn build_query(lat: f64, lon: f64, radius_m: f64) -> String {
    format!(
        r#"[out:json][timeout:10];
(
  node["power"="plant"](around:{radius_m},{lat},{lon});
  node["power"="substation"](around:{radius_m},{lat},{lon});
  node["man_made"="tower"]["tower:type"="communication"](around:{radius_m},{lat},{lon});
  node["telecom"="data_center"](around:{radius_m},{lat},{lon});
  node["aeroway"="aerodrome"](around:{radius_m},{lat},{lon});
  node["harbour"](around:{radius_m},{lat},{lon});
);
out body 20;
>;
out skel qt;
"#
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub tags: Option<HashMap<String, String>>,
}

/// Map one OSM node to an asset. Returns `None` for untagged or
/// coordinate-less elements.
pub(crate) fn map_element(element: &OverpassElement) -> Option<Asset> {
    if element.kind != "node" {
        return None;
    }
    let (lat, lon) = (element.lat?, element.lon?);
    let tags = element.tags.as_ref()?;

    let asset_type = if tags.get("power").map(String::as_str) == Some("plant") {
        AssetType::PowerPlant
    } else if tags.get("power").map(String::as_str) == Some("substation") {
        AssetType::Substation
    } else if tags.get("telecom").map(String::as_str) == Some("data_center") {
        AssetType::DataCenter
    } else if tags.get("aeroway").map(String::as_str) == Some("aerodrome") {
        AssetType::Airport
    } else if tags.contains_key("harbour") {
        AssetType::Seaport
    } else {
        // Communication towers and anything else the query let through
        AssetType::TelecomTower
    };

    let name = tags
        .get("name")
        .or_else(|| tags.get("name:en"))
        .cloned()
        .unwrap_or_else(|| format!("{:?} ({})", asset_type, element.id));

    Some(Asset {
        id: format!("osm-{}", element.id),
        asset_type,
        name,
        location: GeoPoint { lat, lon },
        details: json!({
            "operator": tags.get("operator"),
            "capacity": tags.get("generator:output:electricity"),
            "source": "OpenStreetMap",
        }),
        risk_score: 0,
    })
}

/// POST the query and map tagged nodes to assets.
pub(crate) async fn fetch_nearby(
    client: &reqwest::Client,
    overpass_url: &str,
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> Result<Vec<Asset>, ResolverError> {
    let query = build_query(lat, lon, radius_km * 1000.0);

    let response = client
        .post(overpass_url)
        .body(query)
        .send()
        .await
        .map_err(|e| ResolverError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ResolverError::Status(format!(
            "Overpass returned status {}",
            response.status()
        )));
    }

    let data: OverpassResponse = response
        .json()
        .await
        .map_err(|e| ResolverError::Parse(e.to_string()))?;

    Ok(data.elements.iter().filter_map(map_element).collect())
}
