//! Submarine cable lookup over bundled route geometry.
//!
//! Cable paths ship with the crate as a GeoJSON FeatureCollection. The
//! membership test is a degrees-based bounding check: a cable is "nearby"
//! when any vertex of its LineString falls within `radius_km` of the query
//! point (1 degree ~ 111 km). LineStrings are never distance-checked
//! exactly — the fusion stage only needs a coarse candidate set.

use event_core::{Asset, AssetType, GeoPoint, DEG_TO_KM};
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::warn;

const CABLE_GEOJSON: &str = include_str!("../data/cable_geo.json");

#[derive(Debug, Deserialize)]
struct CableCollection {
    features: Vec<CableFeature>,
}

#[derive(Debug, Deserialize)]
struct CableFeature {
    properties: CableProperties,
    geometry: CableGeometry,
}

#[derive(Debug, Deserialize)]
struct CableProperties {
    id: String,
    name: String,
    #[serde(default)]
    capacity: Option<String>,
    #[serde(default)]
    owners: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CableGeometry {
    /// GeoJSON LineString: [lon, lat] pairs.
    coordinates: Vec<[f64; 2]>,
}

fn cable_collection() -> &'static CableCollection {
    static CABLES: OnceLock<CableCollection> = OnceLock::new();
    CABLES.get_or_init(|| {
        serde_json::from_str(CABLE_GEOJSON).unwrap_or_else(|e| {
            // Bundled data is validated in tests; an empty set still lets
            // the rest of the resolver degrade gracefully at runtime.
            warn!("bundled cable geometry failed to parse: {e}");
            CableCollection { features: vec![] }
        })
    })
}

/// Cables with at least one route vertex within `radius_km` of the point.
///
/// The returned asset location is the first vertex (landing point
/// approximation); full geometry rides along in the details bag.
pub fn nearby_cables(lat: f64, lon: f64, radius_km: f64) -> Vec<Asset> {
    let radius_deg = radius_km / DEG_TO_KM;
    let mut nearby = Vec::new();

    for feature in &cable_collection().features {
        let is_near = feature
            .geometry
            .coordinates
            .iter()
            .any(|[c_lon, c_lat]| (c_lat - lat).abs() < radius_deg && (c_lon - lon).abs() < radius_deg);
        if !is_near {
            continue;
        }

        let Some([first_lon, first_lat]) = feature.geometry.coordinates.first().copied() else {
            continue;
        };

        nearby.push(Asset {
            id: format!("cable-{}", feature.properties.id),
            asset_type: AssetType::SubmarineCable,
            name: feature.properties.name.clone(),
            location: GeoPoint {
                lat: first_lat,
                lon: first_lon,
            },
            details: json!({
                "capacity": feature.properties.capacity.clone(),
                "owners": feature.properties.owners.clone(),
                "geometry": feature.geometry.coordinates.clone(),
                "source": "bundled cable map",
            }),
            risk_score: 0,
        });
    }

    nearby
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_geometry_parses() {
        assert!(!cable_collection().features.is_empty());
    }

    #[test]
    fn test_tokyo_bay_cable_found_near_event() {
        let cables = nearby_cables(35.0, 139.8, 50.0);
        assert!(cables.iter().any(|c| c.id == "cable-tokyo-bay-express"));
    }

    #[test]
    fn test_remote_point_finds_nothing() {
        // Middle of the South Pacific
        let cables = nearby_cables(-40.0, -130.0, 50.0);
        assert!(cables.is_empty());
    }

    #[test]
    fn test_radius_bounds_membership() {
        // ~55 km east of the nearest Tokyo Bay vertex: inside 100 km,
        // outside 20 km
        let wide = nearby_cables(35.0, 140.3, 100.0);
        assert!(wide.iter().any(|c| c.id == "cable-tokyo-bay-express"));

        let narrow = nearby_cables(35.0, 141.3, 20.0);
        assert!(!narrow.iter().any(|c| c.id == "cable-tokyo-bay-express"));
    }
}
