//! Simulated AIS traffic along major shipping lanes.
//!
//! No live AIS subscription is assumed: a small ghost fleet moves along
//! fixed lane endpoints. Positions are a pure function of (fleet
//! definition, timestamp) — there is no hidden module state, so any
//! snapshot is reproducible by passing the same instant.

use chrono::{DateTime, Timelike, Utc};
use event_core::{haversine_km, Asset, AssetType, GeoPoint};
use serde_json::json;

/// Nautical mile in km.
const NM_KM: f64 = 1.852;

/// A vessel definition on a fixed shipping lane.
#[derive(Debug, Clone, Copy)]
pub struct ShipDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub vessel_type: &'static str,
    pub flag: &'static str,
    /// Lane endpoints as (lat, lon).
    pub route_start: (f64, f64),
    pub route_end: (f64, f64),
    pub speed_knots: f64,
    /// Base position along the lane, 0.0 to 1.0.
    pub base_progress: f64,
}

/// The ghost fleet: Suez, Hormuz and Tokyo Bay lanes.
///
/// The last entry is deliberately anchored (speed 0) on top of a charted
/// cable corridor so the vessel-over-cable correlation path stays
/// exercisable end to end.
pub const FLEET: [ShipDefinition; 4] = [
    ShipDefinition {
        id: "vessel-001",
        name: "Meridian Star",
        vessel_type: "cargo",
        flag: "PA",
        route_start: (29.9, 32.5),
        route_end: (31.2, 32.3),
        speed_knots: 12.0,
        base_progress: 0.2,
    },
    ShipDefinition {
        id: "vessel-002",
        name: "Gulf Pioneer",
        vessel_type: "tanker",
        flag: "LR",
        route_start: (26.5, 56.5),
        route_end: (25.0, 57.5),
        speed_knots: 10.0,
        base_progress: 0.5,
    },
    ShipDefinition {
        id: "vessel-003",
        name: "Shirahama Maru",
        vessel_type: "fishing",
        flag: "JP",
        route_start: (35.0, 140.0),
        route_end: (34.5, 139.5),
        speed_knots: 5.0,
        base_progress: 0.1,
    },
    ShipDefinition {
        id: "vessel-004",
        name: "Kestrel",
        vessel_type: "naval",
        flag: "US",
        route_start: (34.8, 139.8),
        route_end: (35.0, 139.9),
        speed_knots: 0.0,
        base_progress: 0.0,
    },
];

fn interpolate(start: f64, end: f64, progress: f64) -> f64 {
    start + (end - start) * progress
}

/// Lane progress of a ship at the given instant.
///
/// Moving ships advance from their base position by distance covered at
/// `speed_knots` since midnight UTC, wrapping along the lane. Anchored
/// ships stay at their base position.
fn progress_at(ship: &ShipDefinition, at: DateTime<Utc>) -> f64 {
    if ship.speed_knots < f64::EPSILON {
        return ship.base_progress;
    }

    let route_km = haversine_km(
        ship.route_start.0,
        ship.route_start.1,
        ship.route_end.0,
        ship.route_end.1,
    );
    if route_km < f64::EPSILON {
        return ship.base_progress;
    }

    let hours = f64::from(at.num_seconds_from_midnight()) / 3600.0;
    let travelled_km = ship.speed_knots * NM_KM * hours;
    (ship.base_progress + travelled_km / route_km).fract()
}

/// Snapshot of all simulated vessels at the given instant.
pub fn fleet_snapshot(at: DateTime<Utc>) -> Vec<Asset> {
    FLEET
        .iter()
        .map(|ship| {
            let progress = progress_at(ship, at);
            let lat = interpolate(ship.route_start.0, ship.route_end.0, progress);
            let lon = interpolate(ship.route_start.1, ship.route_end.1, progress);
            let status = if ship.speed_knots < 1.0 {
                "Anchored/Drifting"
            } else {
                "Underway"
            };

            Asset {
                id: ship.id.to_string(),
                asset_type: AssetType::Vessel,
                name: format!("{} ({})", ship.name, ship.flag),
                location: GeoPoint { lat, lon },
                details: json!({
                    "vessel_type": ship.vessel_type,
                    "speed": ship.speed_knots,
                    "status": status,
                    "simulated": true,
                }),
                risk_score: 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let a = fleet_snapshot(at);
        let b = fleet_snapshot(at);
        assert_eq!(a.len(), FLEET.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.location.lat, y.location.lat);
            assert_eq!(x.location.lon, y.location.lon);
        }
    }

    #[test]
    fn test_anchored_vessel_never_moves() {
        let morning = Utc.with_ymd_and_hms(2026, 3, 14, 6, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 14, 21, 0, 0).unwrap();

        let get = |at| {
            fleet_snapshot(at)
                .into_iter()
                .find(|a| a.id == "vessel-004")
                .unwrap()
        };
        let a = get(morning);
        let b = get(evening);
        assert_eq!(a.location.lat, b.location.lat);
        assert_eq!(a.location.lon, b.location.lon);
        assert_eq!(a.location.lat, 34.8);
        assert_eq!(a.location.lon, 139.8);
    }

    #[test]
    fn test_anchored_vessel_reports_drifting_status() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let kestrel = fleet_snapshot(at)
            .into_iter()
            .find(|a| a.id == "vessel-004")
            .unwrap();
        assert_eq!(kestrel.speed_knots(), Some(0.0));
        assert_eq!(kestrel.details["status"], "Anchored/Drifting");
    }

    #[test]
    fn test_moving_vessel_advances_over_time() {
        let early = Utc.with_ymd_and_hms(2026, 3, 14, 1, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 14, 2, 0, 0).unwrap();

        let get = |at| {
            fleet_snapshot(at)
                .into_iter()
                .find(|a| a.id == "vessel-001")
                .unwrap()
        };
        let a = get(early);
        let b = get(later);
        assert!(
            a.location.lat != b.location.lat || a.location.lon != b.location.lon,
            "moving vessel should change position between snapshots"
        );
    }
}
