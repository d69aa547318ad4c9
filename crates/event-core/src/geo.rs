//! Geographic helpers shared across the pipeline.

use std::f64::consts::PI;

/// Rough conversion of one degree of latitude to km.
pub const DEG_TO_KM: f64 = 111.0;

/// Haversine distance between two points in km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km

    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let dlat = (lat2 - lat1) * PI / 180.0;
    let dlon = (lon2 - lon1) * PI / 180.0;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    R * c
}

/// Planar degree distance scaled to km. Good enough at impact-radius
/// scales; the risk formula only needs a monotone proximity measure.
pub fn euclidean_deg_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dist_deg = ((lat1 - lat2).powi(2) + (lon1 - lon2).powi(2)).sqrt();
    dist_deg * DEG_TO_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine() {
        // NYC to London: ~5,570 km
        let dist = haversine_km(40.7128, -74.0060, 51.5074, -0.1278);
        assert!((dist - 5570.0).abs() < 50.0);

        let dist = haversine_km(0.0, 0.0, 0.0, 0.0);
        assert!(dist.abs() < 0.001);
    }

    #[test]
    fn test_euclidean_deg_km() {
        // One degree of latitude is ~111 km
        let dist = euclidean_deg_km(35.0, 139.0, 36.0, 139.0);
        assert!((dist - 111.0).abs() < 0.001);
        assert_eq!(euclidean_deg_km(10.0, 10.0, 10.0, 10.0), 0.0);
    }
}
