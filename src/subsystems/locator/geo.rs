//! Great-circle distance
//!
//! Pure function used by the distance worker. The Earth radius is a
//! parameter because the operator can tune it over the console.

use libm::{atan2, cos, sin, sqrt};

/// Distance in meters between two positions given in decimal degrees,
/// using the Haversine formula on a sphere of `earth_radius_km`
pub fn haversine_distance_m(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    earth_radius_km: f64,
) -> f64 {
    const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

    let lat1_rad = lat1 * DEG_TO_RAD;
    let lat2_rad = lat2 * DEG_TO_RAD;
    let delta_lat = (lat2 - lat1) * DEG_TO_RAD;
    let delta_lon = (lon2 - lon1) * DEG_TO_RAD;

    let sin_dlat = sin(delta_lat / 2.0);
    let sin_dlon = sin(delta_lon / 2.0);
    let a = sin_dlat * sin_dlat + cos(lat1_rad) * cos(lat2_rad) * sin_dlon * sin_dlon;
    let c = 2.0 * atan2(sqrt(a), sqrt(1.0 - a));

    earth_radius_km * 1000.0 * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = haversine_distance_m(48.1173, 11.5167, 48.1173, 11.5167, 6378.1);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // ~111 km per degree of latitude
        let d = haversine_distance_m(35.0, 139.0, 36.0, 139.0, 6378.1);
        assert!((d - 111_319.0).abs() < 1000.0);
    }

    #[test]
    fn test_symmetric() {
        let there = haversine_distance_m(48.0, 11.0, 48.1, 11.1, 6371.0);
        let back = haversine_distance_m(48.1, 11.1, 48.0, 11.0, 6371.0);
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_radius_scales_distance() {
        let small = haversine_distance_m(35.0, 139.0, 36.0, 139.0, 6356.8);
        let large = haversine_distance_m(35.0, 139.0, 36.0, 139.0, 6378.1);
        assert!(large > small);
    }
}
