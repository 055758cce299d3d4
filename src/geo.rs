// ABOUTME: Great-circle distance helpers used by the classifier and derived metrics
// ABOUTME: Haversine formula on a spherical Earth, accurate to well under a meter at track scales
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::geo::EARTH_RADIUS_M;
use crate::models::GeoPoint;

/// Great-circle distance between two coordinates in meters
#[must_use]
pub fn haversine_distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against a > 1.0 from floating point error on antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Coordinate reached by moving `meters` due north from `origin`
///
/// Used by the replay tool and tests to build fixes at known distances.
#[must_use]
pub fn offset_north(origin: GeoPoint, meters: f64) -> GeoPoint {
    let d_lat = (meters / EARTH_RADIUS_M).to_degrees();
    GeoPoint::new(origin.latitude + d_lat, origin.longitude)
}

/// Coordinate reached by moving `meters` due east from `origin`
#[must_use]
pub fn offset_east(origin: GeoPoint, meters: f64) -> GeoPoint {
    let d_lon = (meters / (EARTH_RADIUS_M * origin.latitude.to_radians().cos())).to_degrees();
    GeoPoint::new(origin.latitude, origin.longitude + d_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(52.52, 13.405);
        assert!(haversine_distance(p, p).abs() < f64::EPSILON);
    }

    #[test]
    fn test_known_distance_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = haversine_distance(a, b);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_offsets_round_trip_distance() {
        let origin = GeoPoint::new(47.3769, 8.5417);
        let north = offset_north(origin, 6.0);
        let east = offset_east(origin, 12.5);
        assert!((haversine_distance(origin, north) - 6.0).abs() < 0.01);
        assert!((haversine_distance(origin, east) - 12.5).abs() < 0.01);
    }
}
