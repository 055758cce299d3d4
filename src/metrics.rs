// ABOUTME: Derived activity metrics computed from the trusted track
// ABOUTME: Distance, moving time, average pace and calorie estimate; pure and stateless
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Derived Metrics
//!
//! All functions here are pure and recomputed whenever the track changes.
//! They only look at the *trusted* sub-sequence: stored points from the first
//! confirmed-moving point onward, excluding stationary and bad-signal points.

use serde::{Deserialize, Serialize};

use crate::constants::units::{METERS_PER_KM, MS_PER_HOUR, MS_PER_SECOND};
use crate::geo::haversine_distance;
use crate::models::{ActivityKind, TrackPoint};

/// Body weight and activity intensity supplied by profile collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortProfile {
    /// Body weight in kilograms
    pub body_weight_kg: f64,
    /// Metabolic equivalent of the activity
    pub met: f64,
}

impl EffortProfile {
    /// Profile using the activity's default MET factor
    #[must_use]
    pub const fn for_activity(kind: ActivityKind, body_weight_kg: f64) -> Self {
        Self {
            body_weight_kg,
            met: kind.met(),
        }
    }

    /// Replace the activity's default MET with an explicit value
    #[must_use]
    pub const fn with_met(mut self, met: f64) -> Self {
        self.met = met;
        self
    }
}

/// The four derived values exposed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackMetrics {
    /// Cumulative great-circle distance in meters
    pub distance_m: f64,
    /// Time spent moving in milliseconds
    pub moving_time_ms: i64,
    /// Seconds per kilometre; `None` until some distance is covered
    pub average_pace_s_per_km: Option<f64>,
    /// Estimated energy expenditure in kilocalories
    pub calories_kcal: f64,
}

/// Index of the first confirmed-moving point
#[must_use]
pub fn first_confirmed_index(points: &[TrackPoint]) -> Option<usize> {
    points.iter().position(TrackPoint::is_moving)
}

/// Trusted sub-sequence used for rendering and metrics
#[must_use]
pub fn trusted_points(points: &[TrackPoint]) -> Vec<TrackPoint> {
    first_confirmed_index(points).map_or_else(Vec::new, |start| {
        points[start..]
            .iter()
            .filter(|p| p.is_moving())
            .copied()
            .collect()
    })
}

/// Sum of consecutive distances over trusted points
#[must_use]
pub fn total_distance_m(trusted: &[TrackPoint]) -> f64 {
    trusted
        .windows(2)
        .map(|pair| haversine_distance(pair[0].position(), pair[1].position()))
        .sum()
}

/// Sum of time deltas between consecutive trusted points
///
/// Uses the same pairs as [`total_distance_m`] so pace divides like by like.
#[must_use]
pub fn moving_time_ms(trusted: &[TrackPoint]) -> i64 {
    trusted
        .windows(2)
        .map(|pair| pair[1].timestamp - pair[0].timestamp)
        .sum()
}

/// Seconds per kilometre
#[must_use]
pub fn average_pace_s_per_km(distance_m: f64, moving_time_ms: i64) -> Option<f64> {
    if distance_m <= 0.0 || moving_time_ms <= 0 {
        return None;
    }
    let seconds = moving_time_ms as f64 / MS_PER_SECOND;
    Some(seconds / (distance_m / METERS_PER_KM))
}

/// MET × weight (kg) × hours
#[must_use]
pub fn calories_kcal(profile: &EffortProfile, moving_time_ms: i64) -> f64 {
    let hours = moving_time_ms.max(0) as f64 / MS_PER_HOUR;
    profile.met * profile.body_weight_kg * hours
}

/// Compute every metric for a stored track
#[must_use]
pub fn compute(points: &[TrackPoint], profile: &EffortProfile) -> TrackMetrics {
    let trusted = trusted_points(points);
    let distance_m = total_distance_m(&trusted);
    let moving_time_ms = moving_time_ms(&trusted);

    TrackMetrics {
        distance_m,
        moving_time_ms,
        average_pace_s_per_km: average_pace_s_per_km(distance_m, moving_time_ms),
        calories_kcal: calories_kcal(profile, moving_time_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::offset_north;
    use crate::models::{Fix, GeoPoint};

    const ORIGIN: GeoPoint = GeoPoint::new(45.0, 7.0);

    fn point_at(meters_north: f64, timestamp: i64, moving: bool) -> TrackPoint {
        let p = offset_north(ORIGIN, meters_north);
        let fix = Fix::new(p.latitude, p.longitude, Some(4.0), timestamp);
        TrackPoint::classified(&fix, moving, if moving { 4 } else { 0 })
    }

    #[test]
    fn test_leading_stationary_points_are_not_trusted() {
        let points = vec![
            point_at(0.0, 0, false),
            point_at(5.0, 1_000, false),
            point_at(10.0, 2_000, true),
            point_at(20.0, 3_000, true),
        ];
        let trusted = trusted_points(&points);
        assert_eq!(trusted.len(), 2);
        assert_eq!(trusted[0].timestamp, 2_000);
    }

    #[test]
    fn test_metrics_for_steady_run() {
        // 1 km in 5 minutes, sampled every 10 s
        let points: Vec<TrackPoint> = (0..=30)
            .map(|i| point_at(f64::from(i) * 1000.0 / 30.0, i64::from(i) * 10_000, true))
            .collect();
        let metrics = compute(&points, &EffortProfile::for_activity(ActivityKind::Running, 60.0));
        assert!((metrics.distance_m - 1000.0).abs() < 0.5);
        assert_eq!(metrics.moving_time_ms, 300_000);
        let pace = metrics.average_pace_s_per_km.unwrap_or_default();
        assert!((pace - 300.0).abs() < 0.5);
        // 9.8 MET * 60 kg * (5/60) h
        assert!((metrics.calories_kcal - 49.0).abs() < 0.01);
    }

    #[test]
    fn test_distance_and_time_share_trusted_pairs() {
        // 10 m, a stationary row during a two minute stop, then 20 m
        let points = vec![
            point_at(0.0, 0, true),
            point_at(10.0, 5_000, true),
            point_at(10.0, 60_000, false),
            point_at(20.0, 120_000, true),
            point_at(30.0, 125_000, true),
        ];
        let trusted = trusted_points(&points);
        assert_eq!(moving_time_ms(&trusted), 125_000);

        let metrics = compute(&points, &EffortProfile::for_activity(ActivityKind::Running, 70.0));
        assert!((metrics.distance_m - 30.0).abs() < 0.01);
        assert_eq!(metrics.moving_time_ms, 125_000);
        let pace = metrics.average_pace_s_per_km.unwrap_or_default();
        assert!((pace - 125.0 / 0.03).abs() < 1.0, "got {pace}");
    }

    #[test]
    fn test_no_pace_without_distance() {
        assert_eq!(average_pace_s_per_km(0.0, 1_000), None);
        let metrics = compute(&[], &EffortProfile::for_activity(ActivityKind::Walking, 80.0));
        assert_eq!(metrics, TrackMetrics::default());
    }
}
