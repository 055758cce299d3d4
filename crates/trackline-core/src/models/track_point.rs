// ABOUTME: Classified and persisted track point model
// ABOUTME: Immutable once written; the store only ever appends new points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::fix::{Fix, GeoPoint};

/// A classified fix as stored in the durable track store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude above sea level in meters
    pub altitude: Option<f64>,
    /// Horizontal accuracy radius in meters
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch; unique and increasing within a session
    pub timestamp: i64,
    /// Whether the classifier considered the user at rest for this point
    pub is_stationary: bool,
    /// Classifier confidence after this point was processed
    pub confidence: i32,
    /// Point was recorded while the fix accuracy failed the classifier threshold
    pub bad_signal: bool,
}

impl TrackPoint {
    /// Build a point from a fix the classifier accepted
    #[must_use]
    pub const fn classified(fix: &Fix, is_moving: bool, confidence: i32) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            accuracy: fix.accuracy,
            timestamp: fix.timestamp,
            is_stationary: !is_moving,
            confidence,
            bad_signal: false,
        }
    }

    /// Build a bad-signal marker from a fix whose accuracy failed the threshold
    ///
    /// Bad-signal points are always stationary and carry the confidence the
    /// classifier held when the fix arrived.
    #[must_use]
    pub const fn bad_signal(fix: &Fix, confidence: i32) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            accuracy: fix.accuracy,
            timestamp: fix.timestamp,
            is_stationary: true,
            confidence,
            bad_signal: true,
        }
    }

    /// Coordinates of this point
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Moving and recorded with a usable signal
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        !self.is_stationary && !self.bad_signal
    }
}
