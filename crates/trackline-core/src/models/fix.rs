// ABOUTME: Raw GPS fix and coordinate pair models
// ABOUTME: A Fix is ephemeral input; it is never persisted as-is
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One raw sample from the location service
///
/// Timestamps are milliseconds since the Unix epoch and increase
/// monotonically per source. Producers still guard against replays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude above sea level in meters
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Horizontal accuracy radius in meters
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Ground speed in m/s as reported by the receiver
    #[serde(default)]
    pub speed: Option<f64>,
    /// Heading in degrees from true north
    #[serde(default)]
    pub heading: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Fix {
    /// Create a fix with only coordinates, accuracy and timestamp
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, accuracy: Option<f64>, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy,
            speed: None,
            heading: None,
            timestamp,
        }
    }

    /// Accuracy in meters, treating a missing value as infinitely bad
    #[must_use]
    pub fn effective_accuracy(&self) -> f64 {
        self.accuracy.unwrap_or(f64::INFINITY)
    }

    /// Coordinates of this fix
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
