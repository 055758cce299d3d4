// ABOUTME: Movement classifier state carried between fixes
// ABOUTME: Small serializable value type that can be rebuilt from the last stored rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::fix::{Fix, GeoPoint};
use super::track_point::TrackPoint;

/// Position and time of the most recent confirmed-moving point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingPoint {
    /// Where the user was last confirmed moving
    pub position: GeoPoint,
    /// When, in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<&Fix> for MovingPoint {
    fn from(fix: &Fix) -> Self {
        Self {
            position: fix.position(),
            timestamp: fix.timestamp,
        }
    }
}

impl From<&TrackPoint> for MovingPoint {
    fn from(point: &TrackPoint) -> Self {
        Self {
            position: point.position(),
            timestamp: point.timestamp,
        }
    }
}

/// Everything the classifier needs to carry forward
///
/// The store is the source of truth: in-memory copies of this state are a
/// disposable cache and every entry point rebuilds it from stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementState {
    /// Bounded hysteresis accumulator
    pub confidence: i32,
    /// Most recent confirmed-moving point, used as the distance anchor
    pub last_moving_point: Option<MovingPoint>,
    /// Timestamp of the most recently stored classified point
    pub last_accepted_timestamp: Option<i64>,
}
