// ABOUTME: Movement classifier deciding whether a fix is stored and whether the user is moving
// ABOUTME: Pure function over (fix, anchor, state) with confidence hysteresis and stationary throttling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Movement Classifier
//!
//! Turns one fix plus the carried [`MovementState`] into an accept/reject
//! decision and a moving/stationary classification. No I/O happens here; the
//! foreground pipeline and background task both drive this same function so
//! a track classifies identically no matter which producer recorded it.
//!
//! Confidence is a bounded integer with a fast rise (`+2`) and a slow decay
//! (`-1`). Two qualifying fixes confirm movement from rest, while several
//! non-moving fixes are needed before a moving user is considered stopped.

use serde::{Deserialize, Serialize};

use crate::constants::classifier::{
    ACCURACY_THRESHOLD_M, CONFIDENCE_CAP, CONFIDENCE_DECAY, CONFIDENCE_INCREMENT,
    CONFIDENCE_THRESHOLD, MIN_MOVE_DISTANCE_M, STATIONARY_THROTTLE_MS,
};
use crate::geo::haversine_distance;
use crate::models::{Fix, GeoPoint, MovementState, MovingPoint, TrackPoint};

/// Tunable thresholds for the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Fixes less accurate than this (meters) are rejected outright
    pub accuracy_threshold_m: f64,
    /// Minimum anchor distance (meters) to count as raw movement
    pub min_move_distance_m: f64,
    /// Confidence at which movement is confirmed
    pub confidence_threshold: i32,
    /// Confidence gained per raw-moving fix
    pub confidence_increment: i32,
    /// Confidence lost per non-moving fix
    pub confidence_decay: i32,
    /// Upper clamp for confidence
    pub confidence_cap: i32,
    /// Minimum spacing between stored stationary points (ms)
    pub stationary_throttle_ms: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold_m: ACCURACY_THRESHOLD_M,
            min_move_distance_m: MIN_MOVE_DISTANCE_M,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            confidence_increment: CONFIDENCE_INCREMENT,
            confidence_decay: CONFIDENCE_DECAY,
            confidence_cap: CONFIDENCE_CAP,
            stationary_throttle_ms: STATIONARY_THROTTLE_MS,
        }
    }
}

/// Why the classifier reached its decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Fix should be stored
    Accepted,
    /// Accuracy worse than the threshold; state untouched
    LowAccuracy,
    /// Nothing to measure distance against yet
    NoAnchor,
    /// Stationary fix inside the throttle window
    Throttled,
}

impl Decision {
    /// Stable label for structured logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::LowAccuracy => "low_accuracy",
            Self::NoAnchor => "no_anchor",
            Self::Throttled => "throttled",
        }
    }
}

/// Outcome of classifying one fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementResult {
    /// Store this fix
    pub accept: bool,
    /// Movement is confirmed after this fix
    pub is_moving: bool,
    /// State to carry into the next classification
    pub state: MovementState,
    /// Reason for the decision
    pub decision: Decision,
    /// Distance from the effective anchor in meters, when one existed
    pub distance_m: Option<f64>,
}

impl MovementResult {
    /// The point to append when the fix was accepted
    #[must_use]
    pub const fn track_point(&self, fix: &Fix) -> Option<TrackPoint> {
        if self.accept {
            Some(TrackPoint::classified(fix, self.is_moving, self.state.confidence))
        } else {
            None
        }
    }
}

/// Movement classifier with a fixed set of thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementClassifier {
    config: ClassifierConfig,
}

impl MovementClassifier {
    /// Create a classifier with custom thresholds
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Whether a fix passes the accuracy gate
    #[must_use]
    pub fn is_accurate(&self, fix: &Fix) -> bool {
        fix.effective_accuracy() <= self.config.accuracy_threshold_m
    }

    /// Classify one fix
    ///
    /// `anchor` is the caller's fallback reference (normally the last stored
    /// point). The last confirmed-moving point in `state` takes precedence so
    /// slow drift while at rest is never read as movement.
    ///
    /// Monotonic timestamps are the caller's responsibility.
    #[must_use]
    pub fn classify(
        &self,
        fix: &Fix,
        anchor: Option<GeoPoint>,
        state: &MovementState,
    ) -> MovementResult {
        if !self.is_accurate(fix) {
            return MovementResult {
                accept: false,
                is_moving: false,
                state: *state,
                decision: Decision::LowAccuracy,
                distance_m: None,
            };
        }

        let effective_anchor = state.last_moving_point.map(|p| p.position).or(anchor);
        let distance_m = effective_anchor.map(|a| haversine_distance(a, fix.position()));
        let accuracy = fix.effective_accuracy();
        let raw_moving = distance_m
            .is_some_and(|d| d > self.config.min_move_distance_m && d > accuracy);

        let confidence = self.next_confidence(state.confidence, raw_moving);
        let confirmed_moving = confidence >= self.config.confidence_threshold;
        let mut next = MovementState {
            confidence,
            ..*state
        };

        if effective_anchor.is_none() {
            return MovementResult {
                accept: false,
                is_moving: false,
                state: next,
                decision: Decision::NoAnchor,
                distance_m,
            };
        }

        let throttled = !confirmed_moving
            && state
                .last_accepted_timestamp
                .is_some_and(|last| fix.timestamp - last < self.config.stationary_throttle_ms);
        if throttled {
            return MovementResult {
                accept: false,
                is_moving: false,
                state: next,
                decision: Decision::Throttled,
                distance_m,
            };
        }

        if confirmed_moving {
            next.last_moving_point = Some(MovingPoint::from(fix));
        }
        next.last_accepted_timestamp = Some(fix.timestamp);

        MovementResult {
            accept: true,
            is_moving: confirmed_moving,
            state: next,
            decision: Decision::Accepted,
            distance_m,
        }
    }

    /// Fast rise, slow decay, clamped to `[0, cap]`
    fn next_confidence(&self, current: i32, raw_moving: bool) -> i32 {
        if raw_moving {
            (current + self.config.confidence_increment).min(self.config.confidence_cap)
        } else {
            (current - self.config.confidence_decay).max(0)
        }
    }
}

/// Classify with the default thresholds
#[must_use]
pub fn classify(fix: &Fix, anchor: Option<GeoPoint>, state: &MovementState) -> MovementResult {
    MovementClassifier::default().classify(fix, anchor, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::offset_north;

    const ORIGIN: GeoPoint = GeoPoint::new(52.0, 4.0);

    fn fix_at(position: GeoPoint, accuracy: f64, timestamp: i64) -> Fix {
        Fix::new(position.latitude, position.longitude, Some(accuracy), timestamp)
    }

    #[test]
    fn test_low_accuracy_leaves_state_untouched() {
        let state = MovementState {
            confidence: 4,
            last_moving_point: None,
            last_accepted_timestamp: Some(10),
        };
        let far = offset_north(ORIGIN, 500.0);
        let result = classify(&fix_at(far, 25.0, 20_000), Some(ORIGIN), &state);
        assert!(!result.accept);
        assert_eq!(result.decision, Decision::LowAccuracy);
        assert_eq!(result.state, state);
    }

    #[test]
    fn test_missing_accuracy_is_rejected() {
        let fix = Fix::new(ORIGIN.latitude, ORIGIN.longitude, None, 1);
        let result = classify(&fix, Some(ORIGIN), &MovementState::default());
        assert_eq!(result.decision, Decision::LowAccuracy);
    }

    #[test]
    fn test_first_fix_without_anchor_is_rejected() {
        let result = classify(&fix_at(ORIGIN, 10.0, 0), None, &MovementState::default());
        assert!(!result.accept);
        assert_eq!(result.decision, Decision::NoAnchor);
        assert_eq!(result.state.confidence, 0);
    }

    #[test]
    fn test_distance_within_accuracy_is_not_movement() {
        // 8m away but with a 10m uncertainty radius
        let moved = offset_north(ORIGIN, 8.0);
        let result = classify(&fix_at(moved, 10.0, 0), Some(ORIGIN), &MovementState::default());
        assert!(result.accept);
        assert!(!result.is_moving);
        assert_eq!(result.state.confidence, 0);
    }

    #[test]
    fn test_confidence_is_capped() {
        let state = MovementState {
            confidence: CONFIDENCE_CAP,
            last_moving_point: None,
            last_accepted_timestamp: None,
        };
        let moved = offset_north(ORIGIN, 20.0);
        let result = classify(&fix_at(moved, 5.0, 0), Some(ORIGIN), &state);
        assert_eq!(result.state.confidence, CONFIDENCE_CAP);
        assert!(result.is_moving);
    }

    #[test]
    fn test_moving_points_are_never_throttled() {
        let state = MovementState {
            confidence: CONFIDENCE_CAP,
            last_moving_point: Some(MovingPoint {
                position: ORIGIN,
                timestamp: 1_000,
            }),
            last_accepted_timestamp: Some(1_000),
        };
        let moved = offset_north(ORIGIN, 6.0);
        let result = classify(&fix_at(moved, 5.0, 1_100), None, &state);
        assert!(result.accept);
        assert!(result.is_moving);
        assert_eq!(
            result.state.last_moving_point.map(|p| p.timestamp),
            Some(1_100)
        );
    }

    #[test]
    fn test_last_moving_point_takes_precedence_over_anchor() {
        let state = MovementState {
            confidence: 0,
            last_moving_point: Some(MovingPoint {
                position: ORIGIN,
                timestamp: 0,
            }),
            last_accepted_timestamp: None,
        };
        // Caller anchor is 10m away, last moving point is right here
        let caller_anchor = offset_north(ORIGIN, -10.0);
        let result = classify(&fix_at(ORIGIN, 3.0, 10_000), Some(caller_anchor), &state);
        assert_eq!(result.distance_m.map(f64::round), Some(0.0));
    }

    #[test]
    fn test_decay_needs_two_non_moving_fixes_to_drop_below_threshold() {
        let mut state = MovementState {
            confidence: CONFIDENCE_CAP,
            last_moving_point: Some(MovingPoint {
                position: ORIGIN,
                timestamp: 0,
            }),
            last_accepted_timestamp: Some(0),
        };
        let first = classify(&fix_at(ORIGIN, 5.0, 1_000), None, &state);
        assert!(first.is_moving);
        state = first.state;
        let second = classify(&fix_at(ORIGIN, 5.0, 2_000), None, &state);
        assert!(second.is_moving, "confidence 3 is still moving");
        state = second.state;
        let third = classify(&fix_at(ORIGIN, 5.0, 3_000), None, &state);
        assert!(!third.is_moving);
    }
}
