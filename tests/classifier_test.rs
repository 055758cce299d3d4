// ABOUTME: Integration tests for the movement classifier
// ABOUTME: Reference scenario, accuracy gate, confirmation, decay and throttling properties
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::{fix_north, ORIGIN};
use trackline::classifier::{classify, Decision, MovementResult};
use trackline::constants::classifier::{
    CONFIDENCE_CAP, CONFIDENCE_THRESHOLD, STATIONARY_THROTTLE_MS,
};
use trackline::models::{Fix, GeoPoint, MovementState, TrackPoint};

/// Feed fixes through the classifier the way a producer does: the anchor is
/// the last accepted point, or the first fix when nothing was accepted yet
fn drive(fixes: &[Fix]) -> Vec<(MovementResult, Option<TrackPoint>)> {
    let mut state = MovementState::default();
    let mut anchor: Option<GeoPoint> = None;
    fixes
        .iter()
        .map(|fix| {
            let result = classify(fix, anchor, &state);
            state = result.state;
            let point = result.track_point(fix);
            if let Some(p) = point {
                anchor = Some(p.position());
            } else if result.decision == Decision::NoAnchor {
                anchor = Some(fix.position());
            }
            (result, point)
        })
        .collect()
}

#[test]
fn test_reference_scenario() {
    let fixes = [
        fix_north(0.0, 10.0, 0),
        // Raw movement needs distance strictly above accuracy, so 5 m at 5 m accuracy would not count
        fix_north(5.5, 5.0, 1_000),
        fix_north(11.5, 5.0, 2_000),
        fix_north(12.5, 5.0, 2_500),
        fix_north(12.5, 5.0, 3_000),
        fix_north(12.5, 5.0, 8_000),
    ];
    let results = drive(&fixes);

    let (first, _) = &results[0];
    assert!(!first.accept);
    assert_eq!(first.decision, Decision::NoAnchor);

    let (second, point) = &results[1];
    assert_eq!(second.state.confidence, 2);
    assert!(second.accept);
    assert!(point.unwrap().is_stationary);

    let (third, point) = &results[2];
    assert_eq!(third.state.confidence, 4);
    assert!(third.is_moving);
    assert!(!point.unwrap().is_stationary);
    assert_eq!(
        third.state.last_moving_point.map(|p| p.timestamp),
        Some(2_000)
    );

    let (fourth, _) = &results[3];
    assert!(fourth.distance_m.unwrap() < 4.0);
    assert_eq!(fourth.state.confidence, 3);
    assert!(fourth.accept);
    assert!(fourth.is_moving);

    let (fifth, _) = &results[4];
    assert_eq!(fifth.state.confidence, 2);
    assert!(!fifth.accept);
    assert_eq!(fifth.decision, Decision::Throttled);

    let (sixth, point) = &results[5];
    assert_eq!(sixth.state.confidence, 1);
    assert!(sixth.accept);
    assert!(point.unwrap().is_stationary);
}

#[test]
fn test_inaccurate_fix_is_rejected_regardless_of_distance() {
    let state = MovementState {
        confidence: 3,
        last_moving_point: None,
        last_accepted_timestamp: Some(0),
    };
    for meters in [0.0, 3.0, 50.0, 500.0, 5_000.0] {
        let result = classify(&fix_north(meters, 25.0, 60_000), Some(ORIGIN), &state);
        assert!(!result.accept, "accepted a 25m fix {meters}m away");
        assert!(!result.is_moving);
        assert_eq!(result.decision, Decision::LowAccuracy);
        assert_eq!(result.state, state);
    }
}

#[test]
fn test_inaccurate_fixes_never_produce_moving_points() {
    let fixes: Vec<Fix> = (0..20)
        .map(|i| fix_north(f64::from(i) * 30.0, 16.0 + f64::from(i), i64::from(i) * 1_000))
        .collect();
    let results = drive(&fixes);
    assert!(results.iter().all(|(r, p)| !r.accept && p.is_none()));
}

#[test]
fn test_two_qualifying_fixes_confirm_movement() {
    let state = MovementState::default();
    let first = classify(&fix_north(6.0, 5.0, 1_000), Some(ORIGIN), &state);
    assert!(!first.is_moving);
    assert_eq!(first.state.confidence, 2);

    let second = classify(&fix_north(12.0, 5.0, 2_000), Some(ORIGIN), &first.state);
    assert!(second.state.confidence >= CONFIDENCE_THRESHOLD);
    assert!(second.is_moving);
    assert!(!second.track_point(&fix_north(12.0, 5.0, 2_000)).unwrap().is_stationary);
}

#[test]
fn test_movement_survives_two_non_moving_fixes_from_cap() {
    let mut state = MovementState {
        confidence: CONFIDENCE_CAP,
        last_moving_point: None,
        last_accepted_timestamp: Some(0),
    };
    let here = fix_north(0.0, 5.0, 1_000);
    let mut moving_flags = Vec::new();
    for ts in [1_000, 2_000, 3_000] {
        let fix = Fix { timestamp: ts, ..here };
        let result = classify(&fix, Some(ORIGIN), &state);
        moving_flags.push(result.is_moving);
        state = result.state;
    }
    assert_eq!(moving_flags, vec![true, true, false]);
}

#[test]
fn test_stationary_points_are_spaced_by_throttle() {
    // Stand still for a minute with a fix every 700 ms
    let fixes: Vec<Fix> = (0..90)
        .map(|i| fix_north(0.0, 5.0, i64::from(i) * 700))
        .collect();
    let stored: Vec<TrackPoint> = drive(&fixes).into_iter().filter_map(|(_, p)| p).collect();

    assert!(stored.len() > 2);
    assert!(stored.iter().all(|p| p.is_stationary));
    for pair in stored.windows(2) {
        assert!(pair[1].timestamp - pair[0].timestamp >= STATIONARY_THROTTLE_MS);
    }
}

#[test]
fn test_moving_points_are_never_throttled() {
    // 8 m every 200 ms
    let fixes: Vec<Fix> = (0..30)
        .map(|i| fix_north(f64::from(i) * 8.0, 5.0, i64::from(i) * 200))
        .collect();
    let results = drive(&fixes);
    for (result, _) in results.iter().skip(2) {
        assert!(result.is_moving);
        assert!(result.accept);
    }
}
