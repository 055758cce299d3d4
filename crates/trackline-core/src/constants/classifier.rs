// ABOUTME: Movement classifier constants for accuracy gating, confidence hysteresis and throttling
// ABOUTME: Shared by the foreground pipeline and background task so both classify identically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Fixes with a horizontal accuracy worse than this (meters) are rejected
pub const ACCURACY_THRESHOLD_M: f64 = 15.0;

/// Minimum distance from the anchor (meters) for a fix to count as movement
pub const MIN_MOVE_DISTANCE_M: f64 = 4.0;

/// Confidence at or above which movement is confirmed
pub const CONFIDENCE_THRESHOLD: i32 = 3;

/// Confidence gained per raw-moving fix
pub const CONFIDENCE_INCREMENT: i32 = 2;

/// Confidence lost per non-moving fix
pub const CONFIDENCE_DECAY: i32 = 1;

/// Upper clamp for confidence
pub const CONFIDENCE_CAP: i32 = CONFIDENCE_THRESHOLD + 2;

/// Minimum spacing between stored stationary points (ms)
pub const STATIONARY_THROTTLE_MS: i64 = 5_000;
