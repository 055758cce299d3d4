// ABOUTME: State hydrator rebuilding classifier state and the in-memory track from the durable store
// ABOUTME: Used on foreground resume, app restart and every background invocation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # State Hydration
//!
//! The store is the single source of truth. Producers never trust a cached
//! [`MovementState`]; they rebuild it from the last few rows:
//!
//! - `confidence` and `last_accepted_timestamp` come from the last classified
//!   (non bad-signal) point
//! - `last_moving_point` is the most recent point with `is_stationary = false`
//!   and `bad_signal = false`
//!
//! [`hydrate_state`] answers this with targeted queries (background path);
//! [`hydrate_track`] loads the whole log and scans it (foreground path). Both
//! produce the same state for the same store.

use crate::constants::background::BAD_SIGNAL_LOOKBACK;
use crate::errors::AppResult;
use crate::models::{GeoPoint, MovementState, MovingPoint, TrackPoint};
use crate::store::TrackStore;

/// Classifier state plus the rows it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HydratedState {
    /// Reconstructed classifier state
    pub state: MovementState,
    /// Last stored point of any kind; drives the monotonicity guard
    pub last_point: Option<TrackPoint>,
    /// Last stored classified point; the caller's distance anchor
    pub last_classified: Option<TrackPoint>,
    /// Trailing run of bad-signal rows among the last few
    pub bad_signal_run: u32,
}

impl HydratedState {
    /// Fallback anchor for the classifier
    #[must_use]
    pub fn anchor(&self) -> Option<GeoPoint> {
        self.last_classified.as_ref().map(TrackPoint::position)
    }

    /// Timestamp every new fix must exceed
    #[must_use]
    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_point.map(|p| p.timestamp)
    }

    /// Whether the session has stored anything yet
    #[must_use]
    pub const fn has_points(&self) -> bool {
        self.last_point.is_some()
    }
}

/// Full track plus derived state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HydratedTrack {
    /// Every stored point in order
    pub points: Vec<TrackPoint>,
    /// State derived from `points`
    pub hydrated: HydratedState,
}

/// Assemble classifier state from the relevant rows
#[must_use]
pub fn movement_state_from(
    last_classified: Option<&TrackPoint>,
    last_moving: Option<&TrackPoint>,
) -> MovementState {
    MovementState {
        confidence: last_classified.map_or(0, |p| p.confidence),
        last_moving_point: last_moving.map(MovingPoint::from),
        last_accepted_timestamp: last_classified.map(|p| p.timestamp),
    }
}

/// Derive hydrated state from an in-memory copy of the log
#[must_use]
pub fn hydrate_from_points(points: &[TrackPoint]) -> HydratedState {
    let last_classified = points.iter().rev().find(|p| !p.bad_signal);
    let last_moving = points.iter().rev().find(|p| p.is_moving());
    let bad_signal_run = points
        .iter()
        .rev()
        .take(BAD_SIGNAL_LOOKBACK as usize)
        .take_while(|p| p.bad_signal)
        .count() as u32;

    HydratedState {
        state: movement_state_from(last_classified, last_moving),
        last_point: points.last().copied(),
        last_classified: last_classified.copied(),
        bad_signal_run,
    }
}

/// Classifier state alone, from an in-memory copy of the log
#[must_use]
pub fn movement_state_from_points(points: &[TrackPoint]) -> MovementState {
    hydrate_from_points(points).state
}

/// Rebuild classifier state with targeted store queries
///
/// # Errors
///
/// Returns an error if any store query fails
pub async fn hydrate_state<S: TrackStore + ?Sized>(store: &S) -> AppResult<HydratedState> {
    let last_point = store.last_point().await?;
    let last_classified = store.last_classified_point().await?;
    let last_moving = store.last_moving_point().await?;
    let bad_signal_run = store.recent_bad_signal_run(BAD_SIGNAL_LOOKBACK).await?;

    Ok(HydratedState {
        state: movement_state_from(last_classified.as_ref(), last_moving.as_ref()),
        last_point,
        last_classified,
        bad_signal_run,
    })
}

/// Load the full track and rebuild classifier state from it
///
/// # Errors
///
/// Returns an error if the store cannot be read
pub async fn hydrate_track<S: TrackStore + ?Sized>(store: &S) -> AppResult<HydratedTrack> {
    let points = store.all_points().await?;
    let hydrated = hydrate_from_points(&points);
    Ok(HydratedTrack { points, hydrated })
}
