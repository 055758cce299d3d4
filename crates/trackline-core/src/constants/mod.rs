// ABOUTME: Constants module with component-separated organization
// ABOUTME: Classifier, warm-up, background, session, geodesy and storage constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by the component that owns them rather than being
//! kept in a single flat list.

/// Movement classifier thresholds
pub mod classifier;

/// Foreground resume warm-up
pub mod warmup {
    /// Consecutive good fixes required before classification resumes
    pub const WARMUP_REQUIRED_FIXES: u32 = 3;
    /// Maximum accuracy (meters) for a fix to count towards warm-up
    pub const WARMUP_ACCURACY_THRESHOLD_M: f64 = 20.0;
}

/// Background persistence task
pub mod background {
    /// Number of trailing rows inspected when seeding the bad-signal counter
    pub const BAD_SIGNAL_LOOKBACK: u32 = 5;
    /// Consecutive bad-signal fixes after which a degraded-signal warning is logged
    pub const BAD_SIGNAL_WARN_RUN: u32 = 3;
}

/// Session lifecycle
pub mod session {
    /// Grace delay between stopping one producer and touching the store (ms)
    pub const HANDOFF_GRACE_MS: u64 = 200;
    /// Default body weight used when no profile value is supplied (kg)
    pub const DEFAULT_BODY_WEIGHT_KG: f64 = 70.0;
}

/// Geodesy
pub mod geo {
    /// Mean Earth radius in meters (IUGG)
    pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
}

/// Unit conversion
pub mod units {
    /// Milliseconds per second
    pub const MS_PER_SECOND: f64 = 1_000.0;
    /// Milliseconds per hour
    pub const MS_PER_HOUR: f64 = 3_600_000.0;
    /// Meters per kilometre
    pub const METERS_PER_KM: f64 = 1_000.0;
}

/// Storage layout
pub mod storage {
    /// Name of the per-session track point table
    pub const TRACK_POINTS_TABLE: &str = "track_points";
    /// Default database URL when none is configured
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/track.db";
}
