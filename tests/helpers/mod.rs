// ABOUTME: Shared test helpers for the integration tests
// ABOUTME: Fix builders, a fault-injecting store double and a recording error reporter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trackline::config::TrackingConfig;
use trackline::errors::{AppError, AppResult, ErrorCode};
use trackline::geo::offset_north;
use trackline::models::{Fix, GeoPoint, TrackPoint};
use trackline::reporting::{ErrorReporter, ReportContext};
use trackline::store::{InMemoryTrackStore, TrackStore};

/// Reference position every synthetic track starts from
pub const ORIGIN: GeoPoint = GeoPoint::new(52.370_2, 4.895_2);

/// Fix `meters` north of [`ORIGIN`]
pub fn fix_north(meters: f64, accuracy: f64, timestamp: i64) -> Fix {
    let p = offset_north(ORIGIN, meters);
    Fix::new(p.latitude, p.longitude, Some(accuracy), timestamp)
}

/// A steady walk north: one fix per second, `step_m` apart
pub fn steady_walk(count: usize, step_m: f64, accuracy: f64, start_ms: i64) -> Vec<Fix> {
    (0..count)
        .map(|i| {
            let i = i as i64;
            fix_north(i as f64 * step_m, accuracy, start_ms + i * 1_000)
        })
        .collect()
}

/// Engine config without handoff delays
pub fn test_config() -> TrackingConfig {
    TrackingConfig {
        handoff_grace: Duration::ZERO,
        ..TrackingConfig::default()
    }
}

/// Reporter double capturing every report
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(ErrorCode, ReportContext)>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<(ErrorCode, ReportContext)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &AppError, context: &ReportContext) {
        self.reports.lock().unwrap().push((error.code, *context));
    }
}

/// Store double that starts failing appends after a number of successes
pub struct FailingStore {
    inner: InMemoryTrackStore,
    appends_before_failure: AtomicUsize,
}

impl FailingStore {
    pub fn failing_after(successful_appends: usize) -> Self {
        Self {
            inner: InMemoryTrackStore::new(),
            appends_before_failure: AtomicUsize::new(successful_appends),
        }
    }

    pub const fn inner(&self) -> &InMemoryTrackStore {
        &self.inner
    }
}

#[async_trait::async_trait]
impl TrackStore for FailingStore {
    async fn append(&self, point: &TrackPoint) -> AppResult<()> {
        let remaining = self.appends_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(AppError::database("disk I/O error"));
        }
        self.appends_before_failure
            .store(remaining - 1, Ordering::SeqCst);
        self.inner.append(point).await
    }

    async fn last_point(&self) -> AppResult<Option<TrackPoint>> {
        self.inner.last_point().await
    }

    async fn last_classified_point(&self) -> AppResult<Option<TrackPoint>> {
        self.inner.last_classified_point().await
    }

    async fn last_moving_point(&self) -> AppResult<Option<TrackPoint>> {
        self.inner.last_moving_point().await
    }

    async fn recent_bad_signal_run(&self, n: u32) -> AppResult<u32> {
        self.inner.recent_bad_signal_run(n).await
    }

    async fn all_points(&self) -> AppResult<Vec<TrackPoint>> {
        self.inner.all_points().await
    }

    async fn point_count(&self) -> AppResult<usize> {
        self.inner.point_count().await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }
}
