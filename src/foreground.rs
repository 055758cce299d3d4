// ABOUTME: Foreground ingestion pipeline consuming the live fix stream while the app is visible
// ABOUTME: Warm-up gating, monotonicity guard, classification, persistence and renderer snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Foreground Ingestion Pipeline
//!
//! Consumes fixes one at a time. Each fix is fully decided (and written, if
//! accepted) before the next one is read. After a resume the pipeline first
//! hydrates from the store and then waits for the receiver to settle
//! (warm-up) before classifying again.
//!
//! Renderers subscribe to a [`TrackSnapshot`] watch channel that is updated
//! after every change.

use std::future::Future;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::classifier::{Decision, MovementClassifier};
use crate::constants::session::DEFAULT_BODY_WEIGHT_KG;
use crate::constants::warmup::{WARMUP_ACCURACY_THRESHOLD_M, WARMUP_REQUIRED_FIXES};
use crate::errors::AppResult;
use crate::hydration::hydrate_track;
use crate::metrics::{self, EffortProfile, TrackMetrics};
use crate::models::{ActivityKind, Fix, GeoPoint, MovementState, TrackPoint};
use crate::reporting::{ReportContext, SharedReporter, TaskKind};
use crate::store::TrackStore;

/// Pipeline mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Not subscribed to location updates
    #[default]
    Idle,
    /// Resumed with stored points; waiting for accurate fixes
    WarmingUp,
    /// Classifying and storing fixes
    Tracking,
}

/// What happened to one fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Pipeline is idle
    Ignored,
    /// Counted towards warm-up; only the live position moved
    Warming {
        /// Consecutive accurate fixes seen so far
        good_fixes: u32,
    },
    /// This fix completed warm-up; the next fix will be classified
    WarmupComplete,
    /// Timestamp not after the last stored point
    OutOfOrder,
    /// Classifier did not accept the fix
    Rejected(Decision),
    /// Fix was appended to the store
    Stored(TrackPoint),
    /// Store write failed; the fix is lost and the session continues
    StoreFailed,
}

/// Renderer-facing view of the pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrackSnapshot {
    /// Current pipeline mode
    pub mode: Mode,
    /// Latest fix shown as the user's position
    pub live_position: Option<Fix>,
    /// Still waiting for the receiver to settle
    pub is_warming_up: bool,
    /// At least one point was accepted this session
    pub has_started_tracking: bool,
    /// Trusted sub-sequence for map rendering
    pub trusted_track: Vec<TrackPoint>,
    /// Derived metrics over the trusted track
    pub metrics: TrackMetrics,
}

/// Foreground fix consumer
pub struct ForegroundPipeline<S: TrackStore + ?Sized> {
    store: Arc<S>,
    classifier: MovementClassifier,
    reporter: SharedReporter,
    profile: EffortProfile,
    mode: Mode,
    state: MovementState,
    last_point: Option<TrackPoint>,
    anchor: Option<GeoPoint>,
    warmup_count: u32,
    has_started_tracking: bool,
    live_position: Option<Fix>,
    track: Vec<TrackPoint>,
    snapshot: watch::Sender<TrackSnapshot>,
}

impl<S: TrackStore + ?Sized> ForegroundPipeline<S> {
    /// Create an idle pipeline writing to `store`
    #[must_use]
    pub fn new(store: Arc<S>, classifier: MovementClassifier, reporter: SharedReporter) -> Self {
        let (snapshot, _) = watch::channel(TrackSnapshot::default());
        Self {
            store,
            classifier,
            reporter,
            profile: EffortProfile::for_activity(ActivityKind::default(), DEFAULT_BODY_WEIGHT_KG),
            mode: Mode::Idle,
            state: MovementState::default(),
            last_point: None,
            anchor: None,
            warmup_count: 0,
            has_started_tracking: false,
            live_position: None,
            track: Vec::new(),
            snapshot,
        }
    }

    /// Use a different body weight / MET for derived metrics
    pub fn set_profile(&mut self, profile: EffortProfile) {
        self.profile = profile;
        self.publish();
    }

    /// Effort profile used for derived metrics
    #[must_use]
    pub const fn profile(&self) -> &EffortProfile {
        &self.profile
    }

    /// Subscribe to renderer snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrackSnapshot> {
        self.snapshot.subscribe()
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the pipeline is waiting for warm-up to finish
    #[must_use]
    pub fn is_warming_up(&self) -> bool {
        self.mode == Mode::WarmingUp
    }

    /// Whether any point was accepted this session
    #[must_use]
    pub const fn has_started_tracking(&self) -> bool {
        self.has_started_tracking
    }

    /// Latest fix shown as the user's position
    #[must_use]
    pub const fn live_position(&self) -> Option<&Fix> {
        self.live_position.as_ref()
    }

    /// Carried classifier state
    #[must_use]
    pub const fn state(&self) -> &MovementState {
        &self.state
    }

    /// Every point the pipeline knows about, including hydrated ones
    #[must_use]
    pub fn track(&self) -> &[TrackPoint] {
        &self.track
    }

    /// Trusted sub-sequence of the in-memory track
    #[must_use]
    pub fn trusted_track(&self) -> Vec<TrackPoint> {
        metrics::trusted_points(&self.track)
    }

    /// Derived metrics for the in-memory track
    #[must_use]
    pub fn metrics(&self) -> TrackMetrics {
        metrics::compute(&self.track, &self.profile)
    }

    /// Hydrate from the store and start consuming fixes
    ///
    /// Goes through warm-up when the store already holds points.
    ///
    /// # Errors
    ///
    /// Returns the store error if hydration fails; the failure is also reported
    pub async fn enter_foreground(&mut self) -> AppResult<Mode> {
        let hydrated = match hydrate_track(self.store.as_ref()).await {
            Ok(hydrated) => hydrated,
            Err(e) => {
                self.reporter.report(
                    &e,
                    &ReportContext::for_operation(TaskKind::Foreground, "hydrate"),
                );
                return Err(e);
            }
        };

        self.state = hydrated.hydrated.state;
        self.last_point = hydrated.hydrated.last_point;
        self.anchor = hydrated.hydrated.anchor();
        self.has_started_tracking =
            self.has_started_tracking || hydrated.hydrated.last_classified.is_some();
        self.track = hydrated.points;
        self.warmup_count = 0;
        self.mode = if hydrated.hydrated.last_classified.is_some() {
            Mode::WarmingUp
        } else {
            Mode::Tracking
        };

        info!(
            mode = ?self.mode,
            track.points = self.track.len(),
            track.confidence = self.state.confidence,
            "Foreground pipeline hydrated"
        );
        self.publish();
        Ok(self.mode)
    }

    /// Stop consuming fixes but keep the session
    pub fn leave_foreground(&mut self) {
        self.mode = Mode::Idle;
        self.warmup_count = 0;
        debug!("Foreground pipeline idle");
        self.publish();
    }

    /// Forget everything about the current session
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.state = MovementState::default();
        self.last_point = None;
        self.anchor = None;
        self.warmup_count = 0;
        self.has_started_tracking = false;
        self.live_position = None;
        self.track.clear();
        self.publish();
    }

    /// Process one fix
    pub async fn handle_fix(&mut self, fix: &Fix) -> Outcome {
        let outcome = match self.mode {
            Mode::Idle => return Outcome::Ignored,
            Mode::WarmingUp => self.warm_up(fix),
            Mode::Tracking => self.track_fix(fix).await,
        };
        if outcome != Outcome::OutOfOrder {
            self.publish();
        }
        outcome
    }

    /// Consume a fix stream until it ends or `shutdown` resolves
    ///
    /// Shutdown is only observed between fixes, so a fix already being
    /// processed is always decided and written. Returns the number of fixes
    /// handled.
    pub async fn run<F, C>(&mut self, fixes: F, shutdown: C) -> usize
    where
        F: Stream<Item = Fix>,
        C: Future<Output = ()>,
    {
        tokio::pin!(fixes);
        tokio::pin!(shutdown);
        let mut handled = 0;

        loop {
            let fix = tokio::select! {
                biased;
                () = &mut shutdown => {
                    debug!("Foreground fix subscription cancelled");
                    break;
                }
                next = fixes.next() => match next {
                    Some(fix) => fix,
                    None => break,
                },
            };
            self.handle_fix(&fix).await;
            handled += 1;
        }

        debug!(fixes.handled = handled, "Foreground fix stream finished");
        handled
    }

    fn warm_up(&mut self, fix: &Fix) -> Outcome {
        self.live_position = Some(*fix);
        if fix.effective_accuracy() <= WARMUP_ACCURACY_THRESHOLD_M {
            self.warmup_count += 1;
        } else {
            self.warmup_count = 0;
        }

        if self.warmup_count >= WARMUP_REQUIRED_FIXES {
            self.warmup_count = 0;
            self.mode = Mode::Tracking;
            info!(fix.timestamp = fix.timestamp, "Warm-up complete");
            Outcome::WarmupComplete
        } else {
            Outcome::Warming {
                good_fixes: self.warmup_count,
            }
        }
    }

    async fn track_fix(&mut self, fix: &Fix) -> Outcome {
        if let Some(last) = self.last_point {
            if fix.timestamp <= last.timestamp {
                debug!(
                    fix.timestamp = fix.timestamp,
                    last.timestamp = last.timestamp,
                    "Dropping out-of-order fix"
                );
                return Outcome::OutOfOrder;
            }
        }

        self.live_position = Some(*fix);
        let result = self.classifier.classify(fix, self.anchor, &self.state);

        let Some(point) = result.track_point(fix) else {
            if result.decision == Decision::NoAnchor {
                self.anchor = Some(fix.position());
            }
            if result.decision != Decision::LowAccuracy {
                self.state = result.state;
            }
            debug!(
                fix.timestamp = fix.timestamp,
                track.decision = result.decision.as_str(),
                track.confidence = result.state.confidence,
                "Fix rejected"
            );
            return Outcome::Rejected(result.decision);
        };

        if let Err(e) = self.store.append(&point).await {
            warn!(fix.timestamp = fix.timestamp, "Foreground append failed; fix lost");
            self.reporter.report(
                &e,
                &ReportContext::for_fix(TaskKind::Foreground, "append", fix.timestamp),
            );
            return Outcome::StoreFailed;
        }

        self.state = result.state;
        self.last_point = Some(point);
        self.anchor = Some(point.position());
        self.track.push(point);
        if !self.has_started_tracking {
            self.has_started_tracking = true;
            info!(fix.timestamp = fix.timestamp, "Tracking started");
        }
        debug!(
            fix.timestamp = fix.timestamp,
            track.moving = point.is_moving(),
            track.confidence = point.confidence,
            "Fix stored"
        );
        Outcome::Stored(point)
    }

    fn publish(&self) {
        self.snapshot.send_replace(TrackSnapshot {
            mode: self.mode,
            live_position: self.live_position,
            is_warming_up: self.is_warming_up(),
            has_started_tracking: self.has_started_tracking,
            trusted_track: self.trusted_track(),
            metrics: self.metrics(),
        });
    }
}
