// ABOUTME: Session lifecycle controller owning the store, both producers and the handoff protocol
// ABOUTME: Start, stop, save and discard plus foreground/background visibility transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Lifecycle
//!
//! A recording session is the unit the user starts, saves or discards. The
//! controller makes sure the two producers never write at the same time:
//! one is stopped, the handoff grace period elapses, then the other starts.
//!
//! ```text
//!            start()                enter_background()
//!   Idle ─────────────► Foreground ───────────────────► Background
//!                           ▲                               │
//!                           └──────── enter_foreground() ───┘
//! ```

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use crate::background::{BackgroundTask, BatchOutcome};
use crate::classifier::MovementClassifier;
use crate::config::TrackingConfig;
use crate::errors::{AppError, AppResult};
use crate::foreground::{ForegroundPipeline, Outcome, TrackSnapshot};
use crate::metrics::{self, EffortProfile, TrackMetrics};
use crate::models::{ActivityKind, Fix, TrackPoint};
use crate::reporting::{default_reporter, ReportContext, SharedReporter, TaskKind};
use crate::store::TrackStore;

/// Location service status reported by the host at start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAvailability {
    /// Permission granted and services on
    Available,
    /// User refused location permission
    PermissionDenied,
    /// Location services switched off or no provider
    Unavailable,
}

/// Whether the host app is currently visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// App on screen; the foreground pipeline owns the store
    #[default]
    Foreground,
    /// App hidden; background batches own the store
    Background,
}

/// Profile data used to finish a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    /// What the user was doing
    pub activity: ActivityKind,
    /// Body weight in kilograms; falls back to the configured default
    #[serde(default)]
    pub body_weight_kg: Option<f64>,
    /// Explicit MET value replacing the activity default
    #[serde(default)]
    pub met_override: Option<f64>,
}

impl SessionProfile {
    /// Profile for an activity with default weight and MET
    #[must_use]
    pub const fn for_activity(activity: ActivityKind) -> Self {
        Self {
            activity,
            body_weight_kg: None,
            met_override: None,
        }
    }

    fn effort(&self, default_body_weight_kg: f64) -> EffortProfile {
        let effort = EffortProfile::for_activity(
            self.activity,
            self.body_weight_kg.unwrap_or(default_body_weight_kg),
        );
        match self.met_override {
            Some(met) => effort.with_met(met),
            None => effort,
        }
    }
}

/// What a saved session hands to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: Uuid,
    /// When `start` succeeded
    pub started_at: DateTime<Utc>,
    /// When `save` was called
    pub finished_at: DateTime<Utc>,
    /// Activity the metrics were computed for
    pub activity: ActivityKind,
    /// Rows in the store at save time, bad-signal markers included
    pub stored_points: usize,
    /// Trusted sub-sequence
    pub trusted_track: Vec<TrackPoint>,
    /// Derived metrics
    pub metrics: TrackMetrics,
}

/// Recording session controller
pub struct TrackingSession<S: TrackStore + ?Sized> {
    config: TrackingConfig,
    store: Arc<S>,
    reporter: SharedReporter,
    foreground: ForegroundPipeline<S>,
    background: BackgroundTask,
    profile: SessionProfile,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    visibility: Visibility,
    recording: bool,
    background_tracking: bool,
}

impl<S: TrackStore + ?Sized> TrackingSession<S> {
    /// Create a controller with the default tracing reporter
    #[must_use]
    pub fn new(store: Arc<S>, config: TrackingConfig) -> Self {
        Self::with_reporter(store, config, default_reporter())
    }

    /// Create a controller with a host-supplied error reporter
    #[must_use]
    pub fn with_reporter(store: Arc<S>, config: TrackingConfig, reporter: SharedReporter) -> Self {
        let classifier = MovementClassifier::new(config.classifier);
        let profile = SessionProfile::for_activity(ActivityKind::default());
        let mut foreground = ForegroundPipeline::new(store.clone(), classifier, reporter.clone());
        foreground.set_profile(profile.effort(config.default_body_weight_kg));
        Self {
            background: BackgroundTask::new(classifier, reporter.clone()),
            config,
            store,
            reporter,
            foreground,
            profile,
            session_id: None,
            started_at: None,
            visibility: Visibility::Foreground,
            recording: false,
            background_tracking: false,
        }
    }

    /// Identifier of the active session
    #[must_use]
    pub const fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Whether a session exists, stopped or not
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    /// Whether fixes are being recorded; false once the session is stopped
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.recording
    }

    /// Activity and body data driving live metrics
    #[must_use]
    pub const fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    /// Update the activity and body data used for live metrics
    pub fn set_profile(&mut self, profile: SessionProfile) {
        self.profile = profile;
        self.foreground
            .set_profile(profile.effort(self.config.default_body_weight_kg));
    }

    /// Current host visibility
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether background batches are currently processed
    #[must_use]
    pub const fn is_background_tracking(&self) -> bool {
        self.background_tracking
    }

    /// Foreground pipeline, for renderer accessors
    #[must_use]
    pub const fn foreground(&self) -> &ForegroundPipeline<S> {
        &self.foreground
    }

    /// Subscribe to renderer snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrackSnapshot> {
        self.foreground.subscribe()
    }

    /// Store shared by both producers
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Start a fresh session
    ///
    /// # Errors
    ///
    /// Returns `LocationPermissionDenied` / `LocationUnavailable` when the
    /// host cannot deliver fixes, or a storage error if the store cannot be
    /// reset.
    pub async fn start(&mut self, availability: LocationAvailability) -> AppResult<Uuid> {
        match availability {
            LocationAvailability::Available => {}
            LocationAvailability::PermissionDenied => {
                return Err(AppError::location_permission_denied());
            }
            LocationAvailability::Unavailable => {
                return Err(AppError::location_unavailable(
                    "location services are turned off",
                ));
            }
        }

        self.background_tracking = false;
        self.foreground.leave_foreground();
        self.handoff_pause().await;

        self.clear_store("start").await?;
        self.foreground.reset();

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.started_at = Some(Utc::now());
        self.visibility = Visibility::Foreground;
        self.recording = true;
        self.foreground.enter_foreground().await?;

        info!(session.id = %session_id, "Recording session started");
        Ok(session_id)
    }

    /// End tracking without clearing the store
    pub fn stop(&mut self) {
        self.recording = false;
        self.background_tracking = false;
        self.foreground.leave_foreground();
        if let Some(id) = self.session_id {
            info!(session.id = %id, "Recording session stopped");
        }
    }

    /// Host became visible: background off, grace period, foreground on
    ///
    /// # Errors
    ///
    /// Returns a storage error if foreground hydration fails
    pub async fn enter_foreground(&mut self) -> AppResult<()> {
        self.visibility = Visibility::Foreground;
        if !self.recording {
            return Ok(());
        }
        self.background_tracking = false;
        self.handoff_pause().await;
        let mode = self.foreground.enter_foreground().await?;
        debug!(mode = ?mode, "Handed store to foreground pipeline");
        Ok(())
    }

    /// Host was hidden: foreground off, grace period, background on
    pub async fn enter_background(&mut self) {
        self.visibility = Visibility::Background;
        if !self.recording {
            return;
        }
        self.foreground.leave_foreground();
        self.handoff_pause().await;
        self.background_tracking = self.config.background_enabled;
        debug!(
            background.enabled = self.background_tracking,
            "Handed store to background task"
        );
    }

    /// Deliver one foreground fix
    pub async fn handle_foreground_fix(&mut self, fix: &Fix) -> Outcome {
        self.foreground.handle_fix(fix).await
    }

    /// Drive the foreground pipeline from a push stream until it ends or `shutdown` resolves
    pub async fn run_foreground<F, C>(&mut self, fixes: F, shutdown: C) -> usize
    where
        F: Stream<Item = Fix>,
        C: Future<Output = ()>,
    {
        self.foreground.run(fixes, shutdown).await
    }

    /// Deliver one OS background batch; ignored unless background tracking is on
    pub async fn handle_background_batch(&self, fixes: &[Fix]) -> Option<BatchOutcome> {
        if !(self.recording && self.background_tracking) {
            debug!(batch.received = fixes.len(), "Background tracking off; batch ignored");
            return None;
        }
        Some(self.background.process_batch(self.store.as_ref(), fixes).await)
    }

    /// Finish the session and hand back everything the persistence layer needs
    ///
    /// # Errors
    ///
    /// Returns `SessionNotActive` without a running session, or a storage
    /// error if the track cannot be read or cleared
    pub async fn save(&mut self, profile: SessionProfile) -> AppResult<SessionSummary> {
        let (Some(session_id), Some(started_at)) = (self.session_id, self.started_at) else {
            return Err(AppError::session_not_active("save"));
        };
        self.stop();

        let points = self.store.all_points().await.inspect_err(|e| {
            self.reporter
                .report(e, &ReportContext::for_operation(TaskKind::Session, "all_points"));
        })?;
        let effort = profile.effort(self.config.default_body_weight_kg);
        let summary = SessionSummary {
            session_id,
            started_at,
            finished_at: Utc::now(),
            activity: profile.activity,
            stored_points: points.len(),
            trusted_track: metrics::trusted_points(&points),
            metrics: metrics::compute(&points, &effort),
        };

        self.clear_store("save").await?;
        self.end_session();
        info!(
            session.id = %session_id,
            track.points = summary.stored_points,
            track.distance_m = summary.metrics.distance_m,
            "Recording session saved"
        );
        Ok(summary)
    }

    /// Throw the session away
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be cleared
    pub async fn discard(&mut self) -> AppResult<()> {
        self.stop();
        self.clear_store("discard").await?;
        if let Some(id) = self.session_id {
            info!(session.id = %id, "Recording session discarded");
        }
        self.end_session();
        Ok(())
    }

    fn end_session(&mut self) {
        self.foreground.reset();
        self.session_id = None;
        self.started_at = None;
    }

    async fn clear_store(&self, operation: &'static str) -> AppResult<()> {
        self.store.clear().await.inspect_err(|e| {
            self.reporter
                .report(e, &ReportContext::for_operation(TaskKind::Session, operation));
        })
    }

    async fn handoff_pause(&self) {
        if !self.config.handoff_grace.is_zero() {
            sleep(self.config.handoff_grace).await;
        }
    }
}
