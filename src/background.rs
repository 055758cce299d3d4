// ABOUTME: Background persistence task invoked with batches of fixes while the app is not visible
// ABOUTME: Stateless across invocations; rebuilds classifier state from the store every time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Background Persistence Task
//!
//! The OS may run each invocation in a fresh process, so nothing survives
//! between batches except what is in the store. Every invocation hydrates
//! [`MovementState`](crate::models::MovementState) from the last rows and
//! processes its fixes strictly in order.
//!
//! Fixes failing the accuracy gate are not dropped here: they are stored as
//! bad-signal markers so the gap is visible in the log. Those rows never feed
//! back into classification.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::{Decision, MovementClassifier};
use crate::constants::background::BAD_SIGNAL_WARN_RUN;
use crate::hydration::hydrate_state;
use crate::models::{Fix, TrackPoint};
use crate::reporting::{default_reporter, ReportContext, SharedReporter, TaskKind};
use crate::store::TrackStore;

/// Counters for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchOutcome {
    /// Fixes delivered by the OS
    pub received: usize,
    /// Classified points appended
    pub stored: usize,
    /// Bad-signal markers appended
    pub bad_signal: usize,
    /// Fixes the classifier did not accept
    pub rejected: usize,
    /// Fixes not newer than the last stored point
    pub out_of_order: usize,
    /// A store failure ended the batch early
    pub aborted: bool,
}

/// Background fix processor
#[derive(Clone)]
pub struct BackgroundTask {
    classifier: MovementClassifier,
    reporter: SharedReporter,
}

impl Default for BackgroundTask {
    fn default() -> Self {
        Self::new(MovementClassifier::default(), default_reporter())
    }
}

impl BackgroundTask {
    /// Create a task with the given classifier and reporter
    #[must_use]
    pub fn new(classifier: MovementClassifier, reporter: SharedReporter) -> Self {
        Self {
            classifier,
            reporter,
        }
    }

    /// Process one OS-delivered batch
    ///
    /// Any store failure is reported and the remaining fixes are abandoned;
    /// there is no retry.
    pub async fn process_batch<S: TrackStore + ?Sized>(
        &self,
        store: &S,
        fixes: &[Fix],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            received: fixes.len(),
            ..BatchOutcome::default()
        };

        let hydrated = match hydrate_state(store).await {
            Ok(hydrated) => hydrated,
            Err(e) => {
                self.reporter.report(
                    &e,
                    &ReportContext::for_operation(TaskKind::Background, "hydrate"),
                );
                outcome.aborted = true;
                return outcome;
            }
        };

        let mut state = hydrated.state;
        let mut anchor = hydrated.anchor();
        let mut last_timestamp = hydrated.last_timestamp();
        let mut bad_signal_run = hydrated.bad_signal_run;

        for fix in fixes {
            if last_timestamp.is_some_and(|last| fix.timestamp <= last) {
                debug!(fix.timestamp = fix.timestamp, "Dropping out-of-order fix");
                outcome.out_of_order += 1;
                continue;
            }

            if !self.classifier.is_accurate(fix) {
                let point = TrackPoint::bad_signal(fix, state.confidence);
                if !self.append(store, &point).await {
                    outcome.aborted = true;
                    break;
                }
                last_timestamp = Some(fix.timestamp);
                outcome.bad_signal += 1;
                bad_signal_run += 1;
                if bad_signal_run == BAD_SIGNAL_WARN_RUN {
                    warn!(
                        fix.timestamp = fix.timestamp,
                        fix.accuracy = ?fix.accuracy,
                        bad_signal.run = bad_signal_run,
                        "Sustained poor GPS signal in background"
                    );
                }
                continue;
            }

            let result = self.classifier.classify(fix, anchor, &state);
            state = result.state;

            let Some(point) = result.track_point(fix) else {
                if result.decision == Decision::NoAnchor {
                    anchor = Some(fix.position());
                }
                outcome.rejected += 1;
                continue;
            };

            if !self.append(store, &point).await {
                outcome.aborted = true;
                break;
            }
            last_timestamp = Some(point.timestamp);
            anchor = Some(point.position());
            bad_signal_run = 0;
            outcome.stored += 1;
        }

        info!(
            batch.received = outcome.received,
            batch.stored = outcome.stored,
            batch.bad_signal = outcome.bad_signal,
            batch.rejected = outcome.rejected,
            batch.out_of_order = outcome.out_of_order,
            batch.aborted = outcome.aborted,
            "Background batch processed"
        );
        outcome
    }

    async fn append<S: TrackStore + ?Sized>(&self, store: &S, point: &TrackPoint) -> bool {
        match store.append(point).await {
            Ok(()) => true,
            Err(e) => {
                self.reporter.report(
                    &e,
                    &ReportContext::for_fix(TaskKind::Background, "append", point.timestamp),
                );
                false
            }
        }
    }
}
