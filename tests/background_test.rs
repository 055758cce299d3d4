// ABOUTME: Integration tests for the background persistence task
// ABOUTME: Bad-signal marking, ordering guard, batch abort on failure, and equivalence with a foreground run
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::future;
use std::sync::Arc;

use futures_util::stream;
use helpers::{fix_north, steady_walk, FailingStore, RecordingReporter};
use trackline::background::{BackgroundTask, BatchOutcome};
use trackline::classifier::MovementClassifier;
use trackline::errors::ErrorCode;
use trackline::foreground::ForegroundPipeline;
use trackline::hydration::hydrate_state;
use trackline::metrics::trusted_points;
use trackline::models::{Fix, TrackPoint};
use trackline::reporting::{default_reporter, TaskKind};
use trackline::store::{InMemoryTrackStore, SqliteTrackStore, TrackStore};

/// Walk north with one poor fix in the middle, stand still, then walk on
fn commute() -> Vec<Fix> {
    let mut fixes = steady_walk(10, 6.0, 4.0, 0);
    fixes[5].accuracy = Some(28.0);
    let mut ts = 10_000;
    for _ in 0..12 {
        fixes.push(fix_north(54.0, 4.0, ts));
        ts += 1_000;
    }
    for i in 1..8 {
        fixes.push(fix_north(54.0 + f64::from(i) * 6.5, 4.0, ts));
        ts += 1_000;
    }
    fixes
}

#[tokio::test]
async fn test_two_invocations_match_single_foreground_run() {
    let fixes = commute();

    let fg_store = Arc::new(InMemoryTrackStore::new());
    let mut fg = ForegroundPipeline::new(
        fg_store.clone(),
        MovementClassifier::default(),
        default_reporter(),
    );
    fg.enter_foreground().await.unwrap();
    fg.run(stream::iter(fixes.clone()), future::pending::<()>()).await;
    let foreground_trusted = trusted_points(&fg_store.all_points().await.unwrap());

    let bg_store = SqliteTrackStore::connect("sqlite::memory:").await.unwrap();
    let task = BackgroundTask::default();
    let first = task.process_batch(&bg_store, &fixes[..8]).await;
    let second = task.process_batch(&bg_store, &fixes[8..]).await;
    assert!(!first.aborted && !second.aborted);
    assert_eq!(first.bad_signal, 1);

    let background_trusted = trusted_points(&bg_store.all_points().await.unwrap());
    assert!(!foreground_trusted.is_empty());
    assert_eq!(background_trusted, foreground_trusted);
}

/// Walk 24 m, stand still for 7 s, walk on in 7 m steps
fn walk_pause_walk() -> Vec<Fix> {
    let mut fixes = steady_walk(5, 6.0, 4.0, 0);
    for i in 0..7 {
        fixes.push(fix_north(24.0, 4.0, 5_000 + i * 1_000));
    }
    for i in 1..=3 {
        fixes.push(fix_north(24.0 + f64::from(i) * 7.0, 4.0, 11_000 + i64::from(i) * 1_000));
    }
    fixes
}

#[tokio::test]
async fn test_cut_inside_throttle_window_keeps_stored_confidence() {
    let fixes = walk_pause_walk();
    let task = BackgroundTask::default();

    let whole = InMemoryTrackStore::new();
    task.process_batch(&whole, &fixes).await;
    let whole_points = whole.all_points().await.unwrap();
    let whole_times: Vec<i64> = whole_points.iter().map(|p| p.timestamp).collect();
    assert_eq!(
        whole_times,
        [1_000, 2_000, 3_000, 4_000, 5_000, 6_000, 11_000, 13_000, 14_000]
    );

    // The cut falls after four throttled fixes; their decay never reached the store
    let split = InMemoryTrackStore::new();
    task.process_batch(&split, &fixes[..11]).await;
    assert_eq!(split.last_point().await.unwrap().unwrap().confidence, 3);
    task.process_batch(&split, &fixes[11..]).await;
    let split_points = split.all_points().await.unwrap();

    let confidence_at = |points: &[TrackPoint], ts: i64| {
        points.iter().find(|p| p.timestamp == ts).map(|p| p.confidence)
    };
    assert_eq!(confidence_at(&whole_points, 11_000), Some(0));
    assert_eq!(confidence_at(&split_points, 11_000), Some(2));

    // Higher resumed confidence confirms movement one fix earlier
    let moving_after_rest = |points: &[TrackPoint]| -> Vec<i64> {
        points
            .iter()
            .filter(|p| p.timestamp > 11_000 && p.is_moving())
            .map(|p| p.timestamp)
            .collect()
    };
    assert_eq!(moving_after_rest(&whole_points), [13_000, 14_000]);
    assert_eq!(moving_after_rest(&split_points), [12_000, 13_000, 14_000]);
    assert_eq!(
        trusted_points(&split_points).len(),
        trusted_points(&whole_points).len() + 1
    );
}

#[tokio::test]
async fn test_inaccurate_fixes_are_stored_as_bad_signal() {
    let store = InMemoryTrackStore::new();
    let task = BackgroundTask::default();
    let walk = steady_walk(4, 6.0, 4.0, 0);
    task.process_batch(&store, &walk).await;
    let confidence = store.last_point().await.unwrap().unwrap().confidence;

    let poor: Vec<Fix> = (0..4)
        .map(|i| fix_north(100.0 + f64::from(i) * 50.0, 40.0, 10_000 + i64::from(i) * 1_000))
        .collect();
    let outcome = task.process_batch(&store, &poor).await;
    assert_eq!(
        outcome,
        BatchOutcome {
            received: 4,
            bad_signal: 4,
            ..BatchOutcome::default()
        }
    );

    let points = store.all_points().await.unwrap();
    let bad: Vec<&TrackPoint> = points.iter().filter(|p| p.bad_signal).collect();
    assert_eq!(bad.len(), 4);
    assert!(bad.iter().all(|p| p.is_stationary && !p.is_moving()));
    assert!(bad.iter().all(|p| p.confidence == confidence));
    assert_eq!(store.recent_bad_signal_run(5).await.unwrap(), 4);

    // Bad rows never feed back into classifier state
    let hydrated = hydrate_state(&store).await.unwrap();
    assert_eq!(hydrated.state.last_accepted_timestamp, Some(3_000));
    assert_eq!(hydrated.last_timestamp(), Some(13_000));
}

#[tokio::test]
async fn test_stale_fixes_are_dropped() {
    let store = InMemoryTrackStore::new();
    let task = BackgroundTask::default();
    task.process_batch(&store, &steady_walk(4, 6.0, 4.0, 10_000)).await;

    let replayed = steady_walk(6, 6.0, 4.0, 8_000);
    let outcome = task.process_batch(&store, &replayed).await;
    // Every replayed fix is at or before the last stored point
    assert_eq!(outcome.out_of_order, 6);
    assert_eq!(outcome.stored, 0);
    assert_eq!(store.point_count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_store_failure_abandons_rest_of_batch() {
    let store = FailingStore::failing_after(2);
    let reporter = RecordingReporter::new();
    let task = BackgroundTask::new(MovementClassifier::default(), reporter.clone());

    let walk = steady_walk(6, 6.0, 4.0, 0);
    let outcome = task.process_batch(&store, &walk).await;

    assert!(outcome.aborted);
    assert_eq!(outcome.stored, 2);
    assert_eq!(outcome.rejected, 1);
    assert_eq!(store.inner().point_count().await.unwrap(), 2);

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    let (code, context) = reports[0];
    assert_eq!(code, ErrorCode::DatabaseError);
    assert_eq!(context.task, TaskKind::Background);
    assert_eq!(context.operation, "append");
    assert_eq!(context.fix_timestamp, Some(3_000));
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let store = InMemoryTrackStore::new();
    let outcome = BackgroundTask::default().process_batch(&store, &[]).await;
    assert_eq!(outcome, BatchOutcome::default());
    assert_eq!(store.point_count().await.unwrap(), 0);
}
