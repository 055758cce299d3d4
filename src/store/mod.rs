// ABOUTME: Durable per-session track store abstraction with SQLite and in-memory backends
// ABOUTME: Append-only log of classified points plus the queries hydration needs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Durable Track Store
//!
//! One append-only log of [`TrackPoint`]s per active session. Both producers
//! (foreground pipeline and background task) write here, but never at the
//! same time: the session controller stops one producer and waits a grace
//! period before the other starts. The store does no cross-producer locking
//! of its own; single-writer access is a precondition of [`TrackStore::append`].

/// In-memory store for tests and hosts without durable storage
pub mod memory;
/// `SQLite` store backed by sqlx
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryTrackStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteTrackStore;

use crate::errors::AppResult;
use crate::models::TrackPoint;

/// Storage backend for the session's classified points
///
/// # Examples
///
/// ```rust,no_run
/// use trackline::models::{Fix, TrackPoint};
/// use trackline::store::{InMemoryTrackStore, TrackStore};
/// # async fn example() -> trackline::errors::AppResult<()> {
/// let store = InMemoryTrackStore::new();
/// let fix = Fix::new(52.0, 4.0, Some(5.0), 1_000);
/// store.append(&TrackPoint::classified(&fix, false, 0)).await?;
/// assert_eq!(store.last_point().await?.map(|p| p.timestamp), Some(1_000));
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait TrackStore: Send + Sync {
    /// Append a point to the end of the log
    ///
    /// Precondition: only one producer writes to the store at a time.
    ///
    /// # Errors
    ///
    /// Returns `ErrorCode::OrderingViolation` if the timestamp does not
    /// strictly follow the last stored point, or a storage error if the
    /// write fails.
    async fn append(&self, point: &TrackPoint) -> AppResult<()>;

    /// Last stored point of any kind
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn last_point(&self) -> AppResult<Option<TrackPoint>>;

    /// Last stored point that is not a bad-signal marker
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn last_classified_point(&self) -> AppResult<Option<TrackPoint>>;

    /// Most recent point with `is_stationary = false` and `bad_signal = false`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn last_moving_point(&self) -> AppResult<Option<TrackPoint>>;

    /// Length of the trailing run of bad-signal points among the last `n` rows
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn recent_bad_signal_run(&self, n: u32) -> AppResult<u32>;

    /// Every stored point in timestamp order
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn all_points(&self) -> AppResult<Vec<TrackPoint>>;

    /// Number of stored points
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails
    async fn point_count(&self) -> AppResult<usize>;

    /// Drop every point and start a fresh log
    ///
    /// Only valid between sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reset
    async fn clear(&self) -> AppResult<()>;
}

/// Count the leading `true` flags of a newest-first sequence of bad-signal flags
pub(crate) fn trailing_bad_signal_run(newest_first: impl Iterator<Item = bool>) -> u32 {
    newest_first.take_while(|bad| *bad).count() as u32
}
