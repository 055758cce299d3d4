// ABOUTME: In-memory track store implementation backed by a shared vector
// ABOUTME: Enforces the same ordering invariant as the SQLite store; contents vanish with the process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{trailing_bad_signal_run, TrackStore};
use crate::errors::{AppError, AppResult};
use crate::models::TrackPoint;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory track store
///
/// Cloning shares the underlying log, which lets tests hand the same store
/// to a foreground pipeline and a background task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackStore {
    points: Arc<RwLock<Vec<TrackPoint>>>,
}

impl InMemoryTrackStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with points
    ///
    /// # Errors
    ///
    /// Returns an ordering violation if the points are not strictly increasing
    pub fn with_points(points: Vec<TrackPoint>) -> AppResult<Self> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AppError::ordering_violation(
                    pair[1].timestamp,
                    pair[0].timestamp,
                ));
            }
        }
        Ok(Self {
            points: Arc::new(RwLock::new(points)),
        })
    }
}

#[async_trait::async_trait]
impl TrackStore for InMemoryTrackStore {
    async fn append(&self, point: &TrackPoint) -> AppResult<()> {
        let mut points = self.points.write().await;
        if let Some(last) = points.last() {
            if point.timestamp <= last.timestamp {
                return Err(AppError::ordering_violation(point.timestamp, last.timestamp));
            }
        }
        points.push(*point);
        Ok(())
    }

    async fn last_point(&self) -> AppResult<Option<TrackPoint>> {
        Ok(self.points.read().await.last().copied())
    }

    async fn last_classified_point(&self) -> AppResult<Option<TrackPoint>> {
        Ok(self
            .points
            .read()
            .await
            .iter()
            .rev()
            .find(|p| !p.bad_signal)
            .copied())
    }

    async fn last_moving_point(&self) -> AppResult<Option<TrackPoint>> {
        Ok(self
            .points
            .read()
            .await
            .iter()
            .rev()
            .find(|p| p.is_moving())
            .copied())
    }

    async fn recent_bad_signal_run(&self, n: u32) -> AppResult<u32> {
        let points = self.points.read().await;
        Ok(trailing_bad_signal_run(
            points.iter().rev().take(n as usize).map(|p| p.bad_signal),
        ))
    }

    async fn all_points(&self) -> AppResult<Vec<TrackPoint>> {
        Ok(self.points.read().await.clone())
    }

    async fn point_count(&self) -> AppResult<usize> {
        Ok(self.points.read().await.len())
    }

    async fn clear(&self) -> AppResult<()> {
        self.points.write().await.clear();
        Ok(())
    }
}
