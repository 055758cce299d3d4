// ABOUTME: SQLite track store implementation using sqlx
// ABOUTME: One append-only track_points table keyed by timestamp, dropped and recreated between sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{trailing_bad_signal_run, TrackStore};
use crate::config::database::DatabaseUrl;
use crate::constants::storage::TRACK_POINTS_TABLE;
use crate::errors::{AppError, AppResult};
use crate::models::TrackPoint;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = r"
    SELECT timestamp, latitude, longitude, altitude, accuracy,
           is_stationary, confidence, bad_signal
    FROM track_points
";

/// `SQLite`-backed durable track store
#[derive(Debug, Clone)]
pub struct SqliteTrackStore {
    pool: SqlitePool,
}

impl SqliteTrackStore {
    /// Connect to the database and make sure the track table exists
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or the
    /// table cannot be created
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let url = DatabaseUrl::parse_url(database_url)?;
        if let DatabaseUrl::SQLite { path } = &url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::storage(format!(
                        "Failed to create track store directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        // In-memory databases live and die with their connection
        let max_connections = if url.is_memory() { 1 } else { 4 };
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if url.is_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to track store: {e}")))?;

        info!(db.url = %url, "Track store connected");
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the track table exists
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created
    pub async fn from_pool(pool: SqlitePool) -> AppResult<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the track table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS track_points (
                timestamp INTEGER PRIMARY KEY,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                altitude REAL,
                accuracy REAL,
                is_stationary BOOLEAN NOT NULL,
                confidence INTEGER NOT NULL,
                bad_signal BOOLEAN NOT NULL DEFAULT false
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create track table: {e}")))?;

        Ok(())
    }

    async fn fetch_one_where(&self, filter: &str) -> AppResult<Option<TrackPoint>> {
        let sql = format!("{SELECT_COLUMNS} {filter} ORDER BY timestamp DESC LIMIT 1");
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query track points: {e}")))?;

        row.as_ref().map(row_to_point).transpose()
    }
}

fn row_to_point(row: &SqliteRow) -> AppResult<TrackPoint> {
    let decode = |e: sqlx::Error| AppError::database(format!("Failed to decode track point: {e}"));
    Ok(TrackPoint {
        timestamp: row.try_get("timestamp").map_err(decode)?,
        latitude: row.try_get("latitude").map_err(decode)?,
        longitude: row.try_get("longitude").map_err(decode)?,
        altitude: row.try_get("altitude").map_err(decode)?,
        accuracy: row.try_get("accuracy").map_err(decode)?,
        is_stationary: row.try_get("is_stationary").map_err(decode)?,
        confidence: row.try_get("confidence").map_err(decode)?,
        bad_signal: row.try_get("bad_signal").map_err(decode)?,
    })
}

#[async_trait::async_trait]
impl TrackStore for SqliteTrackStore {
    async fn append(&self, point: &TrackPoint) -> AppResult<()> {
        let last: Option<i64> = sqlx::query_scalar("SELECT MAX(timestamp) FROM track_points")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read last timestamp: {e}")))?;

        if let Some(last) = last {
            if point.timestamp <= last {
                return Err(AppError::ordering_violation(point.timestamp, last));
            }
        }

        sqlx::query(
            r"
            INSERT INTO track_points
                (timestamp, latitude, longitude, altitude, accuracy,
                 is_stationary, confidence, bad_signal)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(point.timestamp)
        .bind(point.latitude)
        .bind(point.longitude)
        .bind(point.altitude)
        .bind(point.accuracy)
        .bind(point.is_stationary)
        .bind(point.confidence)
        .bind(point.bad_signal)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to append track point: {e}")))?;

        debug!(
            db.table = TRACK_POINTS_TABLE,
            point.timestamp = point.timestamp,
            point.stationary = point.is_stationary,
            point.bad_signal = point.bad_signal,
            "Track point appended"
        );
        Ok(())
    }

    async fn last_point(&self) -> AppResult<Option<TrackPoint>> {
        self.fetch_one_where("").await
    }

    async fn last_classified_point(&self) -> AppResult<Option<TrackPoint>> {
        self.fetch_one_where("WHERE bad_signal = 0").await
    }

    async fn last_moving_point(&self) -> AppResult<Option<TrackPoint>> {
        self.fetch_one_where("WHERE is_stationary = 0 AND bad_signal = 0")
            .await
    }

    async fn recent_bad_signal_run(&self, n: u32) -> AppResult<u32> {
        let flags: Vec<bool> = sqlx::query_scalar(
            "SELECT bad_signal FROM track_points ORDER BY timestamp DESC LIMIT ?1",
        )
        .bind(i64::from(n))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read bad-signal run: {e}")))?;

        Ok(trailing_bad_signal_run(flags.into_iter()))
    }

    async fn all_points(&self) -> AppResult<Vec<TrackPoint>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load track points: {e}")))?;

        rows.iter().map(row_to_point).collect()
    }

    async fn point_count(&self) -> AppResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM track_points")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count track points: {e}")))?;

        Ok(count as usize)
    }

    async fn clear(&self) -> AppResult<()> {
        sqlx::query("DROP TABLE IF EXISTS track_points")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to drop track table: {e}")))?;

        self.migrate().await?;
        info!(db.table = TRACK_POINTS_TABLE, "Track store cleared");
        Ok(())
    }
}
