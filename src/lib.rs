// ABOUTME: Main library entry point for the Trackline GPS recording engine
// ABOUTME: Turns noisy location fixes into a trusted, durable track of moving and stationary points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Trackline
//!
//! GPS track recording and movement classification engine for outdoor
//! activity sessions. It receives raw location fixes, classifies each one as
//! moving or stationary, appends the result to a durable store, and exposes
//! the trusted track plus derived metrics to a renderer.
//!
//! ## Architecture
//!
//! - **Classifier**: pure hysteresis state machine deciding accept/reject and moving/stationary
//! - **Store**: append-only per-session log (`SQLite` or in-memory)
//! - **Hydration**: rebuilds classifier state from the store on every entry point
//! - **Foreground**: live fix stream with warm-up and renderer snapshots
//! - **Background**: stateless batch processor for OS-delivered fixes
//! - **Session**: start/stop/save/discard and the producer handoff protocol
//! - **Metrics**: distance, moving time, pace and calories over the trusted track
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trackline::config::TrackingConfig;
//! use trackline::errors::AppResult;
//! use trackline::models::Fix;
//! use trackline::session::{LocationAvailability, TrackingSession};
//! use trackline::store::InMemoryTrackStore;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let store = Arc::new(InMemoryTrackStore::new());
//!     let mut session = TrackingSession::new(store, TrackingConfig::default());
//!     session.start(LocationAvailability::Available).await?;
//!
//!     session.handle_foreground_fix(&Fix::new(52.0, 4.0, Some(5.0), 1_000)).await;
//!     println!("has started: {}", session.foreground().has_started_tracking());
//!     Ok(())
//! }
//! ```

/// Unified error handling re-exported from the core crate
pub mod errors;

/// Engine constants re-exported from the core crate
pub mod constants;

/// Track data models re-exported from the core crate
pub mod models;

/// Configuration management
pub mod config;

/// Structured logging setup
pub mod logging;

/// Great-circle distance helpers
pub mod geo;

/// Movement classifier
pub mod classifier;

/// Durable track store
pub mod store;

/// Classifier state reconstruction from the store
pub mod hydration;

/// Derived activity metrics
pub mod metrics;

/// Error reporting seam for non-fatal failures
pub mod reporting;

/// Foreground ingestion pipeline
pub mod foreground;

/// Background persistence task
pub mod background;

/// Session lifecycle controller
pub mod session;
