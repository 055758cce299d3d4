// ABOUTME: Track data models re-exported from trackline-core
// ABOUTME: Fix, TrackPoint, MovementState, GeoPoint and ActivityKind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! The foundation crate owns the model types; this module re-exports them.

pub use trackline_core::models::*;
