// ABOUTME: Core data models for the Trackline recording engine
// ABOUTME: Re-exports Fix, TrackPoint, MovementState and ActivityKind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Fix`: one raw GPS sample as delivered by the platform location service
//! - `TrackPoint`: a classified, persisted fix
//! - `MovementState`: the classifier state carried from one fix to the next
//! - `ActivityKind`: the outdoor activity being recorded, with its MET factor

mod activity;
mod fix;
mod movement;
mod track_point;

pub use activity::ActivityKind;
pub use fix::{Fix, GeoPoint};
pub use movement::{MovementState, MovingPoint};
pub use track_point::TrackPoint;
