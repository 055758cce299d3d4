// ABOUTME: Core types and constants for the Trackline GPS track recording engine
// ABOUTME: Foundation crate with error handling, engine constants, and track data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Trackline Core
//!
//! Foundation crate providing shared types and constants for the Trackline
//! recording engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Classifier, warm-up, background and session constants
//! - **models**: `Fix`, `TrackPoint`, `MovementState`, `GeoPoint`, `ActivityKind`

/// Unified error handling system with standard error codes
pub mod errors;

/// Engine constants organized by component
pub mod constants;

/// Core data models for raw fixes, stored points and classifier state
pub mod models;
