// ABOUTME: Configuration module for the recording engine
// ABOUTME: Environment-driven engine settings and typed database URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for Trackline
//!
//! - **Environment**: engine settings loaded from environment variables
//! - **Database**: typed location of the durable track store

/// Typed track store location
pub mod database;
/// Environment-based engine configuration
pub mod environment;

pub use database::DatabaseUrl;
pub use environment::TrackingConfig;
