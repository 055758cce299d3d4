// ABOUTME: Unified error handling re-exported from trackline-core
// ABOUTME: AppError, ErrorCode and AppResult live in the foundation crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Re-exports [`trackline_core::errors`] so engine modules and hosts use one
//! path for errors.

pub use trackline_core::errors::*;
