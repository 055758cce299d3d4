// ABOUTME: Engine constants re-exported from trackline-core
// ABOUTME: Classifier thresholds, warm-up, background, session, geo and storage values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use trackline_core::constants::*;
