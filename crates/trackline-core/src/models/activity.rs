// ABOUTME: Outdoor activity kinds recorded with GPS tracking
// ABOUTME: Carries default MET factors for calorie estimation and string parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Outdoor activity types that use GPS track recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Running or jogging
    #[default]
    Running,
    /// Walking at a moderate pace
    Walking,
    /// Road or leisure cycling
    Cycling,
    /// Hiking on trails
    Hiking,
}

impl ActivityKind {
    /// Default metabolic equivalent for the activity
    ///
    /// Reference: Ainsworth, B.E. et al. (2011). Compendium of Physical Activities.
    #[must_use]
    pub const fn met(&self) -> f64 {
        match self {
            Self::Running => 9.8,
            Self::Walking => 3.5,
            Self::Cycling => 7.5,
            Self::Hiking => 6.0,
        }
    }

    /// Convert to string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Hiking => "hiking",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" | "run" => Ok(Self::Running),
            "walking" | "walk" => Ok(Self::Walking),
            "cycling" | "ride" | "bike" => Ok(Self::Cycling),
            "hiking" | "hike" => Ok(Self::Hiking),
            other => Err(AppError::invalid_input(format!(
                "unknown activity kind: {other}"
            ))),
        }
    }
}
