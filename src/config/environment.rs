// ABOUTME: Environment configuration for the recording engine and its hosts
// ABOUTME: Reads store location, handoff grace period, background switch and profile defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! Configuration is environment-only; there are no config files. Every
//! variable has a default so an embedded host can run with an empty
//! environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TRACKLINE_DATABASE_URL` | `sqlite:./data/track.db` |
//! | `TRACKLINE_HANDOFF_GRACE_MS` | `200` |
//! | `TRACKLINE_BACKGROUND_ENABLED` | `true` |
//! | `TRACKLINE_BODY_WEIGHT_KG` | `70.0` |

use super::database::DatabaseUrl;
use crate::classifier::ClassifierConfig;
use crate::constants::session::{DEFAULT_BODY_WEIGHT_KG, HANDOFF_GRACE_MS};
use crate::constants::storage::DEFAULT_DATABASE_URL;
use crate::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Environment variable names
pub mod keys {
    /// Track store database URL
    pub const DATABASE_URL: &str = "TRACKLINE_DATABASE_URL";
    /// Producer handoff grace period in milliseconds
    pub const HANDOFF_GRACE_MS: &str = "TRACKLINE_HANDOFF_GRACE_MS";
    /// Whether background batches are processed at all
    pub const BACKGROUND_ENABLED: &str = "TRACKLINE_BACKGROUND_ENABLED";
    /// Fallback body weight for calorie estimates
    pub const BODY_WEIGHT_KG: &str = "TRACKLINE_BODY_WEIGHT_KG";
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Where the durable track store lives
    pub database_url: DatabaseUrl,
    /// Delay between stopping one producer and touching the store
    pub handoff_grace: Duration,
    /// Process background batches while the app is not visible
    pub background_enabled: bool,
    /// Body weight used when the profile collaborator supplies none
    pub default_body_weight_kg: f64,
    /// Classifier thresholds
    pub classifier: ClassifierConfig,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            database_url: DatabaseUrl::default(),
            handoff_grace: Duration::from_millis(HANDOFF_GRACE_MS),
            background_enabled: true,
            default_body_weight_kg: DEFAULT_BODY_WEIGHT_KG,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl TrackingConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ErrorCode::ConfigInvalid` if a variable is set but cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let database_url = DatabaseUrl::parse_url(&env_var_or(keys::DATABASE_URL, DEFAULT_DATABASE_URL))?;
        let grace_ms: u64 = parse_env(keys::HANDOFF_GRACE_MS, HANDOFF_GRACE_MS)?;
        let background_enabled = parse_bool_env(keys::BACKGROUND_ENABLED, true)?;
        let default_body_weight_kg: f64 = parse_env(keys::BODY_WEIGHT_KG, DEFAULT_BODY_WEIGHT_KG)?;

        if !default_body_weight_kg.is_finite() || default_body_weight_kg <= 0.0 {
            return Err(AppError::config_invalid(
                keys::BODY_WEIGHT_KG,
                &default_body_weight_kg.to_string(),
            ));
        }

        let config = Self {
            database_url,
            handoff_grace: Duration::from_millis(grace_ms),
            background_enabled,
            default_body_weight_kg,
            classifier: ClassifierConfig::default(),
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            db.url = %self.database_url,
            handoff.grace_ms = self.handoff_grace.as_millis() as u64,
            background.enabled = self.background_enabled,
            "Tracking configuration loaded"
        );
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config_invalid(key, &raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config_invalid(key, &raw)),
        },
        Err(_) => Ok(default),
    }
}
