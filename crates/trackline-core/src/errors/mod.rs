// ABOUTME: Unified error type and error codes for the Trackline engine
// ABOUTME: AppError carries a stable ErrorCode, a message and an optional chained source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the engine returns [`AppResult`]. Errors are
//! grouped by [`ErrorCode`] so the session layer can tell a storage failure
//! apart from a location permission problem without string matching.
//!
//! Low-quality fixes and out-of-order timestamps are *not* errors: producers
//! handle them locally and never construct an `AppError` for them.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A point was appended out of timestamp order
    #[serde(rename = "ORDERING_VIOLATION")]
    OrderingViolation = 3001,

    // Location service (4000-4999)
    /// The user denied location access
    #[serde(rename = "LOCATION_PERMISSION_DENIED")]
    LocationPermissionDenied = 4000,
    /// Location services are disabled or the receiver is unavailable
    #[serde(rename = "LOCATION_UNAVAILABLE")]
    LocationUnavailable = 4001,
    /// Operation requires an active recording session
    #[serde(rename = "SESSION_NOT_ACTIVE")]
    SessionNotActive = 4002,

    // Configuration (6000-6999)
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Database query or connection failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Non-database storage failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::OrderingViolation => "Track point timestamps must be strictly increasing",
            Self::LocationPermissionDenied => "Location permission was denied",
            Self::LocationUnavailable => "Location services are unavailable",
            Self::SessionNotActive => "No recording session is active",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageError => "Storage operation failed",
        }
    }

    /// Whether this error prevents tracking from starting at all
    ///
    /// Blocking conditions are surfaced to the UI layer; everything else only
    /// costs the current fix or batch.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::LocationPermissionDenied | Self::LocationUnavailable
        )
    }

    /// Whether this error originated in the durable store
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError | Self::StorageError | Self::OrderingViolation
        )
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Out-of-order append against the store
    pub fn ordering_violation(timestamp: i64, last_timestamp: i64) -> Self {
        Self::new(
            ErrorCode::OrderingViolation,
            format!("point at {timestamp} does not follow last stored point at {last_timestamp}"),
        )
    }

    /// Location permission denied by the user
    pub fn location_permission_denied() -> Self {
        Self::new(
            ErrorCode::LocationPermissionDenied,
            "tracking cannot start without location permission",
        )
    }

    /// Location services unavailable
    pub fn location_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::LocationUnavailable, message)
    }

    /// Operation requires an active session
    pub fn session_not_active(operation: &str) -> Self {
        Self::new(
            ErrorCode::SessionNotActive,
            format!("{operation} requires an active recording session"),
        )
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Storage error outside the database layer
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Invalid configuration value
    pub fn config_invalid(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("invalid value '{value}' for {key}"),
        )
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}
