// ABOUTME: Error reporting seam for storage failures during fix processing
// ABOUTME: Hosts plug in their crash reporter; the default emits structured tracing events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Which producer hit the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Foreground ingestion pipeline
    Foreground,
    /// Background persistence task
    Background,
    /// Session lifecycle controller
    Session,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::Session => "session",
        })
    }
}

/// Where a reported failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    /// Producer that was running
    pub task: TaskKind,
    /// Store operation that failed (`append`, `hydrate`, `clear`, ...)
    pub operation: &'static str,
    /// Timestamp of the fix being processed, if any
    pub fix_timestamp: Option<i64>,
}

impl ReportContext {
    /// Context for a failure tied to one fix
    #[must_use]
    pub const fn for_fix(task: TaskKind, operation: &'static str, fix_timestamp: i64) -> Self {
        Self {
            task,
            operation,
            fix_timestamp: Some(fix_timestamp),
        }
    }

    /// Context for a failure not tied to a fix
    #[must_use]
    pub const fn for_operation(task: TaskKind, operation: &'static str) -> Self {
        Self {
            task,
            operation,
            fix_timestamp: None,
        }
    }
}

/// Receives non-fatal failures from the producers
///
/// Reporting never fails and never aborts the session.
pub trait ErrorReporter: Send + Sync {
    /// Record a failure
    fn report(&self, error: &AppError, context: &ReportContext);
}

/// Default reporter that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: &AppError, context: &ReportContext) {
        error!(
            task = %context.task,
            operation = context.operation,
            fix.timestamp = ?context.fix_timestamp,
            error.code = ?error.code,
            error.message = %error.message,
            "Track engine operation failed"
        );
    }
}

/// Shared reporter handle
pub type SharedReporter = Arc<dyn ErrorReporter>;

/// Default shared reporter
#[must_use]
pub fn default_reporter() -> SharedReporter {
    Arc::new(TracingErrorReporter)
}
