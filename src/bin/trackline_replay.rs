// ABOUTME: Replay utility feeding recorded fixes through a tracking session
// ABOUTME: Reads a JSON fix script, records into SQLite and prints the session summary as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fix replay tool for the Trackline engine.
//!
//! The input is either a plain JSON array of fixes (replayed in the
//! foreground) or a script with foreground and background segments:
//!
//! ```json
//! {
//!   "activity": "running",
//!   "segments": [
//!     { "mode": "foreground", "fixes": [ { "latitude": 52.0, "longitude": 4.0, "accuracy": 5.0, "timestamp": 0 } ] },
//!     { "mode": "background", "batches": [ [ { "latitude": 52.0001, "longitude": 4.0, "accuracy": 5.0, "timestamp": 60000 } ] ] }
//!   ]
//! }
//! ```
//!
//! Usage:
//! ```bash
//! # Replay into the configured store (TRACKLINE_DATABASE_URL)
//! cargo run --bin trackline-replay -- fixes.json
//!
//! # Replay into a throwaway in-memory store, verbose logs on stderr
//! cargo run --bin trackline-replay -- fixes.json --database-url sqlite::memory: -v
//! ```

use std::future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use trackline::background::BatchOutcome;
use trackline::config::{DatabaseUrl, TrackingConfig};
use trackline::logging::LoggingConfig;
use trackline::models::{ActivityKind, Fix};
use trackline::session::{
    LocationAvailability, SessionProfile, SessionSummary, TrackingSession, Visibility,
};
use trackline::store::SqliteTrackStore;

#[derive(Parser)]
#[command(
    name = "trackline-replay",
    about = "Trackline fix replay",
    long_about = "Replay recorded GPS fixes through a tracking session and print the resulting track summary"
)]
struct ReplayArgs {
    /// JSON file with fixes or a segment script
    input: PathBuf,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Activity used for calorie estimation (overrides the script)
    #[arg(long)]
    activity: Option<ActivityKind>,

    /// Body weight in kilograms (overrides the script)
    #[arg(long)]
    body_weight_kg: Option<f64>,

    /// Handoff grace period in milliseconds
    #[arg(long)]
    grace_ms: Option<u64>,

    /// Discard the session instead of saving it
    #[arg(long)]
    discard: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayInput {
    Fixes(Vec<Fix>),
    Script(ReplayScript),
}

#[derive(Deserialize)]
struct ReplayScript {
    #[serde(default)]
    activity: ActivityKind,
    #[serde(default)]
    body_weight_kg: Option<f64>,
    #[serde(default)]
    met_override: Option<f64>,
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum Segment {
    Foreground { fixes: Vec<Fix> },
    Background { batches: Vec<Vec<Fix>> },
}

#[derive(Serialize)]
struct ReplayReport {
    foreground_fixes: usize,
    background_batches: Vec<BatchOutcome>,
    summary: Option<SessionSummary>,
}

impl ReplayInput {
    fn into_script(self) -> ReplayScript {
        match self {
            Self::Fixes(fixes) => ReplayScript {
                activity: ActivityKind::default(),
                body_weight_kg: None,
                met_override: None,
                segments: vec![Segment::Foreground { fixes }],
            },
            Self::Script(script) => script,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ReplayArgs::parse();

    let mut logging = LoggingConfig::from_env().with_stderr();
    if args.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let mut config = TrackingConfig::from_env()?;
    if let Some(url) = &args.database_url {
        config.database_url = DatabaseUrl::parse_url(url)?;
    }
    if let Some(grace_ms) = args.grace_ms {
        config.handoff_grace = Duration::from_millis(grace_ms);
    }

    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let script = serde_json::from_str::<ReplayInput>(&raw)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?
        .into_script();

    let store = Arc::new(SqliteTrackStore::connect(&config.database_url.to_connection_string()).await?);
    let mut session = TrackingSession::new(store, config);
    let profile = SessionProfile {
        activity: args.activity.unwrap_or(script.activity),
        body_weight_kg: args.body_weight_kg.or(script.body_weight_kg),
        met_override: script.met_override,
    };
    session.set_profile(profile);
    let session_id = session.start(LocationAvailability::Available).await?;
    info!(session.id = %session_id, segments = script.segments.len(), "Replay started");

    let mut report = ReplayReport {
        foreground_fixes: 0,
        background_batches: Vec::new(),
        summary: None,
    };

    for segment in script.segments {
        match segment {
            Segment::Foreground { fixes } => {
                if session.visibility() == Visibility::Background {
                    session.enter_foreground().await?;
                }
                report.foreground_fixes += session
                    .run_foreground(tokio_stream::iter(fixes), future::pending::<()>())
                    .await;
            }
            Segment::Background { batches } => {
                if session.visibility() == Visibility::Foreground {
                    session.enter_background().await;
                }
                for batch in batches {
                    if let Some(outcome) = session.handle_background_batch(&batch).await {
                        report.background_batches.push(outcome);
                    }
                }
            }
        }
    }

    if args.discard {
        session.discard().await?;
        info!(session.id = %session_id, "Replay discarded");
    } else {
        report.summary = Some(session.save(profile).await?);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
