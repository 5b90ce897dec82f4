// ABOUTME: Health bridge CLI - runs bridge commands against a JSON store snapshot
// ABOUTME: Loads an in-memory store, dispatches one command and prints the JSON response
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # List every command the bridge understands
//! health-bridge methods
//!
//! # Daily step buckets from a Health Connect snapshot
//! health-bridge --fixture snapshot.json call queryAggregated --params '{
//!     "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-01-08T00:00:00Z",
//!     "dataType": "steps", "bucket": "day"}'
//!
//! # Workouts with heart rate against an empty HealthKit store
//! health-bridge --platform health-kit call queryWorkouts --params '{
//!     "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-01-02T00:00:00Z",
//!     "includeHeartRate": true}'
//! ```

use clap::{Parser, Subcommand};
use health_bridge::bridge::HealthBridge;
use health_bridge::config::BridgeConfig;
use health_bridge::constants::methods;
use health_bridge::errors::{AppError, AppResult, ErrorResponse};
use health_bridge::logging::{LogFormat, LoggingConfig};
use health_bridge::platform::Platform;
use health_bridge::store::{InMemoryHealthStore, StoreSnapshot};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "health-bridge",
    about = "Health bridge command runner",
    long_about = "Runs health bridge commands against an in-memory store loaded from a JSON \
                  snapshot and prints the normalized JSON response."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Store snapshot file (JSON); an empty store is used when omitted
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Platform of the store (health-connect or health-kit); overrides the snapshot's
    #[arg(long, global = true)]
    platform: Option<Platform>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Run one bridge command
    Call {
        /// Command name, e.g. queryWorkouts
        method: String,

        /// Command parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },

    /// List every command name
    Methods,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    logging.format = LogFormat::Compact;
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    if let Err(e) = logging.init() {
        eprintln!("{e}");
    }

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let response = ErrorResponse::from(e);
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(_) => println!("{}", response.error.message),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<String> {
    match cli.command {
        Command::Methods => Ok(methods::ALL.join("\n")),
        Command::Call { method, params } => {
            let bridge = build_bridge(cli.fixture.as_deref(), cli.platform)?;
            let params = match params {
                Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                    AppError::invalid_argument(format!("--params is not valid JSON: {e}"))
                })?,
                None => Value::Null,
            };

            info!(method = %method, "Running bridge command");
            let response = bridge.dispatch(&method, params).await?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
    }
}

fn build_bridge(fixture: Option<&Path>, platform: Option<Platform>) -> AppResult<HealthBridge> {
    let mut snapshot = match fixture {
        Some(path) => {
            debug!(path = %path.display(), "Loading store snapshot");
            StoreSnapshot::load(path)?
        }
        None => StoreSnapshot::empty(platform.unwrap_or(Platform::HealthConnect)),
    };
    if let Some(platform) = platform {
        snapshot.platform = platform;
    }

    let store = Arc::new(InMemoryHealthStore::from_snapshot(snapshot));
    HealthBridge::with_store(store, BridgeConfig::from_env())
}
