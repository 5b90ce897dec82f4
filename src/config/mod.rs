// ABOUTME: Runtime configuration for the health bridge engine
// ABOUTME: Loads workout limits and bucket policy from environment with validated defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration module for the health bridge
//!
//! Configuration is environment-only. Unset or unparseable variables fall back
//! to the defaults in [`health_bridge_core::constants::limits`].

use health_bridge_core::constants::{env_config, limits};
use health_bridge_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Engine configuration shared by every bridge call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Upper bound on sessions read per workout query; extra sessions are dropped
    pub max_workout_sessions: usize,
    /// Workouts composed concurrently
    pub workout_concurrency: usize,
    /// Keep buckets whose value is null in aggregated responses
    pub include_empty_buckets: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_workout_sessions: limits::DEFAULT_MAX_WORKOUT_SESSIONS,
            workout_concurrency: limits::DEFAULT_WORKOUT_CONCURRENCY,
            include_empty_buckets: limits::DEFAULT_INCLUDE_EMPTY_BUCKETS,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_workout_sessions: env::var(env_config::MAX_WORKOUT_SESSIONS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::DEFAULT_MAX_WORKOUT_SESSIONS),
            workout_concurrency: env::var(env_config::WORKOUT_CONCURRENCY)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::DEFAULT_WORKOUT_CONCURRENCY),
            include_empty_buckets: env::var(env_config::INCLUDE_EMPTY_BUCKETS)
                .ok()
                .and_then(|s| parse_flag(&s))
                .unwrap_or(limits::DEFAULT_INCLUDE_EMPTY_BUCKETS),
        }
    }

    /// Reject limits that would make every query empty or stall composition
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when a limit is zero
    pub fn validate(&self) -> AppResult<()> {
        if self.max_workout_sessions == 0 {
            return Err(AppError::config_invalid(
                "max_workout_sessions must be greater than zero",
            ));
        }
        if self.workout_concurrency == 0 {
            return Err(AppError::config_invalid(
                "workout_concurrency must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
