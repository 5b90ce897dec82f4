// ABOUTME: Per-stage sleep records and native sleep stage code tables
// ABOUTME: Health Connect stage codes and HealthKit sleep analysis values map onto SleepStage
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::time::iso_millis;

use super::SourceMetadata;

/// Normalized sleep stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SleepStage {
    /// Awake during the session
    Awake,
    /// In bed, not necessarily asleep
    InBed,
    /// Light or core sleep
    Light,
    /// Deep sleep
    Deep,
    /// REM sleep
    Rem,
    /// Asleep, stage not reported
    Sleeping,
    /// Out of bed
    OutOfBed,
    /// Unmapped native code
    Unknown,
}

impl SleepStage {
    /// Map a native stage code
    ///
    /// Health Connect uses `SleepSessionRecord` stage constants (0..=7); HealthKit
    /// uses `HKCategoryValueSleepAnalysis` raw values (0..=5). Anything else is
    /// [`SleepStage::Unknown`].
    #[must_use]
    pub const fn from_native(platform: Platform, code: i64) -> Self {
        match platform {
            Platform::HealthConnect => match code {
                1 => Self::Awake,
                2 => Self::Sleeping,
                3 => Self::OutOfBed,
                4 => Self::Light,
                5 => Self::Deep,
                6 => Self::Rem,
                7 => Self::InBed,
                _ => Self::Unknown,
            },
            Platform::HealthKit => match code {
                0 => Self::InBed,
                // asleepUnspecified and asleepCore
                1 | 3 => Self::Light,
                2 => Self::Awake,
                4 => Self::Deep,
                5 => Self::Rem,
                _ => Self::Unknown,
            },
        }
    }
}

/// One sleep stage segment of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    /// `<sessionId>-<stageIndex>`
    pub id: String,
    /// Owning session id
    pub session_id: String,
    /// Stage start
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    /// Stage end
    #[serde(with = "iso_millis")]
    pub end_date: DateTime<Utc>,
    /// Stage length in minutes, rounded up
    pub duration: i64,
    /// Normalized stage
    pub sleep_stage: SleepStage,
    /// Source metadata of the session
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}
