// ABOUTME: Normalized, JSON-serializable health data models returned to hosts
// ABOUTME: Samples with source metadata, aggregated buckets, workouts and sleep stages
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Normalized models
//!
//! Every type here is query-scoped: built fresh from native reads, never
//! mutated after construction, and serialized with camelCase wire names.

/// Sleep stage records and native stage tables
pub mod sleep;
/// Composite workout records and native workout-type tables
pub mod workout;

pub use sleep::{SleepRecord, SleepStage};
pub use workout::{workout_type_name, HeartRateSample, RouteSample, WorkoutRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{duration_minutes_ceil, iso_millis};

/// Where a record came from
///
/// Fields are empty strings when the store does not report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMetadata {
    /// Application or device name
    pub source_name: String,
    /// Bundle / package identifier of the writing app
    pub source_bundle_id: String,
    /// Device manufacturer
    pub device_manufacturer: String,
}

impl SourceMetadata {
    /// Metadata with all three fields set
    #[must_use]
    pub fn new(
        source_name: impl Into<String>,
        source_bundle_id: impl Into<String>,
        device_manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_bundle_id: source_bundle_id.into(),
            device_manufacturer: device_manufacturer.into(),
        }
    }
}

/// One aggregated value over `[startDate, endDate)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSample {
    /// Slice start
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    /// Slice end
    #[serde(with = "iso_millis")]
    pub end_date: DateTime<Utc>,
    /// Converted value, `null` when the store had no data
    pub value: Option<f64>,
}

/// Aggregated value enriched with source metadata and duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSampleWithMetadata {
    /// Slice start
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    /// Slice end
    #[serde(with = "iso_millis")]
    pub end_date: DateTime<Utc>,
    /// Converted value, `null` when the store had no data
    pub value: Option<f64>,
    /// Slice length in minutes, rounded up
    pub duration: i64,
    /// Metadata of the first raw record overlapping the slice
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}

impl AggregatedSampleWithMetadata {
    /// Attach metadata to a plain sample, computing its duration
    #[must_use]
    pub fn from_sample(sample: AggregatedSample, metadata: SourceMetadata) -> Self {
        Self {
            duration: duration_minutes_ceil(sample.start_date, sample.end_date),
            start_date: sample.start_date,
            end_date: sample.end_date,
            value: sample.value,
            metadata,
        }
    }

    /// Drop the metadata
    #[must_use]
    pub fn into_sample(self) -> AggregatedSample {
        AggregatedSample {
            start_date: self.start_date,
            end_date: self.end_date,
            value: self.value,
        }
    }
}

/// One heart rate reading from a series record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSeriesSample {
    /// Record id, suffixed with the sample index for multi-sample records
    pub id: String,
    /// Sample start
    #[serde(with = "iso_millis")]
    pub start_time: DateTime<Utc>,
    /// Sample end
    #[serde(with = "iso_millis")]
    pub end_time: DateTime<Utc>,
    /// Beats per minute
    pub bpm: f64,
    /// Source metadata
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}

/// Statistical flavor of a heart rate variability value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HrvType {
    /// Root mean square of successive differences (Health Connect)
    #[serde(rename = "RMSSD")]
    Rmssd,
    /// Standard deviation of NN intervals (HealthKit)
    #[serde(rename = "SDNN")]
    Sdnn,
}

/// One heart rate variability measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvSample {
    /// Record id
    pub id: String,
    /// Measurement time
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Value in milliseconds
    pub hrv_value: f64,
    /// RMSSD or SDNN
    #[serde(rename = "type")]
    pub hrv_type: HrvType,
    /// Source metadata
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}

/// One blood oxygen measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OxygenSaturationSample {
    /// Record id
    pub id: String,
    /// Measurement time
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Saturation percentage (0-100)
    pub percentage: f64,
    /// Source metadata
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}
