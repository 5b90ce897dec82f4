// ABOUTME: Platform-neutral shapes exchanged with native health store adapters
// ABOUTME: Capabilities, metrics, unit quantities, grouped buckets, raw records and route points
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use health_bridge_core::models::SourceMetadata;
use health_bridge_core::platform::Platform;
use health_bridge_core::time::{iso_millis, TimeRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One native record or quantity type identifier, owned by one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeCapability {
    /// Platform that defines the identifier
    pub platform: Platform,
    /// Health Connect permission string or HealthKit type identifier
    pub identifier: &'static str,
}

impl NativeCapability {
    /// Health Connect capability
    #[must_use]
    pub const fn health_connect(identifier: &'static str) -> Self {
        Self {
            platform: Platform::HealthConnect,
            identifier,
        }
    }

    /// HealthKit capability
    #[must_use]
    pub const fn health_kit(identifier: &'static str) -> Self {
        Self {
            platform: Platform::HealthKit,
            identifier,
        }
    }
}

impl fmt::Display for NativeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier)
    }
}

/// Native aggregate metric and the capabilities whose records feed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMetric {
    /// Store-specific metric identifier
    pub identifier: &'static str,
    /// Capabilities summed by the aggregate
    pub sources: Vec<NativeCapability>,
}

impl NativeMetric {
    /// Whether records of `capability` feed this metric
    #[must_use]
    pub fn reads(&self, capability: &str) -> bool {
        self.sources
            .iter()
            .any(|source| source.identifier == capability)
    }
}

/// Unit attached to a native quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeUnit {
    /// Dimensionless count
    Count,
    /// Kilocalories
    Kilocalories,
    /// Small calories
    Calories,
    /// Kilojoules
    Kilojoules,
    /// Meters
    Meters,
    /// Kilometers
    Kilometers,
    /// Statute miles
    Miles,
    /// Seconds
    Seconds,
}

impl NativeUnit {
    /// Base unit of this unit's dimension
    #[must_use]
    pub const fn base(&self) -> Self {
        match self {
            Self::Count => Self::Count,
            Self::Kilocalories | Self::Calories | Self::Kilojoules => Self::Kilocalories,
            Self::Meters | Self::Kilometers | Self::Miles => Self::Meters,
            Self::Seconds => Self::Seconds,
        }
    }

    /// Factor converting one of this unit into its base unit
    #[must_use]
    pub const fn to_base_factor(&self) -> f64 {
        match self {
            Self::Count | Self::Kilocalories | Self::Meters | Self::Seconds => 1.0,
            Self::Calories => 0.001,
            Self::Kilojoules => 1.0 / 4.184,
            Self::Kilometers => 1000.0,
            Self::Miles => 1609.344,
        }
    }
}

/// Numeric value with its native unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeQuantity {
    /// Raw value
    pub value: f64,
    /// Unit of `value`
    pub unit: NativeUnit,
}

impl NativeQuantity {
    /// Build a quantity
    #[must_use]
    pub const fn new(value: f64, unit: NativeUnit) -> Self {
        Self { value, unit }
    }

    /// Value expressed in `target`, or `None` across dimensions
    #[must_use]
    pub fn value_in(&self, target: NativeUnit) -> Option<f64> {
        if self.unit.base() != target.base() {
            return None;
        }
        Some(self.value * self.unit.to_base_factor() / target.to_base_factor())
    }
}

/// One slice of a grouped aggregation as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NativeBucket {
    /// Slice start
    pub start: DateTime<Utc>,
    /// Slice end
    pub end: DateTime<Utc>,
    /// Aggregate over the slice, `None` when the store had no data
    pub value: Option<NativeQuantity>,
}

/// Active interval inside an exercise session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSegment {
    /// Segment start
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    /// Segment end
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
}

/// One reading inside a heart rate series record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmSample {
    /// Reading time
    #[serde(with = "iso_millis")]
    pub time: DateTime<Utc>,
    /// Beats per minute
    pub bpm: f64,
}

/// Stage segment inside a sleep session record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSegment {
    /// Stage start
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    /// Stage end
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
    /// Native stage code
    pub stage: i64,
}

/// Type-specific body of a native record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecordPayload {
    /// Cumulative quantity sample (steps, energy, distance)
    Quantity {
        /// Sample value
        value: f64,
        /// Sample unit
        unit: NativeUnit,
    },
    /// Workout / exercise session
    #[serde(rename_all = "camelCase")]
    ExerciseSession {
        /// Native exercise or activity type code
        exercise_type: i64,
        /// User-entered title
        #[serde(default)]
        title: Option<String>,
        /// Active segments, empty when the store reports none
        #[serde(default)]
        segments: Vec<SessionSegment>,
        /// Whether a route is attached to the session
        #[serde(default)]
        has_route: bool,
    },
    /// Heart rate series
    HeartRateSeries {
        /// Readings in store order
        samples: Vec<BpmSample>,
    },
    /// Heart rate variability in milliseconds
    Hrv {
        /// Value in milliseconds
        millis: f64,
    },
    /// Blood oxygen saturation
    OxygenSaturation {
        /// Percentage (0-100)
        percentage: f64,
    },
    /// Sleep session with stage segments
    SleepSession {
        /// Stage segments in store order
        #[serde(default)]
        stages: Vec<StageSegment>,
    },
    /// Interval without a value (mindfulness sessions)
    Interval,
}

/// Raw record as read from a native store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeRecord {
    /// Store record id
    pub id: String,
    /// Capability identifier this record belongs to
    pub capability: String,
    /// Record start
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    /// Record end
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
    /// Source metadata
    #[serde(default)]
    pub metadata: SourceMetadata,
    /// Type-specific body
    pub payload: RecordPayload,
}

impl NativeRecord {
    /// Open overlap test against a slice
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Whether the record overlaps `range`; instantaneous records must lie inside it
    #[must_use]
    pub fn intersects(&self, range: &TimeRange) -> bool {
        if self.start == self.end {
            return range.contains(self.start);
        }
        range.overlaps(self.start, self.end)
    }

    /// Whether the record starts inside `range`
    #[must_use]
    pub fn starts_within(&self, range: &TimeRange) -> bool {
        range.contains(self.start)
    }
}

/// GPS fix attached to an exercise session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Fix time
    #[serde(with = "iso_millis")]
    pub time: DateTime<Utc>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// Deep-link destinations handed to the host OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsTarget {
    /// Health Connect settings screen
    HealthConnectSettings,
    /// Apple Health settings screen
    AppleHealthSettings,
    /// Play Store listing for Health Connect
    HealthConnectPlayStore,
}

impl SettingsTarget {
    /// Platform that can open this target
    #[must_use]
    pub const fn platform(&self) -> Platform {
        match self {
            Self::HealthConnectSettings | Self::HealthConnectPlayStore => Platform::HealthConnect,
            Self::AppleHealthSettings => Platform::HealthKit,
        }
    }
}
