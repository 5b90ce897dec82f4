// ABOUTME: Half-open time ranges, bucket periods and timestamp wire formatting
// ABOUTME: Parses host ISO-8601 strings to absolute UTC instants before any range math
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Time ranges and bucket periods
//!
//! Every query works on a [`TimeRange`], a half-open `[start, end)` interval of
//! UTC instants. Host strings may carry any offset and optional fractional
//! seconds; they are converted to UTC on parse so range math is zone-independent.
//!
//! Produced timestamps always serialize as RFC 3339 UTC with millisecond
//! precision, see [`iso_millis`].

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Half-open interval `[start, end)` of absolute instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting `start > end`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` when the start is after the end
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if start > end {
            return Err(AppError::invalid_argument(format!(
                "startDate {} is after endDate {}",
                format_timestamp(&start),
                format_timestamp(&end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two host-supplied ISO-8601 strings
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` when either string cannot be parsed or the
    /// resulting range is inverted
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        let start = parse_timestamp(start)
            .map_err(|e| AppError::invalid_argument(format!("Invalid startDate: {e}")))?;
        let end = parse_timestamp(end)
            .map_err(|e| AppError::invalid_argument(format!("Invalid endDate: {e}")))?;
        Self::new(start, end)
    }

    /// Length of the range
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the range contains no instant
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `instant` lies inside `[start, end)`
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Open overlap test: `other.start < self.end && other.end > self.start`
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// Parse an ISO-8601 timestamp with or without offset and fractional seconds
///
/// Strings without an offset are taken as UTC.
///
/// # Errors
///
/// Returns the underlying chrono parse error message
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("empty timestamp".to_owned());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|rfc_err| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| format!("'{trimmed}': {rfc_err}"))
        })
}

/// Format an instant the way every response does
#[must_use]
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Minutes between two instants, rounded up; zero for inverted spans
#[must_use]
pub fn duration_minutes_ceil(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + 59_999) / 60_000
}

/// Fixed-length slice size for bucketed aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPeriod {
    /// One hour
    Hour,
    /// Twenty-four hours
    Day,
    /// Seven days
    Week,
}

impl BucketPeriod {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    /// Slice length
    #[must_use]
    pub fn length(&self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
            Self::Week => Duration::weeks(1),
        }
    }

    /// Slices needed to cover `range`, counting a clipped last slice
    #[must_use]
    pub fn slice_count(&self, range: &TimeRange) -> usize {
        if range.is_empty() {
            return 0;
        }
        let span = range.duration().num_milliseconds();
        let step = self.length().num_milliseconds();
        usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for BucketPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(AppError::unsupported_bucket(other)),
        }
    }
}

/// Serde helpers writing `DateTime<Utc>` as `2024-01-01T00:00:00.000Z`
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize with millisecond precision and a `Z` suffix
    ///
    /// # Errors
    ///
    /// Propagates serializer errors
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    /// Deserialize any ISO-8601 string accepted by [`super::parse_timestamp`]
    ///
    /// # Errors
    ///
    /// Returns a custom error for unparseable strings
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }
}
