// ABOUTME: Request and response shapes of every host-facing bridge command
// ABOUTME: camelCase field names are the wire contract shared with the host application
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::models::{
    AggregatedSample, AggregatedSampleWithMetadata, HeartRateSeriesSample, HrvSample,
    OxygenSaturationSample, SleepRecord,
};
use health_bridge_core::time::{BucketPeriod, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::composer::WorkoutOptions;

fn parse_range(start: Option<&str>, end: Option<&str>) -> AppResult<TimeRange> {
    match (start, end) {
        (Some(start), Some(end)) => TimeRange::parse(start, end),
        _ => Err(AppError::invalid_argument(
            "Missing required parameters: startDate, endDate",
        )),
    }
}

/// `checkHealthPermissions` / `requestHealthPermissions` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsRequest {
    /// Logical permission names; unknown names are ignored
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl PermissionsRequest {
    /// Request for the given names
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Names, rejecting a missing list
    ///
    /// `action` completes the message, e.g. "Must provide permissions to check".
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` when `permissions` is absent
    pub fn names(&self, action: &str) -> AppResult<&[String]> {
        self.permissions.as_deref().ok_or_else(|| {
            AppError::invalid_argument(format!("Must provide permissions to {action}"))
        })
    }
}

/// Parameters of single-range queries (heart rate, HRV, oxygen, sleep)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    /// ISO-8601 range start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO-8601 range end
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RangeRequest {
    /// Request over two timestamps
    #[must_use]
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Parsed range
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for missing, unparseable or inverted dates
    pub fn range(&self) -> AppResult<TimeRange> {
        parse_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// `queryAggregated` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRequest {
    /// ISO-8601 range start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO-8601 range end
    #[serde(default)]
    pub end_date: Option<String>,
    /// `steps`, `active-calories`, `total-calories`, `distance` or `mindfulness`
    #[serde(default)]
    pub data_type: Option<String>,
    /// `hour`, `day` or `week`
    #[serde(default)]
    pub bucket: Option<String>,
}

/// Validated `queryAggregated` parameters
#[derive(Debug, Clone)]
pub struct AggregatedQuery {
    /// Range to bucket
    pub range: TimeRange,
    /// Logical data type name
    pub data_type: String,
    /// Bucket period
    pub bucket: BucketPeriod,
}

impl AggregatedRequest {
    /// Validate every parameter
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for missing or bad dates and
    /// `UNSUPPORTED_BUCKET` for unknown bucket names
    pub fn validate(&self) -> AppResult<AggregatedQuery> {
        let (Some(start), Some(end), Some(data_type), Some(bucket)) = (
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.data_type.as_deref(),
            self.bucket.as_deref(),
        ) else {
            return Err(AppError::invalid_argument(
                "Missing required parameters: startDate, endDate, dataType, or bucket",
            ));
        };

        Ok(AggregatedQuery {
            range: TimeRange::parse(start, end)?,
            data_type: data_type.to_owned(),
            bucket: bucket.parse()?,
        })
    }
}

/// `queryWorkouts` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutsRequest {
    /// ISO-8601 range start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO-8601 range end
    #[serde(default)]
    pub end_date: Option<String>,
    /// Attach heart rate samples
    #[serde(default)]
    pub include_heart_rate: bool,
    /// Attach GPS routes
    #[serde(default)]
    pub include_route: bool,
    /// Attach step counts
    #[serde(default)]
    pub include_steps: bool,
}

impl WorkoutsRequest {
    /// Parsed range
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for missing, unparseable or inverted dates
    pub fn range(&self) -> AppResult<TimeRange> {
        parse_range(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// Sub-query flags
    #[must_use]
    pub const fn options(&self) -> WorkoutOptions {
        WorkoutOptions {
            include_heart_rate: self.include_heart_rate,
            include_route: self.include_route,
            include_steps: self.include_steps,
        }
    }
}

/// `querySteps` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsRequest {
    /// ISO-8601 range start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO-8601 range end
    #[serde(default)]
    pub end_date: Option<String>,
    /// Optional bucket; raw per-sample records when absent
    #[serde(default)]
    pub bucket: Option<String>,
}

impl StepsRequest {
    /// Parsed range and optional bucket
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for bad dates and `UNSUPPORTED_BUCKET` for
    /// unknown bucket names
    pub fn validate(&self) -> AppResult<(TimeRange, Option<BucketPeriod>)> {
        let range = parse_range(self.start_date.as_deref(), self.end_date.as_deref())?;
        let bucket = self.bucket.as_deref().map(str::parse).transpose()?;
        Ok((range, bucket))
    }
}

/// `isHealthAvailable` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Whether the native store is usable
    pub available: bool,
}

/// Permission status keyed by logical permission name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsResponse {
    /// `READ_*` name to granted flag
    pub permissions: BTreeMap<String, bool>,
}

/// `queryAggregated` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResponse {
    /// One entry per bucket
    pub aggregated_data: Vec<AggregatedSample>,
}

/// `querySteps` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsResponse {
    /// Buckets or raw samples with source metadata
    pub aggregated_data: Vec<AggregatedSampleWithMetadata>,
}

/// `queryHeartRate` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateResponse {
    /// Flattened heart rate samples
    pub heart_rate_records: Vec<HeartRateSeriesSample>,
}

/// `queryHRV` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvResponse {
    /// Heart rate variability measurements
    pub hrv_records: Vec<HrvSample>,
}

/// `queryOxygenSaturation` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OxygenSaturationResponse {
    /// Blood oxygen measurements
    pub oxygen_saturation_records: Vec<OxygenSaturationSample>,
}

/// `querySleep` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepResponse {
    /// One entry per sleep stage
    pub sleep: Vec<SleepRecord>,
}

/// Response of commands without a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use health_bridge_core::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_aggregated_request_requires_every_field() {
        let request: AggregatedRequest = serde_json::from_value(json!({
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-01-02T00:00:00Z",
            "dataType": "steps"
        }))
        .unwrap();
        let err = request.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_steps_request_bucket_is_optional() {
        let request = StepsRequest {
            start_date: Some("2024-01-01T00:00:00Z".to_owned()),
            end_date: Some("2024-01-02T00:00:00Z".to_owned()),
            bucket: None,
        };
        let (_, bucket) = request.validate().unwrap();
        assert!(bucket.is_none());
    }

    #[test]
    fn test_workout_flags_default_to_false() {
        let request: WorkoutsRequest = serde_json::from_value(json!({
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-01-02T00:00:00Z",
            "includeRoute": true
        }))
        .unwrap();
        let options = request.options();
        assert!(options.include_route);
        assert!(!options.include_heart_rate);
        assert!(!options.include_steps);
    }
}
