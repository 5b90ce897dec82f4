// ABOUTME: Time bucketer partitioning ranges into period slices and aggregating metrics per slice
// ABOUTME: Attributes source metadata to each bucket from the first overlapping raw record
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Time bucketer
//!
//! A range `[start, end)` is cut into contiguous slices of one bucket period,
//! anchored at `start`. The last slice is clipped to `end`, so the slices cover
//! the range exactly once.
//!
//! Values come from the store's grouped aggregation and are aligned onto the
//! slices by slice start; a slice the store did not return gets `null`.
//! Source metadata is best effort: raw records of the metric's granted sources
//! are read over the whole range and each slice takes the metadata of the first
//! record that overlaps it (`recordStart < sliceEnd && recordEnd > sliceStart`).

use chrono::{DateTime, Utc};
use health_bridge_core::constants::limits;
use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::models::{AggregatedSample, AggregatedSampleWithMetadata, SourceMetadata};
use health_bridge_core::permissions::LogicalPermission;
use health_bridge_core::time::{BucketPeriod, TimeRange};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::gate::PermissionGate;
use crate::metrics::LogicalMetric;
use crate::store::{HealthStore, NativeMetric, NativeRecord};

/// Reject ranges needing more than [`limits::MAX_BUCKET_SLICES`] slices
///
/// # Errors
///
/// Returns `INVALID_ARGUMENT` naming the slice count
pub fn check_slice_count(range: &TimeRange, period: BucketPeriod) -> AppResult<usize> {
    let count = period.slice_count(range);
    if count > limits::MAX_BUCKET_SLICES {
        return Err(AppError::invalid_argument(format!(
            "Range needs {count} {period} buckets, more than the limit of {}",
            limits::MAX_BUCKET_SLICES
        )));
    }
    Ok(count)
}

/// Contiguous `[start, end)` slices of `period` covering `range`
///
/// The first slice starts at `range.start`, the last is clipped to
/// `range.end`. An empty range has no slices.
///
/// # Errors
///
/// Returns `INVALID_ARGUMENT` when the range needs more than
/// [`limits::MAX_BUCKET_SLICES`] slices
pub fn partition(
    range: &TimeRange,
    period: BucketPeriod,
) -> AppResult<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
    let step = period.length();
    let mut slices = Vec::with_capacity(check_slice_count(range, period)?);
    let mut cursor = range.start;

    while cursor < range.end {
        let next = cursor
            .checked_add_signed(step)
            .map_or(range.end, |next| next.min(range.end));
        slices.push((cursor, next));
        cursor = next;
    }

    Ok(slices)
}

/// Metadata of the first record overlapping `[start, end)`, empty if none does
#[must_use]
pub fn attribute_source(
    records: &[NativeRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> SourceMetadata {
    records
        .iter()
        .find(|record| record.overlaps(start, end))
        .map(|record| record.metadata.clone())
        .unwrap_or_default()
}

/// Buckets metrics for one request
pub struct TimeBucketer<'a> {
    store: &'a dyn HealthStore,
    gate: &'a PermissionGate,
    config: &'a BridgeConfig,
}

impl<'a> TimeBucketer<'a> {
    /// Bucketer over a store and the request's permission gate
    #[must_use]
    pub const fn new(
        store: &'a dyn HealthStore,
        gate: &'a PermissionGate,
        config: &'a BridgeConfig,
    ) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    /// Aggregate `metric` into one bucket per slice of `period`
    ///
    /// Returns an empty list when the metric's permission is not granted.
    ///
    /// # Errors
    ///
    /// Returns `UNSUPPORTED_BUCKET` when the store cannot group by `period`
    /// and `INVALID_ARGUMENT` when the range needs too many slices (both
    /// checked before permissions), `ADAPTER_FAILURE` when the grouped
    /// aggregation fails
    pub async fn aggregate(
        &self,
        metric: &LogicalMetric,
        range: &TimeRange,
        period: BucketPeriod,
        attach_sources: bool,
    ) -> AppResult<Vec<AggregatedSampleWithMetadata>> {
        self.check_period(period)?;
        check_slice_count(range, period)?;

        let Some(native) = self.gate.readable_metric(metric) else {
            return Ok(Vec::new());
        };

        let slices = partition(range, period)?;
        if slices.is_empty() {
            return Ok(Vec::new());
        }

        let values: HashMap<DateTime<Utc>, _> = self
            .store
            .aggregate_grouped(&native, range, period)
            .await?
            .into_iter()
            .map(|bucket| (bucket.start, bucket.value))
            .collect();

        let raw = if attach_sources {
            self.source_records(&native, range).await
        } else {
            Vec::new()
        };

        let buckets: Vec<AggregatedSampleWithMetadata> = slices
            .into_iter()
            .map(|(start, end)| {
                let value = metric.convert(values.get(&start).copied().flatten());
                AggregatedSampleWithMetadata::from_sample(
                    AggregatedSample {
                        start_date: start,
                        end_date: end,
                        value,
                    },
                    attribute_source(&raw, start, end),
                )
            })
            .filter(|bucket| self.config.include_empty_buckets || bucket.value.is_some())
            .collect();

        debug!(
            metric = metric.name,
            period = %period,
            buckets = buckets.len(),
            "Aggregated metric into buckets"
        );
        Ok(buckets)
    }

    /// Sum the seconds of interval records per slice
    ///
    /// Each record counts in the slice containing its start. Used for
    /// mindfulness, which has no native aggregate.
    ///
    /// # Errors
    ///
    /// Returns `UNSUPPORTED_BUCKET` for periods the store does not support,
    /// `INVALID_ARGUMENT` for ranges needing too many slices and
    /// `ADAPTER_FAILURE` when reading records fails
    pub async fn aggregate_durations(
        &self,
        permission: LogicalPermission,
        range: &TimeRange,
        period: BucketPeriod,
    ) -> AppResult<Vec<AggregatedSampleWithMetadata>> {
        self.check_period(period)?;
        let slices = partition(range, period)?;

        let capabilities = self.gate.readable_capabilities(permission);
        if capabilities.is_empty() || slices.is_empty() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for capability in capabilities {
            records.extend(self.store.read_records(capability, range, None).await?);
        }

        let mut totals: Vec<Option<f64>> = vec![None; slices.len()];
        for record in &records {
            let index = slices.partition_point(|(start, _)| *start <= record.start);
            let Some(total) = index.checked_sub(1).and_then(|i| totals.get_mut(i)) else {
                continue;
            };
            let seconds = (record.end - record.start).num_milliseconds().max(0) as f64 / 1000.0;
            *total = Some(total.unwrap_or(0.0) + seconds);
        }

        Ok(slices
            .into_iter()
            .zip(totals)
            .map(|((start, end), value)| {
                AggregatedSampleWithMetadata::from_sample(
                    AggregatedSample {
                        start_date: start,
                        end_date: end,
                        value,
                    },
                    attribute_source(&records, start, end),
                )
            })
            .filter(|bucket| self.config.include_empty_buckets || bucket.value.is_some())
            .collect())
    }

    fn check_period(&self, period: BucketPeriod) -> AppResult<()> {
        if self.store.supported_periods().contains(&period) {
            Ok(())
        } else {
            Err(AppError::unsupported_bucket(period))
        }
    }

    async fn source_records(&self, native: &NativeMetric, range: &TimeRange) -> Vec<NativeRecord> {
        let mut records = Vec::new();
        for source in &native.sources {
            match self.store.read_records(*source, range, None).await {
                Ok(mut batch) => records.append(&mut batch),
                Err(e) => warn!(
                    capability = source.identifier,
                    error = %e,
                    "Source metadata unavailable, buckets keep empty metadata"
                ),
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{Duration, TimeZone};
    use health_bridge_core::errors::ErrorCode;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_two_day_range_gives_two_day_buckets() {
        let range = TimeRange::new(at(1, 0), at(3, 0)).unwrap();
        let slices = partition(&range, BucketPeriod::Day).unwrap();
        assert_eq!(slices, vec![(at(1, 0), at(2, 0)), (at(2, 0), at(3, 0))]);
    }

    #[test]
    fn test_partial_last_slice_is_clipped() {
        let range = TimeRange::new(at(1, 6), at(2, 12)).unwrap();
        let slices = partition(&range, BucketPeriod::Day).unwrap();
        assert_eq!(slices, vec![(at(1, 6), at(2, 6)), (at(2, 6), at(2, 12))]);
    }

    #[test]
    fn test_slices_cover_every_instant_once() {
        let range = TimeRange::new(at(1, 3), at(9, 17)).unwrap();
        for period in [BucketPeriod::Hour, BucketPeriod::Day, BucketPeriod::Week] {
            let slices = partition(&range, period).unwrap();
            assert_eq!(slices.first().unwrap().0, range.start);
            assert_eq!(slices.last().unwrap().1, range.end);
            assert!(slices.windows(2).all(|pair| pair[0].1 == pair[1].0));

            let mut cursor = range.start;
            while cursor < range.end {
                let hits = slices
                    .iter()
                    .filter(|(s, e)| *s <= cursor && cursor < *e)
                    .count();
                assert_eq!(hits, 1);
                cursor += Duration::minutes(97);
            }
        }
    }

    #[test]
    fn test_oversized_range_is_rejected() {
        let start = at(1, 0);
        let range = TimeRange::new(start, start + Duration::days(365 * 200)).unwrap();

        let err = partition(&range, BucketPeriod::Hour).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert!(err.message.contains("hour buckets"));

        assert_eq!(partition(&range, BucketPeriod::Week).unwrap().len(), 10_429);
    }

    #[test]
    fn test_empty_range_has_no_slices() {
        let range = TimeRange::new(at(1, 0), at(1, 0)).unwrap();
        assert!(partition(&range, BucketPeriod::Day).unwrap().is_empty());
    }
}
