// ABOUTME: Thread-safe in-memory health store adapter backed by a JSON snapshot
// ABOUTME: Supports grant management, route storage, failure injection and call counting for tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

// RwLock poisoning is reported as StoreError::CallFailed so callers see a
// regular adapter failure instead of a panic

//! # In-memory health store
//!
//! A reference [`HealthStore`] for development, the CLI and the test suite.
//! It behaves like a native store of the configured [`Platform`]:
//!
//! - reads of ungranted capabilities fail with `AuthorizationDenied`
//! - record reads return records overlapping the range
//! - aggregates sum quantity records that start inside the range
//! - grouped aggregates omit slices without data
//! - unsupported bucket periods fail with `UnsupportedFeature`
//!
//! ## Thread Safety
//!
//! All data is behind `RwLock`s and no lock is held across an await point.

use async_trait::async_trait;
use health_bridge_core::constants::native::{health_connect, health_kit};
use health_bridge_core::errors::{AppError, AppResult, StoreError, StoreResult};
use health_bridge_core::platform::Platform;
use health_bridge_core::time::{BucketPeriod, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::records::{
    NativeBucket, NativeCapability, NativeMetric, NativeQuantity, NativeRecord, RecordPayload,
    RoutePoint, SettingsTarget,
};
use super::HealthStore;
use crate::bucketing::partition;

/// Serializable contents of an [`InMemoryHealthStore`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Platform the records belong to
    pub platform: Platform,
    /// Whether the store reports itself as available
    #[serde(default = "default_available")]
    pub available: bool,
    /// Granted capability identifiers
    #[serde(default)]
    pub granted: Vec<String>,
    /// Bucket periods the store can group by; empty means day only
    #[serde(default)]
    pub supported_periods: Vec<BucketPeriod>,
    /// Raw records
    #[serde(default)]
    pub records: Vec<NativeRecord>,
    /// Routes keyed by exercise session id
    #[serde(default)]
    pub routes: HashMap<String, Vec<RoutePoint>>,
}

const fn default_available() -> bool {
    true
}

impl StoreSnapshot {
    /// Empty snapshot for `platform`
    #[must_use]
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            available: true,
            granted: Vec::new(),
            supported_periods: Vec::new(),
            records: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// Parse a snapshot from JSON
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` when the JSON does not describe a snapshot
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::invalid_argument(format!("Invalid store snapshot: {e}")))
    }

    /// Read and parse a snapshot file
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` when the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            AppError::invalid_argument(format!("Cannot read snapshot {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// In-memory [`HealthStore`] for development and testing
pub struct InMemoryHealthStore {
    platform: Platform,
    available: bool,
    supported_periods: Vec<BucketPeriod>,
    latency: Option<Duration>,
    records: RwLock<Vec<NativeRecord>>,
    routes: RwLock<HashMap<String, Vec<RoutePoint>>>,
    granted: RwLock<HashSet<String>>,
    declined: RwLock<HashSet<String>>,
    failures: RwLock<HashMap<String, String>>,
    opened_settings: RwLock<Vec<SettingsTarget>>,
    data_calls: AtomicUsize,
}

impl InMemoryHealthStore {
    /// Empty, available store for `platform` with nothing granted
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self::from_snapshot(StoreSnapshot::empty(platform))
    }

    /// Store preloaded from a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut records = snapshot.records;
        records.sort_by_key(|record| record.start);

        let supported_periods = if snapshot.supported_periods.is_empty() {
            vec![BucketPeriod::Day]
        } else {
            snapshot.supported_periods
        };

        Self {
            platform: snapshot.platform,
            available: snapshot.available,
            supported_periods,
            latency: None,
            records: RwLock::new(records),
            routes: RwLock::new(snapshot.routes),
            granted: RwLock::new(snapshot.granted.into_iter().collect()),
            declined: RwLock::new(HashSet::new()),
            failures: RwLock::new(HashMap::new()),
            opened_settings: RwLock::new(Vec::new()),
            data_calls: AtomicUsize::new(0),
        }
    }

    /// Report the store as not installed
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Replace the bucket periods the store can group by
    #[must_use]
    pub fn with_supported_periods(mut self, periods: &[BucketPeriod]) -> Self {
        self.supported_periods = periods.to_vec();
        self
    }

    /// Delay every data call, to exercise concurrent composition
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a record, keeping records ordered by start
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn insert_record(&self, record: NativeRecord) -> StoreResult<()> {
        let mut records = self.write(&self.records, "records")?;
        let position = records.partition_point(|existing| existing.start <= record.start);
        records.insert(position, record);
        Ok(())
    }

    /// Attach a route to an exercise session
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn insert_route(&self, session_id: &str, points: Vec<RoutePoint>) -> StoreResult<()> {
        self.write(&self.routes, "routes")?
            .insert(session_id.to_owned(), points);
        Ok(())
    }

    /// Grant capability identifiers
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn grant<I, S>(&self, identifiers: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write(&self.granted, "granted")?
            .extend(identifiers.into_iter().map(Into::into));
        Ok(())
    }

    /// Revoke a capability identifier
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn revoke(&self, identifier: &str) -> StoreResult<()> {
        self.write(&self.granted, "granted")?.remove(identifier);
        Ok(())
    }

    /// Make the permission prompt refuse a capability
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn decline_on_request(&self, identifier: &str) -> StoreResult<()> {
        self.write(&self.declined, "declined")?
            .insert(identifier.to_owned());
        Ok(())
    }

    /// Make every call touching a capability or metric identifier fail
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn fail_on(&self, identifier: &str, message: &str) -> StoreResult<()> {
        self.write(&self.failures, "failures")?
            .insert(identifier.to_owned(), message.to_owned());
        Ok(())
    }

    /// Number of read, aggregate and route calls served so far
    #[must_use]
    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    /// Settings targets opened so far
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CallFailed` if the internal `RwLock` is poisoned.
    pub fn opened_settings(&self) -> StoreResult<Vec<SettingsTarget>> {
        Ok(self.read(&self.opened_settings, "opened_settings")?.clone())
    }

    fn route_capability(&self) -> &'static str {
        match self.platform {
            Platform::HealthConnect => health_connect::READ_EXERCISE_ROUTE,
            Platform::HealthKit => health_kit::WORKOUT_ROUTE,
        }
    }

    fn read<'a, T>(&self, lock: &'a RwLock<T>, what: &str) -> StoreResult<RwLockReadGuard<'a, T>> {
        lock.read().map_err(|_| {
            StoreError::call_failed(self.name(), format!("RwLock poisoned: {what} lock"))
        })
    }

    fn write<'a, T>(
        &self,
        lock: &'a RwLock<T>,
        what: &str,
    ) -> StoreResult<RwLockWriteGuard<'a, T>> {
        lock.write().map_err(|_| {
            StoreError::call_failed(self.name(), format!("RwLock poisoned: {what} lock"))
        })
    }

    async fn begin_data_call(&self) {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
    }

    fn check_failure(&self, identifier: &str) -> StoreResult<()> {
        let failures = self.read(&self.failures, "failures")?;
        failures.get(identifier).map_or(Ok(()), |message| {
            Err(StoreError::call_failed(self.name(), message.clone()))
        })
    }

    fn check_capability(&self, identifier: &str) -> StoreResult<()> {
        if !self.read(&self.granted, "granted")?.contains(identifier) {
            return Err(StoreError::AuthorizationDenied {
                store: self.name().to_owned(),
                capability: identifier.to_owned(),
            });
        }
        self.check_failure(identifier)
    }

    fn check_metric(&self, metric: &NativeMetric) -> StoreResult<()> {
        for source in &metric.sources {
            if source.platform != self.platform {
                return Err(StoreError::UnknownCapability {
                    store: self.name().to_owned(),
                    capability: source.identifier.to_owned(),
                });
            }
            self.check_capability(source.identifier)?;
        }
        self.check_failure(metric.identifier)
    }

    fn sum(&self, metric: &NativeMetric, range: &TimeRange) -> StoreResult<Option<NativeQuantity>> {
        let records = self.read(&self.records, "records")?;
        let quantities: Vec<NativeQuantity> = records
            .iter()
            .filter(|record| metric.reads(&record.capability) && record.starts_within(range))
            .filter_map(|record| match record.payload {
                RecordPayload::Quantity { value, unit } => Some(NativeQuantity::new(value, unit)),
                _ => None,
            })
            .collect();

        let Some(first) = quantities.first() else {
            return Ok(None);
        };

        let unit = if quantities.iter().all(|q| q.unit == first.unit) {
            first.unit
        } else {
            first.unit.base()
        };
        let total = quantities.iter().filter_map(|q| q.value_in(unit)).sum();
        Ok(Some(NativeQuantity::new(total, unit)))
    }
}

#[async_trait]
impl HealthStore for InMemoryHealthStore {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn name(&self) -> &'static str {
        self.platform.store_name()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn supported_periods(&self) -> &[BucketPeriod] {
        &self.supported_periods
    }

    async fn granted_capabilities(&self) -> StoreResult<HashSet<String>> {
        Ok(self.read(&self.granted, "granted")?.clone())
    }

    async fn request_capabilities(
        &self,
        capabilities: &[NativeCapability],
    ) -> StoreResult<HashSet<String>> {
        let declined = self.read(&self.declined, "declined")?.clone();
        let mut granted = self.write(&self.granted, "granted")?;
        for capability in capabilities {
            if capability.platform == self.platform && !declined.contains(capability.identifier) {
                granted.insert(capability.identifier.to_owned());
            }
        }
        debug!(store = self.name(), requested = capabilities.len(), "Permission prompt answered");
        Ok(granted.clone())
    }

    async fn read_records(
        &self,
        capability: NativeCapability,
        range: &TimeRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<NativeRecord>> {
        self.begin_data_call().await;
        self.check_capability(capability.identifier)?;

        let records = self.read(&self.records, "records")?;
        Ok(records
            .iter()
            .filter(|record| record.capability == capability.identifier && record.intersects(range))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn aggregate(
        &self,
        metric: &NativeMetric,
        range: &TimeRange,
    ) -> StoreResult<Option<NativeQuantity>> {
        self.begin_data_call().await;
        self.check_metric(metric)?;
        self.sum(metric, range)
    }

    async fn aggregate_grouped(
        &self,
        metric: &NativeMetric,
        range: &TimeRange,
        period: BucketPeriod,
    ) -> StoreResult<Vec<NativeBucket>> {
        self.begin_data_call().await;
        if !self.supported_periods.contains(&period) {
            return Err(StoreError::UnsupportedFeature {
                store: self.name().to_owned(),
                feature: format!("{period} buckets"),
            });
        }
        self.check_metric(metric)?;

        let slices = partition(range, period)
            .map_err(|e| StoreError::call_failed(self.name(), e.message))?;
        let mut buckets = Vec::new();
        for (start, end) in slices {
            let slice = TimeRange { start, end };
            if let Some(value) = self.sum(metric, &slice)? {
                buckets.push(NativeBucket {
                    start,
                    end,
                    value: Some(value),
                });
            }
        }
        Ok(buckets)
    }

    async fn read_route(&self, session_id: &str) -> StoreResult<Vec<RoutePoint>> {
        self.begin_data_call().await;
        self.check_capability(self.route_capability())?;
        Ok(self
            .read(&self.routes, "routes")?
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn open_settings(&self, target: SettingsTarget) -> StoreResult<()> {
        if target.platform() != self.platform {
            return Err(StoreError::UnsupportedFeature {
                store: self.name().to_owned(),
                feature: format!("opening {target:?}"),
            });
        }
        self.write(&self.opened_settings, "opened_settings")?
            .push(target);
        Ok(())
    }
}
