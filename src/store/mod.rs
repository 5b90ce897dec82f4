// ABOUTME: Native health store capability interface consumed by the normalization engine
// ABOUTME: Defines the HealthStore trait, its lazily connected handle and the in-memory adapter
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Native store capability interface
//!
//! The engine never talks to Health Connect or HealthKit directly. Each backend
//! implements [`HealthStore`], a small capability surface:
//!
//! - read raw records of one capability in a range
//! - aggregate a metric over a range, optionally grouped by a bucket period
//! - report and request granted capabilities
//! - read the GPS route of a session
//!
//! Adapters report failures as [`StoreError`]; the engine decides whether a
//! failure rejects the call or is recorded against a workout sub-query.
//!
//! ## Implementations
//!
//! - [`InMemoryHealthStore`]: thread-safe reference adapter backed by a JSON
//!   snapshot, used by the CLI and the test suite

/// Lazily connected, process-wide store handle
pub mod handle;
/// Thread-safe in-memory adapter
pub mod memory;
/// Shapes exchanged with adapters
pub mod records;

pub use handle::{Availability, ReadyConnector, StoreConnector, StoreHandle};
pub use memory::{InMemoryHealthStore, StoreSnapshot};
pub use records::{
    BpmSample, NativeBucket, NativeCapability, NativeMetric, NativeQuantity, NativeRecord,
    NativeUnit, RecordPayload, RoutePoint, SessionSegment, SettingsTarget, StageSegment,
};

use async_trait::async_trait;
use health_bridge_core::errors::{StoreError, StoreResult};
use health_bridge_core::platform::Platform;
use health_bridge_core::time::{BucketPeriod, TimeRange};
use std::collections::HashSet;

/// Bucket periods every store supports
pub const DEFAULT_SUPPORTED_PERIODS: &[BucketPeriod] = &[BucketPeriod::Day];

/// Capability interface implemented by each native health store backend
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Platform whose identifiers this store understands
    fn platform(&self) -> Platform;

    /// Display name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Whether the store is installed and usable on this device
    fn is_available(&self) -> bool {
        true
    }

    /// Bucket periods the store can group aggregates by
    fn supported_periods(&self) -> &[BucketPeriod] {
        DEFAULT_SUPPORTED_PERIODS
    }

    /// Identifiers of every capability the user has granted
    async fn granted_capabilities(&self) -> StoreResult<HashSet<String>>;

    /// Prompt for the given capabilities and return the granted set afterwards
    async fn request_capabilities(
        &self,
        capabilities: &[NativeCapability],
    ) -> StoreResult<HashSet<String>>;

    /// Raw records of one capability overlapping `range`, ordered by start
    async fn read_records(
        &self,
        capability: NativeCapability,
        range: &TimeRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<NativeRecord>>;

    /// Aggregate `metric` over `range`; `None` means no data, not zero
    async fn aggregate(
        &self,
        metric: &NativeMetric,
        range: &TimeRange,
    ) -> StoreResult<Option<NativeQuantity>>;

    /// Aggregate `metric` over slices of `period` anchored at `range.start`
    ///
    /// Stores may omit slices without data.
    async fn aggregate_grouped(
        &self,
        metric: &NativeMetric,
        range: &TimeRange,
        period: BucketPeriod,
    ) -> StoreResult<Vec<NativeBucket>>;

    /// GPS route of an exercise session
    async fn read_route(&self, session_id: &str) -> StoreResult<Vec<RoutePoint>>;

    /// Hand a settings or store deep link to the OS
    async fn open_settings(&self, target: SettingsTarget) -> StoreResult<()> {
        Err(StoreError::UnsupportedFeature {
            store: self.name().to_owned(),
            feature: format!("opening {target:?}"),
        })
    }
}
