// ABOUTME: Metric resolver turning logical metric names into native aggregate metrics
// ABOUTME: Each metric carries its required permission and a pure null-preserving unit converter
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use health_bridge_core::constants::metric_names;
use health_bridge_core::constants::native::{health_connect as hc, health_kit as hk};
use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::permissions::LogicalPermission;
use health_bridge_core::platform::Platform;
use std::fmt;

use crate::catalog::PermissionCatalog;
use crate::store::{NativeMetric, NativeQuantity, NativeUnit};

/// Converts a native aggregate into the metric's output unit
///
/// `None` in means no data and yields `None`; a quantity in an incompatible
/// unit also yields `None`.
pub type UnitConverter = fn(Option<NativeQuantity>) -> Option<f64>;

/// Step count
#[must_use]
pub fn to_count(quantity: Option<NativeQuantity>) -> Option<f64> {
    quantity?.value_in(NativeUnit::Count)
}

/// Energy in kilocalories
#[must_use]
pub fn to_kilocalories(quantity: Option<NativeQuantity>) -> Option<f64> {
    quantity?.value_in(NativeUnit::Kilocalories)
}

/// Distance in meters
#[must_use]
pub fn to_meters(quantity: Option<NativeQuantity>) -> Option<f64> {
    quantity?.value_in(NativeUnit::Meters)
}

/// Logical metric resolved against one platform
#[derive(Clone)]
pub struct LogicalMetric {
    /// Logical name (`steps`, `active-calories`, ...)
    pub name: &'static str,
    /// Permission a caller needs to read it
    pub permission: LogicalPermission,
    /// Native aggregate backing it
    pub native: NativeMetric,
    /// Null-preserving unit converter
    pub converter: UnitConverter,
    /// Whether a subset of granted sources still measures the metric
    ///
    /// True for distance (each source is one kind of distance), false for
    /// total energy, where active energy alone would under-report.
    pub partial_sources: bool,
}

impl LogicalMetric {
    /// Apply the converter
    #[must_use]
    pub fn convert(&self, quantity: Option<NativeQuantity>) -> Option<f64> {
        (self.converter)(quantity)
    }
}

impl fmt::Debug for LogicalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalMetric")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("native", &self.native)
            .field("partial_sources", &self.partial_sources)
            .finish_non_exhaustive()
    }
}

/// Resolves logical metric names for one platform
#[derive(Debug, Clone, Copy)]
pub struct MetricResolver {
    catalog: PermissionCatalog,
}

impl MetricResolver {
    /// Logical names this resolver accepts
    pub const NAMES: [&'static str; 4] = [
        metric_names::STEPS,
        metric_names::ACTIVE_CALORIES,
        metric_names::TOTAL_CALORIES,
        metric_names::DISTANCE,
    ];

    /// Resolver for `platform`
    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        Self {
            catalog: PermissionCatalog::for_platform(platform),
        }
    }

    /// Resolve a logical metric name
    ///
    /// # Errors
    ///
    /// Returns `UNSUPPORTED_METRIC` for names outside [`Self::NAMES`]
    pub fn resolve(&self, name: &str) -> AppResult<LogicalMetric> {
        let (name, permission, converter): (&'static str, _, UnitConverter) = match name {
            metric_names::STEPS => (metric_names::STEPS, LogicalPermission::Steps, to_count),
            metric_names::ACTIVE_CALORIES => (
                metric_names::ACTIVE_CALORIES,
                LogicalPermission::ActiveCalories,
                to_kilocalories,
            ),
            metric_names::TOTAL_CALORIES => (
                metric_names::TOTAL_CALORIES,
                LogicalPermission::TotalCalories,
                to_kilocalories,
            ),
            metric_names::DISTANCE => {
                (metric_names::DISTANCE, LogicalPermission::Distance, to_meters)
            }
            other => return Err(AppError::unsupported_metric(other)),
        };

        Ok(LogicalMetric {
            name,
            permission,
            native: NativeMetric {
                identifier: self.native_identifier(permission),
                sources: self.catalog.native_capabilities_for(permission).to_vec(),
            },
            converter,
            partial_sources: permission != LogicalPermission::TotalCalories,
        })
    }

    fn native_identifier(&self, permission: LogicalPermission) -> &'static str {
        match (self.catalog.platform(), permission) {
            (Platform::HealthConnect, LogicalPermission::ActiveCalories) => {
                hc::METRIC_ACTIVE_CALORIES_TOTAL
            }
            (Platform::HealthConnect, LogicalPermission::TotalCalories) => {
                hc::METRIC_TOTAL_CALORIES_TOTAL
            }
            (Platform::HealthConnect, LogicalPermission::Distance) => hc::METRIC_DISTANCE_TOTAL,
            (Platform::HealthConnect, _) => hc::METRIC_STEPS_COUNT_TOTAL,
            (Platform::HealthKit, LogicalPermission::ActiveCalories) => {
                hk::METRIC_ACTIVE_ENERGY_SUM
            }
            (Platform::HealthKit, LogicalPermission::TotalCalories) => hk::METRIC_TOTAL_ENERGY_SUM,
            (Platform::HealthKit, LogicalPermission::Distance) => hk::METRIC_DISTANCE_SUM,
            (Platform::HealthKit, _) => hk::METRIC_STEP_COUNT_SUM,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use health_bridge_core::errors::ErrorCode;

    #[test]
    fn test_converters_preserve_null() {
        assert_eq!(to_count(None), None);
        assert_eq!(to_kilocalories(None), None);
        assert_eq!(to_meters(None), None);
    }

    #[test]
    fn test_zero_is_not_null() {
        let zero = NativeQuantity::new(0.0, NativeUnit::Count);
        assert_eq!(to_count(Some(zero)), Some(0.0));
    }

    #[test]
    fn test_incompatible_unit_is_null() {
        let meters = NativeQuantity::new(5.0, NativeUnit::Meters);
        assert_eq!(to_kilocalories(Some(meters)), None);
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        let err = MetricResolver::for_platform(Platform::HealthKit)
            .resolve("heart-rate")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedMetric);
        assert_eq!(err.message, "Unsupported dataType: heart-rate");
    }
}
