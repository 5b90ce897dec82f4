// ABOUTME: Permission catalog mapping logical permissions onto native capabilities per platform
// ABOUTME: Answers grant checks by exact identifier membership and builds permission prompt lists
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Permission catalog
//!
//! Each [`LogicalPermission`] maps to zero or more [`NativeCapability`]
//! identifiers. The relation is many-to-many across platforms: HealthKit backs
//! `READ_DISTANCE` with four distance quantity types and `READ_TOTAL_CALORIES`
//! with active plus basal energy, while Health Connect uses one permission
//! string for each.
//!
//! Grant checks compare full identifiers by exact set membership. Reporting
//! (`checkHealthPermissions`) requires every mapped capability; a read path only
//! needs the capability backing that read, see [`PermissionCatalog::can_read`].

use health_bridge_core::constants::native::{health_connect as hc, health_kit as hk};
use health_bridge_core::permissions::{parse_permissions, LogicalPermission, ParsedPermissions};
use health_bridge_core::platform::Platform;
use std::collections::{BTreeMap, HashSet};

use crate::store::NativeCapability;

type CatalogEntry = (LogicalPermission, &'static [NativeCapability]);

const UNMAPPED: &[NativeCapability] = &[];

const HEALTH_CONNECT: &[CatalogEntry] = &[
    (LogicalPermission::Steps, &[NativeCapability::health_connect(hc::READ_STEPS)]),
    (LogicalPermission::Workouts, &[NativeCapability::health_connect(hc::READ_EXERCISE)]),
    (LogicalPermission::HeartRate, &[NativeCapability::health_connect(hc::READ_HEART_RATE)]),
    (
        LogicalPermission::Hrv,
        &[NativeCapability::health_connect(hc::READ_HEART_RATE_VARIABILITY)],
    ),
    (LogicalPermission::Route, &[NativeCapability::health_connect(hc::READ_EXERCISE_ROUTE)]),
    (
        LogicalPermission::ActiveCalories,
        &[NativeCapability::health_connect(hc::READ_ACTIVE_CALORIES_BURNED)],
    ),
    (
        LogicalPermission::TotalCalories,
        &[NativeCapability::health_connect(hc::READ_TOTAL_CALORIES_BURNED)],
    ),
    (LogicalPermission::Distance, &[NativeCapability::health_connect(hc::READ_DISTANCE)]),
    (LogicalPermission::Sleep, &[NativeCapability::health_connect(hc::READ_SLEEP)]),
    (
        LogicalPermission::OxygenSaturation,
        &[NativeCapability::health_connect(hc::READ_OXYGEN_SATURATION)],
    ),
    (LogicalPermission::Mindfulness, &[NativeCapability::health_connect(hc::READ_MINDFULNESS)]),
];

const HEALTH_KIT: &[CatalogEntry] = &[
    (LogicalPermission::Steps, &[NativeCapability::health_kit(hk::STEP_COUNT)]),
    (LogicalPermission::Workouts, &[NativeCapability::health_kit(hk::WORKOUT)]),
    (LogicalPermission::HeartRate, &[NativeCapability::health_kit(hk::HEART_RATE)]),
    (
        LogicalPermission::Hrv,
        &[NativeCapability::health_kit(hk::HEART_RATE_VARIABILITY_SDNN)],
    ),
    (LogicalPermission::Route, &[NativeCapability::health_kit(hk::WORKOUT_ROUTE)]),
    (
        LogicalPermission::ActiveCalories,
        &[NativeCapability::health_kit(hk::ACTIVE_ENERGY_BURNED)],
    ),
    (
        LogicalPermission::TotalCalories,
        &[
            NativeCapability::health_kit(hk::ACTIVE_ENERGY_BURNED),
            NativeCapability::health_kit(hk::BASAL_ENERGY_BURNED),
        ],
    ),
    (
        LogicalPermission::Distance,
        &[
            NativeCapability::health_kit(hk::DISTANCE_CYCLING),
            NativeCapability::health_kit(hk::DISTANCE_SWIMMING),
            NativeCapability::health_kit(hk::DISTANCE_WALKING_RUNNING),
            NativeCapability::health_kit(hk::DISTANCE_DOWNHILL_SNOW_SPORTS),
        ],
    ),
    (LogicalPermission::Sleep, &[NativeCapability::health_kit(hk::SLEEP_ANALYSIS)]),
    (
        LogicalPermission::OxygenSaturation,
        &[NativeCapability::health_kit(hk::OXYGEN_SATURATION)],
    ),
    (LogicalPermission::Mindfulness, &[NativeCapability::health_kit(hk::MINDFUL_SESSION)]),
];

/// Logical-to-native permission mapping for one platform
#[derive(Debug, Clone, Copy)]
pub struct PermissionCatalog {
    platform: Platform,
    entries: &'static [CatalogEntry],
}

impl PermissionCatalog {
    /// Catalog for `platform`
    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        let entries = match platform {
            Platform::HealthConnect => HEALTH_CONNECT,
            Platform::HealthKit => HEALTH_KIT,
        };
        Self { platform, entries }
    }

    /// Platform this catalog maps onto
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Split host permission names into recognized permissions and unknown names
    ///
    /// A permission this platform has no capability for counts as unknown.
    #[must_use]
    pub fn resolve<I, S>(&self, names: I) -> ParsedPermissions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_permissions(names);
        let (recognized, unmapped): (Vec<_>, Vec<_>) = parsed
            .recognized
            .into_iter()
            .partition(|permission| !self.native_capabilities_for(*permission).is_empty());

        let mut unrecognized = parsed.unrecognized;
        unrecognized.extend(unmapped.iter().map(|permission| permission.as_str().to_owned()));
        ParsedPermissions {
            recognized,
            unrecognized,
        }
    }

    /// Native capabilities backing `permission`; empty when the platform has none
    #[must_use]
    pub fn native_capabilities_for(
        &self,
        permission: LogicalPermission,
    ) -> &'static [NativeCapability] {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == permission)
            .map_or(UNMAPPED, |(_, capabilities)| *capabilities)
    }

    /// Capability read by direct single-type queries for `permission`
    #[must_use]
    pub fn primary_capability(&self, permission: LogicalPermission) -> Option<NativeCapability> {
        self.native_capabilities_for(permission).first().copied()
    }

    /// Whether every capability mapped to `permission` is granted
    ///
    /// A permission without any mapping is never granted.
    #[must_use]
    pub fn is_granted(&self, permission: LogicalPermission, granted: &HashSet<String>) -> bool {
        let capabilities = self.native_capabilities_for(permission);
        !capabilities.is_empty()
            && capabilities
                .iter()
                .all(|capability| granted.contains(capability.identifier))
    }

    /// Whether a read of `capability` is allowed
    #[must_use]
    pub fn can_read(&self, capability: NativeCapability, granted: &HashSet<String>) -> bool {
        capability.platform == self.platform && granted.contains(capability.identifier)
    }

    /// Deduplicated capabilities to prompt for, in request order
    #[must_use]
    pub fn capabilities_for_request(
        &self,
        permissions: &[LogicalPermission],
    ) -> Vec<NativeCapability> {
        let mut seen = HashSet::new();
        permissions
            .iter()
            .flat_map(|permission| self.native_capabilities_for(*permission))
            .filter(|capability| seen.insert(capability.identifier))
            .copied()
            .collect()
    }

    /// Grant status of each permission keyed by wire name
    #[must_use]
    pub fn grant_report(
        &self,
        permissions: &[LogicalPermission],
        granted: &HashSet<String>,
    ) -> BTreeMap<String, bool> {
        permissions
            .iter()
            .map(|permission| {
                (
                    permission.as_str().to_owned(),
                    self.is_granted(*permission, granted),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_permission_is_mapped_on_both_platforms() {
        for platform in [Platform::HealthConnect, Platform::HealthKit] {
            let catalog = PermissionCatalog::for_platform(platform);
            for permission in LogicalPermission::ALL {
                let capabilities = catalog.native_capabilities_for(permission);
                assert!(!capabilities.is_empty(), "{platform} {permission}");
                assert!(capabilities.iter().all(|c| c.platform == platform));
            }
        }
    }
}
