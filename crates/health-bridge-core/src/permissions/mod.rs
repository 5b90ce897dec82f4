// ABOUTME: Logical permission vocabulary shared by every health store platform
// ABOUTME: Wire names, bitflag sets and the partial parse that drops unknown names
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Logical permissions
//!
//! Hosts ask for permissions by platform-agnostic names such as `READ_STEPS`.
//! Each name maps to one [`LogicalPermission`]; the per-platform catalog in the
//! engine crate decides which native capabilities back it.
//!
//! Unknown names are never an error. [`parse_permissions`] keeps recognized
//! values in input order and reports the rest separately for diagnostics.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Platform-agnostic read permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalPermission {
    /// Step counts
    #[serde(rename = "READ_STEPS")]
    Steps,
    /// Workout / exercise sessions
    #[serde(rename = "READ_WORKOUTS")]
    Workouts,
    /// Heart rate series
    #[serde(rename = "READ_HEART_RATE")]
    HeartRate,
    /// Heart rate variability
    #[serde(rename = "READ_HRV")]
    Hrv,
    /// Workout GPS routes
    #[serde(rename = "READ_ROUTE")]
    Route,
    /// Active energy burned
    #[serde(rename = "READ_ACTIVE_CALORIES")]
    ActiveCalories,
    /// Total energy burned
    #[serde(rename = "READ_TOTAL_CALORIES")]
    TotalCalories,
    /// Distance covered
    #[serde(rename = "READ_DISTANCE")]
    Distance,
    /// Sleep sessions and stages
    #[serde(rename = "READ_SLEEP")]
    Sleep,
    /// Blood oxygen saturation
    #[serde(rename = "READ_OXYGEN_SATURATION")]
    OxygenSaturation,
    /// Mindfulness sessions
    #[serde(rename = "READ_MINDFULNESS")]
    Mindfulness,
}

impl LogicalPermission {
    /// Every logical permission, in catalog order
    pub const ALL: [Self; 11] = [
        Self::Steps,
        Self::Workouts,
        Self::HeartRate,
        Self::Hrv,
        Self::Route,
        Self::ActiveCalories,
        Self::TotalCalories,
        Self::Distance,
        Self::Sleep,
        Self::OxygenSaturation,
        Self::Mindfulness,
    ];

    /// Wire name used by hosts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Steps => "READ_STEPS",
            Self::Workouts => "READ_WORKOUTS",
            Self::HeartRate => "READ_HEART_RATE",
            Self::Hrv => "READ_HRV",
            Self::Route => "READ_ROUTE",
            Self::ActiveCalories => "READ_ACTIVE_CALORIES",
            Self::TotalCalories => "READ_TOTAL_CALORIES",
            Self::Distance => "READ_DISTANCE",
            Self::Sleep => "READ_SLEEP",
            Self::OxygenSaturation => "READ_OXYGEN_SATURATION",
            Self::Mindfulness => "READ_MINDFULNESS",
        }
    }

    /// Human-readable label used in rejection messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Steps => "Steps",
            Self::Workouts => "Workouts",
            Self::HeartRate => "Heart rate",
            Self::Hrv => "HRV",
            Self::Route => "Route",
            Self::ActiveCalories => "Active calories",
            Self::TotalCalories => "Total calories",
            Self::Distance => "Distance",
            Self::Sleep => "Sleep",
            Self::OxygenSaturation => "Oxygen saturation",
            Self::Mindfulness => "Mindfulness",
        }
    }

    /// Bit for this permission inside a [`HealthPermissions`] set
    #[must_use]
    pub const fn flag(&self) -> HealthPermissions {
        match self {
            Self::Steps => HealthPermissions::STEPS,
            Self::Workouts => HealthPermissions::WORKOUTS,
            Self::HeartRate => HealthPermissions::HEART_RATE,
            Self::Hrv => HealthPermissions::HRV,
            Self::Route => HealthPermissions::ROUTE,
            Self::ActiveCalories => HealthPermissions::ACTIVE_CALORIES,
            Self::TotalCalories => HealthPermissions::TOTAL_CALORIES,
            Self::Distance => HealthPermissions::DISTANCE,
            Self::Sleep => HealthPermissions::SLEEP,
            Self::OxygenSaturation => HealthPermissions::OXYGEN_SATURATION,
            Self::Mindfulness => HealthPermissions::MINDFULNESS,
        }
    }
}

impl fmt::Display for LogicalPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalPermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|permission| permission.as_str() == s)
            .copied()
            .ok_or_else(|| AppError::invalid_argument(format!("Unknown permission: {s}")))
    }
}

bitflags! {
    /// Set of logical permissions
    ///
    /// Used to summarize what a caller holds without allocating.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HealthPermissions: u16 {
        /// `READ_STEPS`
        const STEPS = 1 << 0;
        /// `READ_WORKOUTS`
        const WORKOUTS = 1 << 1;
        /// `READ_HEART_RATE`
        const HEART_RATE = 1 << 2;
        /// `READ_HRV`
        const HRV = 1 << 3;
        /// `READ_ROUTE`
        const ROUTE = 1 << 4;
        /// `READ_ACTIVE_CALORIES`
        const ACTIVE_CALORIES = 1 << 5;
        /// `READ_TOTAL_CALORIES`
        const TOTAL_CALORIES = 1 << 6;
        /// `READ_DISTANCE`
        const DISTANCE = 1 << 7;
        /// `READ_SLEEP`
        const SLEEP = 1 << 8;
        /// `READ_OXYGEN_SATURATION`
        const OXYGEN_SATURATION = 1 << 9;
        /// `READ_MINDFULNESS`
        const MINDFULNESS = 1 << 10;
    }
}

impl HealthPermissions {
    /// Logical permissions contained in this set, in catalog order
    #[must_use]
    pub fn permissions(&self) -> Vec<LogicalPermission> {
        LogicalPermission::ALL
            .into_iter()
            .filter(|permission| self.contains(permission.flag()))
            .collect()
    }
}

impl FromIterator<LogicalPermission> for HealthPermissions {
    fn from_iter<I: IntoIterator<Item = LogicalPermission>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, permission| set | permission.flag())
    }
}

/// Result of parsing host-supplied permission names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPermissions {
    /// Recognized permissions, in input order, without duplicates
    pub recognized: Vec<LogicalPermission>,
    /// Names that matched no logical permission, in input order
    pub unrecognized: Vec<String>,
}

impl ParsedPermissions {
    /// Recognized permissions as a bit set
    #[must_use]
    pub fn as_set(&self) -> HealthPermissions {
        self.recognized.iter().copied().collect()
    }
}

/// Split host-supplied names into recognized permissions and unknown names
#[must_use]
pub fn parse_permissions<I, S>(names: I) -> ParsedPermissions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedPermissions::default();
    let mut seen = HealthPermissions::empty();

    for name in names {
        let name = name.as_ref();
        match name.parse::<LogicalPermission>() {
            Ok(permission) => {
                if !seen.contains(permission.flag()) {
                    seen |= permission.flag();
                    parsed.recognized.push(permission);
                }
            }
            Err(_) => parsed.unrecognized.push(name.to_owned()),
        }
    }

    parsed
}
