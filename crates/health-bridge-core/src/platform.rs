// ABOUTME: Native health store platform identifiers
// ABOUTME: Distinguishes Health Connect (Android) from HealthKit (iOS) for catalog lookups
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::HrvType;

/// Native health store family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Android Health Connect
    HealthConnect,
    /// Apple HealthKit
    HealthKit,
}

impl Platform {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HealthConnect => "health-connect",
            Self::HealthKit => "health-kit",
        }
    }

    /// Display name of the store, used in log lines and error messages
    #[must_use]
    pub const fn store_name(&self) -> &'static str {
        match self {
            Self::HealthConnect => "Health Connect",
            Self::HealthKit => "HealthKit",
        }
    }

    /// Heart rate variability flavor the store records
    #[must_use]
    pub const fn hrv_type(&self) -> HrvType {
        match self {
            Self::HealthConnect => HrvType::Rmssd,
            Self::HealthKit => HrvType::Sdnn,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health-connect" | "healthconnect" | "android" => Ok(Self::HealthConnect),
            "health-kit" | "healthkit" | "ios" => Ok(Self::HealthKit),
            _ => Err(AppError::invalid_argument(format!("Unknown platform: {s}"))),
        }
    }
}
