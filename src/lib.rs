// ABOUTME: Main library entry point for the cross-platform health data bridge
// ABOUTME: Normalizes Health Connect and HealthKit data into one permission and workout model
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Health Bridge
//!
//! A unified health-data query interface over two native health stores
//! (Android Health Connect and Apple `HealthKit`). Hosts ask for steps,
//! workouts, heart rate, HRV, sleep, oxygen saturation and aggregated metrics
//! in one vocabulary and get one JSON-serializable contract back, whichever
//! store answers.
//!
//! ## Architecture
//!
//! - **Catalog**: logical permissions mapped onto native capability identifiers
//! - **Metrics**: logical metric names resolved to native aggregates and unit converters
//! - **Gate**: per-request grant snapshot; direct reads reject, bulk reads degrade to empty
//! - **Bucketing**: period-aligned slices with best-effort source attribution
//! - **Composer**: concurrent per-workout sub-queries joined into composite records
//! - **Store**: the native store capability trait, its lazy handle and an in-memory adapter
//! - **Bridge**: the host-facing facade and command dispatcher
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use health_bridge::bridge::{HealthBridge, RangeRequest};
//! use health_bridge::config::BridgeConfig;
//! use health_bridge::errors::AppResult;
//! use health_bridge::platform::Platform;
//! use health_bridge::store::InMemoryHealthStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let store = Arc::new(InMemoryHealthStore::new(Platform::HealthConnect));
//!     let bridge = HealthBridge::with_store(store, BridgeConfig::from_env())?;
//!
//!     let sleep = bridge
//!         .query_sleep(&RangeRequest::new("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"))
//!         .await?;
//!     println!("{} sleep stages", sleep.sleep.len());
//!     Ok(())
//! }
//! ```

/// Time bucketing and source attribution
pub mod bucketing;

/// Host-facing facade, wire types and command dispatch
pub mod bridge;

/// Logical permission to native capability mapping
pub mod catalog;

/// Workout composition with per-sub-query failure tracking
pub mod composer;

/// Environment-driven engine configuration
pub mod config;

/// Per-request permission gate
pub mod gate;

/// Structured logging setup
pub mod logging;

/// Logical metric resolution and unit conversion
pub mod metrics;

/// Native store capability interface and adapters
pub mod store;

// Foundation types re-exported from health-bridge-core
pub use health_bridge_core::{constants, errors, models, permissions, platform, time};
