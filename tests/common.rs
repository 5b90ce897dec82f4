// ABOUTME: Shared test utilities and fixture builders for integration tests
// ABOUTME: Provides quiet logging, timestamps, native record builders and bridge setup helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `health_bridge`
//!
//! Every builder produces records in the shape a native adapter would return,
//! so tests drive the engine through the in-memory store exactly like the CLI.

use chrono::{DateTime, Duration, TimeZone, Utc};
use health_bridge::bridge::HealthBridge;
use health_bridge::config::BridgeConfig;
use health_bridge::models::SourceMetadata;
use health_bridge::platform::Platform;
use health_bridge::store::{
    BpmSample, HealthStore, InMemoryHealthStore, NativeRecord, NativeUnit, RecordPayload,
    RoutePoint, SessionSegment, StageSegment,
};
use health_bridge::time::TimeRange;
use std::env;
use std::sync::{Arc, Once};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; tests stay quiet by default
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// 2024-01-`day` `hour`:`minute` UTC
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
}

/// `[start, end)` range
pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

/// Metadata for a named source app
pub fn source(name: &str) -> SourceMetadata {
    SourceMetadata::new(name, format!("com.example.{}", name.to_lowercase()), "Acme")
}

/// Available store with the given capabilities granted
pub fn store_with_grants(platform: Platform, granted: &[&str]) -> Arc<InMemoryHealthStore> {
    init_test_logging();
    let store = InMemoryHealthStore::new(platform);
    store.grant(granted.iter().copied()).unwrap();
    Arc::new(store)
}

/// Bridge over `store` with default configuration
pub fn bridge(store: &Arc<InMemoryHealthStore>) -> HealthBridge {
    bridge_with_config(store, BridgeConfig::default())
}

/// Bridge over `store` with a custom configuration
pub fn bridge_with_config(store: &Arc<InMemoryHealthStore>, config: BridgeConfig) -> HealthBridge {
    let store: Arc<dyn HealthStore> = store.clone();
    HealthBridge::with_store(store, config).unwrap()
}

/// Cumulative quantity sample
pub fn quantity(
    id: &str,
    capability: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    value: f64,
    unit: NativeUnit,
) -> NativeRecord {
    NativeRecord {
        id: id.to_owned(),
        capability: capability.to_owned(),
        start,
        end,
        metadata: source("Tracker"),
        payload: RecordPayload::Quantity { value, unit },
    }
}

/// Exercise session without segments or title
pub fn session(
    id: &str,
    capability: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exercise_type: i64,
    has_route: bool,
) -> NativeRecord {
    NativeRecord {
        id: id.to_owned(),
        capability: capability.to_owned(),
        start,
        end,
        metadata: source("Runner"),
        payload: RecordPayload::ExerciseSession {
            exercise_type,
            title: None,
            segments: Vec::new(),
            has_route,
        },
    }
}

/// Exercise session with active segments
pub fn segmented_session(
    id: &str,
    capability: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    segments: &[(DateTime<Utc>, DateTime<Utc>)],
) -> NativeRecord {
    let mut record = session(id, capability, start, end, 56, false);
    record.payload = RecordPayload::ExerciseSession {
        exercise_type: 56,
        title: Some("Intervals".to_owned()),
        segments: segments
            .iter()
            .map(|(start, end)| SessionSegment {
                start: *start,
                end: *end,
            })
            .collect(),
        has_route: false,
    };
    record
}

/// Heart rate series with one reading per minute starting at `start`
pub fn heart_rate_series(
    id: &str,
    capability: &str,
    start: DateTime<Utc>,
    bpm: &[f64],
) -> NativeRecord {
    let minutes = i64::try_from(bpm.len()).unwrap();
    NativeRecord {
        id: id.to_owned(),
        capability: capability.to_owned(),
        start,
        end: start + Duration::minutes(minutes),
        metadata: source("Watch"),
        payload: RecordPayload::HeartRateSeries {
            samples: bpm
                .iter()
                .enumerate()
                .map(|(i, bpm)| BpmSample {
                    time: start + Duration::minutes(i64::try_from(i).unwrap()),
                    bpm: *bpm,
                })
                .collect(),
        },
    }
}

/// Sleep session with `(start, end, native stage code)` segments
pub fn sleep_session(
    id: &str,
    capability: &str,
    stages: &[(DateTime<Utc>, DateTime<Utc>, i64)],
) -> NativeRecord {
    let start = stages.first().map_or_else(|| at(1, 22, 0), |stage| stage.0);
    let end = stages.last().map_or(start, |stage| stage.1);
    NativeRecord {
        id: id.to_owned(),
        capability: capability.to_owned(),
        start,
        end,
        metadata: source("Sleep"),
        payload: RecordPayload::SleepSession {
            stages: stages
                .iter()
                .map(|(start, end, stage)| StageSegment {
                    start: *start,
                    end: *end,
                    stage: *stage,
                })
                .collect(),
        },
    }
}

/// Instantaneous record with an arbitrary payload
pub fn instant(
    id: &str,
    capability: &str,
    time: DateTime<Utc>,
    payload: RecordPayload,
) -> NativeRecord {
    NativeRecord {
        id: id.to_owned(),
        capability: capability.to_owned(),
        start: time,
        end: time,
        metadata: source("Ring"),
        payload,
    }
}

/// Route fix
pub fn fix(time: DateTime<Utc>, latitude: f64, longitude: f64) -> RoutePoint {
    RoutePoint {
        time,
        latitude,
        longitude,
        altitude: Some(12.5),
    }
}
