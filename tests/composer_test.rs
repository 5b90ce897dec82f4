// ABOUTME: Integration tests for workout composition through the bridge
// ABOUTME: Covers calorie fallback, sub-query failure isolation, routes, heart rate and ordering
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration as ChronoDuration;
use common::{
    at, bridge, bridge_with_config, fix, heart_rate_series, quantity, range, segmented_session,
    session, store_with_grants,
};
use health_bridge::bridge::WorkoutsRequest;
use health_bridge::composer::{WorkoutComposer, WorkoutOptions};
use health_bridge::config::BridgeConfig;
use health_bridge::constants::native::{health_connect as hc, health_kit as hk};
use health_bridge::errors::ErrorCode;
use health_bridge::gate::PermissionGate;
use health_bridge::platform::Platform;
use health_bridge::store::{InMemoryHealthStore, NativeUnit};
use std::sync::Arc;
use std::time::Duration;

const ALL_WORKOUT_GRANTS: &[&str] = &[
    hc::READ_EXERCISE,
    hc::READ_EXERCISE_ROUTE,
    hc::READ_TOTAL_CALORIES_BURNED,
    hc::READ_ACTIVE_CALORIES_BURNED,
    hc::READ_DISTANCE,
    hc::READ_STEPS,
    hc::READ_HEART_RATE,
];

fn day_request(
    include_heart_rate: bool,
    include_route: bool,
    include_steps: bool,
) -> WorkoutsRequest {
    WorkoutsRequest {
        start_date: Some("2024-01-01T00:00:00.000Z".to_owned()),
        end_date: Some("2024-01-02T00:00:00.000Z".to_owned()),
        include_heart_rate,
        include_route,
        include_steps,
    }
}

fn morning_run_store() -> Arc<InMemoryHealthStore> {
    let store = store_with_grants(Platform::HealthConnect, ALL_WORKOUT_GRANTS);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, false))
        .unwrap();
    store
}

#[tokio::test]
async fn test_calories_fall_back_to_active_energy() {
    let store = morning_run_store();
    store
        .insert_record(quantity(
            "a1",
            hc::READ_ACTIVE_CALORIES_BURNED,
            at(1, 8, 10),
            at(1, 8, 50),
            300.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts.len(), 1);
    assert_eq!(batch.workouts[0].calories, Some(300.0));
    assert!(batch.errors.is_empty());
}

#[tokio::test]
async fn test_total_energy_wins_over_active_energy() {
    let store = morning_run_store();
    store
        .insert_record(quantity(
            "t1",
            hc::READ_TOTAL_CALORIES_BURNED,
            at(1, 8, 0),
            at(1, 9, 0),
            420.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();
    store
        .insert_record(quantity(
            "a1",
            hc::READ_ACTIVE_CALORIES_BURNED,
            at(1, 8, 10),
            at(1, 8, 50),
            300.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts[0].calories, Some(420.0));
}

#[tokio::test]
async fn test_calories_absent_when_neither_metric_has_data() {
    let store = morning_run_store();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();
    let workout = &batch.workouts[0];

    assert_eq!(workout.calories, None);
    assert_eq!(workout.distance, None);
    assert!(batch.errors.is_empty());

    let json = serde_json::to_value(workout).unwrap();
    assert!(json.get("calories").is_none());
}

#[tokio::test]
async fn test_failed_total_energy_is_hidden_when_active_energy_answers() {
    let store = morning_run_store();
    store
        .fail_on(hc::METRIC_TOTAL_CALORIES_TOTAL, "boom")
        .unwrap();
    store
        .insert_record(quantity(
            "a1",
            hc::READ_ACTIVE_CALORIES_BURNED,
            at(1, 8, 10),
            at(1, 8, 50),
            300.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts[0].calories, Some(300.0));
    assert!(batch.errors.is_empty());
}

#[tokio::test]
async fn test_calorie_failure_recorded_when_chain_yields_nothing() {
    let store = morning_run_store();
    store
        .fail_on(hc::METRIC_TOTAL_CALORIES_TOTAL, "boom")
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts.len(), 1);
    assert_eq!(batch.workouts[0].calories, None);
    assert!(batch.errors["w1:calories"].contains("boom"));
}

#[tokio::test]
async fn test_distance_failure_does_not_touch_siblings() {
    let store = morning_run_store();
    store
        .fail_on(hc::METRIC_DISTANCE_TOTAL, "distance service offline")
        .unwrap();
    store
        .insert_record(quantity(
            "t1",
            hc::READ_TOTAL_CALORIES_BURNED,
            at(1, 8, 0),
            at(1, 9, 0),
            420.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();
    store
        .insert_record(quantity(
            "s1",
            hc::READ_STEPS,
            at(1, 8, 0),
            at(1, 9, 0),
            7000.0,
            NativeUnit::Count,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, true))
        .await
        .unwrap();
    let workout = &batch.workouts[0];

    assert_eq!(workout.calories, Some(420.0));
    assert_eq!(workout.steps, Some(7000.0));
    assert_eq!(workout.distance, None);
    assert_eq!(batch.errors.len(), 1);
    assert!(batch.errors["w1:distance"].contains("distance service offline"));
}

#[tokio::test]
async fn test_steps_only_when_requested() {
    let store = morning_run_store();
    store
        .insert_record(quantity(
            "s1",
            hc::READ_STEPS,
            at(1, 8, 0),
            at(1, 9, 0),
            7000.0,
            NativeUnit::Count,
        ))
        .unwrap();

    let without = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();
    assert_eq!(without.workouts[0].steps, None);

    let with = bridge(&store)
        .query_workouts(&day_request(false, false, true))
        .await
        .unwrap();
    assert_eq!(with.workouts[0].steps, Some(7000.0));
}

#[tokio::test]
async fn test_route_less_session_keeps_workout_without_route() {
    let store = morning_run_store();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, true, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts.len(), 1);
    assert!(batch.workouts[0].route.is_none());
    assert!(!batch.errors.keys().any(|key| key.ends_with(":route")));
}

#[tokio::test]
async fn test_route_points_sorted_by_timestamp() {
    let store = store_with_grants(Platform::HealthConnect, ALL_WORKOUT_GRANTS);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, true))
        .unwrap();
    store
        .insert_route(
            "w1",
            vec![
                fix(at(1, 8, 20), 48.2, 16.4),
                fix(at(1, 8, 0), 48.0, 16.2),
                fix(at(1, 8, 10), 48.1, 16.3),
            ],
        )
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, true, false))
        .await
        .unwrap();
    let route = batch.workouts[0].route.as_ref().unwrap();

    let times: Vec<_> = route.iter().map(|point| point.timestamp).collect();
    assert_eq!(times, vec![at(1, 8, 0), at(1, 8, 10), at(1, 8, 20)]);
    assert_eq!(route[0].alt, Some(12.5));
}

#[tokio::test]
async fn test_route_failure_scoped_to_route_key() {
    let store = store_with_grants(Platform::HealthConnect, ALL_WORKOUT_GRANTS);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, true))
        .unwrap();
    store
        .insert_record(quantity(
            "t1",
            hc::READ_TOTAL_CALORIES_BURNED,
            at(1, 8, 0),
            at(1, 9, 0),
            420.0,
            NativeUnit::Kilocalories,
        ))
        .unwrap();
    store
        .fail_on(hc::READ_EXERCISE_ROUTE, "gps file corrupt")
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, true, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts.len(), 1);
    assert_eq!(batch.workouts[0].calories, Some(420.0));
    assert!(batch.workouts[0].route.is_none());
    assert_eq!(batch.errors.keys().collect::<Vec<_>>(), vec!["w1:route"]);
}

#[tokio::test]
async fn test_route_skipped_without_route_permission() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_EXERCISE]);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, true))
        .unwrap();
    store
        .insert_route("w1", vec![fix(at(1, 8, 0), 48.0, 16.2)])
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, true, false))
        .await
        .unwrap();

    assert!(batch.workouts[0].route.is_none());
    assert!(batch.errors.is_empty());
}

#[tokio::test]
async fn test_heart_rate_limited_to_session_window() {
    let store = morning_run_store();
    store
        .insert_record(heart_rate_series(
            "hr-a",
            hc::READ_HEART_RATE,
            at(1, 7, 58),
            &[90.0, 95.0, 120.0, 125.0],
        ))
        .unwrap();
    store
        .insert_record(heart_rate_series(
            "hr-b",
            hc::READ_HEART_RATE,
            at(1, 8, 59),
            &[150.0, 140.0, 100.0],
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(true, false, false))
        .await
        .unwrap();
    let samples = batch.workouts[0].heart_rate.as_ref().unwrap();

    let bpm: Vec<f64> = samples.iter().map(|sample| sample.bpm).collect();
    // 09:00 is the session end and falls outside the half-open window
    assert_eq!(bpm, vec![120.0, 125.0, 150.0]);
    assert!(samples
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[tokio::test]
async fn test_heart_rate_absent_without_permission() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_EXERCISE]);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, false))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(true, false, false))
        .await
        .unwrap();

    assert!(batch.workouts[0].heart_rate.is_none());
    assert!(batch.errors.is_empty());
}

#[tokio::test]
async fn test_unmapped_exercise_code_becomes_other() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_EXERCISE]);
    store
        .insert_record(session(
            "w1",
            hc::READ_EXERCISE,
            at(1, 8, 0),
            at(1, 9, 0),
            9999,
            false,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts[0].workout_type, "OTHER");
}

#[tokio::test]
async fn test_health_kit_activity_names() {
    let store = store_with_grants(Platform::HealthKit, &[hk::WORKOUT]);
    store
        .insert_record(session("hk-1", hk::WORKOUT, at(1, 6, 0), at(1, 6, 45), 37, false))
        .unwrap();
    store
        .insert_record(session(
            "hk-2",
            hk::WORKOUT,
            at(1, 18, 0),
            at(1, 18, 30),
            9999,
            false,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();
    let types: Vec<&str> = batch
        .workouts
        .iter()
        .map(|w| w.workout_type.as_str())
        .collect();

    assert_eq!(types, vec!["running", "other"]);
}

#[tokio::test]
async fn test_duration_sums_segments() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_EXERCISE]);
    store
        .insert_record(segmented_session(
            "w1",
            hc::READ_EXERCISE,
            at(1, 8, 0),
            at(1, 9, 0),
            &[(at(1, 8, 0), at(1, 8, 20)), (at(1, 8, 30), at(1, 8, 45))],
        ))
        .unwrap();
    store
        .insert_record(session(
            "w2",
            hc::READ_EXERCISE,
            at(1, 10, 0),
            at(1, 11, 0),
            56,
            false,
        ))
        .unwrap();

    let batch = bridge(&store)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    assert_eq!(batch.workouts[0].duration, 35 * 60);
    assert_eq!(batch.workouts[0].title.as_deref(), Some("Intervals"));
    assert_eq!(batch.workouts[1].duration, 3600);
}

#[tokio::test]
async fn test_workouts_require_permission() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_HEART_RATE]);
    store
        .insert_record(session("w1", hc::READ_EXERCISE, at(1, 8, 0), at(1, 9, 0), 56, false))
        .unwrap();

    let err = bridge(&store)
        .query_workouts(&day_request(true, false, false))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert_eq!(err.message, "Workouts permission not granted");
    assert_eq!(store.data_calls(), 0);
}

#[tokio::test]
async fn test_session_list_truncated_to_limit() {
    let store = store_with_grants(Platform::HealthConnect, &[hc::READ_EXERCISE]);
    for (i, hour) in [6, 9, 12].into_iter().enumerate() {
        store
            .insert_record(session(
                &format!("w{i}"),
                hc::READ_EXERCISE,
                at(1, hour, 0),
                at(1, hour, 30),
                56,
                false,
            ))
            .unwrap();
    }
    let config = BridgeConfig {
        max_workout_sessions: 2,
        ..BridgeConfig::default()
    };

    let batch = bridge_with_config(&store, config)
        .query_workouts(&day_request(false, false, false))
        .await
        .unwrap();

    let ids: Vec<&str> = batch.workouts.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w0", "w1"]);
}

#[tokio::test]
async fn test_concurrent_composition_keeps_session_order() {
    common::init_test_logging();
    let store = Arc::new(
        InMemoryHealthStore::new(Platform::HealthConnect).with_latency(Duration::from_millis(5)),
    );
    store.grant(ALL_WORKOUT_GRANTS.iter().copied()).unwrap();
    for i in 0..6_i64 {
        let start = at(1, 6, 0) + ChronoDuration::hours(i * 2);
        store
            .insert_record(session(
                &format!("w{i}"),
                hc::READ_EXERCISE,
                start,
                start + ChronoDuration::minutes(40),
                56,
                false,
            ))
            .unwrap();
    }
    let config = BridgeConfig {
        workout_concurrency: 3,
        ..BridgeConfig::default()
    };

    let batch = bridge_with_config(&store, config)
        .query_workouts(&day_request(true, false, true))
        .await
        .unwrap();

    let ids: Vec<&str> = batch.workouts.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w0", "w1", "w2", "w3", "w4", "w5"]);
}

#[tokio::test]
async fn test_composer_directly_over_gate() {
    let store = morning_run_store();
    let gate = PermissionGate::load(store.as_ref()).await.unwrap();
    let config = BridgeConfig::default();

    let batch = WorkoutComposer::new(store.as_ref(), &gate, &config)
        .compose(&range(at(1, 0, 0), at(2, 0, 0)), WorkoutOptions::default())
        .await
        .unwrap();

    assert_eq!(batch.workouts[0].id, "w1");
    assert_eq!(batch.workouts[0].workout_type, "RUNNING");
    assert_eq!(batch.workouts[0].metadata.source_name, "Runner");
}
