// ABOUTME: Criterion benchmarks for time bucketing and bucketed aggregation
// ABOUTME: Measures range partitioning and the full aggregate path over the in-memory store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Criterion benchmarks for the time bucketer.
//!
//! Measures slice partitioning for long ranges and a full bucketed steps
//! aggregation with source attribution over a dense in-memory store.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use health_bridge::bucketing::{partition, TimeBucketer};
use health_bridge::config::BridgeConfig;
use health_bridge::constants::native::health_kit as hk;
use health_bridge::gate::PermissionGate;
use health_bridge::metrics::MetricResolver;
use health_bridge::models::SourceMetadata;
use health_bridge::platform::Platform;
use health_bridge::store::{InMemoryHealthStore, NativeRecord, NativeUnit, RecordPayload};
use health_bridge::time::{BucketPeriod, TimeRange};
use tokio::runtime::Runtime;

fn days(count: i64) -> TimeRange {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    TimeRange::new(start, start + Duration::days(count)).unwrap()
}

/// Store with one step sample every `spacing_minutes` across `range`
fn dense_store(range: &TimeRange, spacing_minutes: i64) -> InMemoryHealthStore {
    let store = InMemoryHealthStore::new(Platform::HealthKit)
        .with_supported_periods(&[BucketPeriod::Hour, BucketPeriod::Day, BucketPeriod::Week]);
    store.grant([hk::STEP_COUNT]).unwrap();

    let mut cursor = range.start;
    let mut index = 0_usize;
    while cursor < range.end {
        store
            .insert_record(NativeRecord {
                id: format!("s{index}"),
                capability: hk::STEP_COUNT.to_owned(),
                start: cursor,
                end: cursor + Duration::minutes(5),
                metadata: SourceMetadata::new("Phone", "com.example.phone", "Acme"),
                payload: RecordPayload::Quantity {
                    value: 120.0,
                    unit: NativeUnit::Count,
                },
            })
            .unwrap();
        cursor += Duration::minutes(spacing_minutes);
        index += 1;
    }
    store
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for (label, count, period) in [
        ("week_by_hour", 7, BucketPeriod::Hour),
        ("year_by_day", 365, BucketPeriod::Day),
        ("year_by_week", 365, BucketPeriod::Week),
    ] {
        let range = days(count);
        group.bench_with_input(BenchmarkId::new("slices", label), &range, |b, range| {
            b.iter(|| partition(black_box(range), period).unwrap());
        });
    }

    group.finish();
}

fn bench_bucketed_steps(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let config = BridgeConfig::default();
    let metric = MetricResolver::for_platform(Platform::HealthKit)
        .resolve("steps")
        .unwrap();
    let mut group = c.benchmark_group("bucketed_steps");

    for (label, count, period) in [
        ("month_by_day", 30, BucketPeriod::Day),
        ("week_by_hour", 7, BucketPeriod::Hour),
    ] {
        let range = days(count);
        let store = dense_store(&range, 30);
        let gate = rt.block_on(PermissionGate::load(&store)).unwrap();
        let bucketer = TimeBucketer::new(&store, &gate, &config);

        group.bench_with_input(BenchmarkId::new("aggregate", label), &range, |b, range| {
            b.iter(|| {
                rt.block_on(bucketer.aggregate(&metric, black_box(range), period, true))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_partition, bench_bucketed_steps);
criterion_main!(benches);
