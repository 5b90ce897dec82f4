// ABOUTME: Workout composer joining exercise sessions with correlated sub-queries
// ABOUTME: Fans out calorie, distance, step, heart rate and route reads per workout
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Workout composer
//!
//! For each exercise session in range the composer runs its sub-queries
//! concurrently and joins them into one [`WorkoutRecord`]:
//!
//! | Sub-query    | Runs when                                   | Error key              |
//! |--------------|---------------------------------------------|------------------------|
//! | calories     | always (total energy, then active energy)   | `<id>:calories`        |
//! | distance     | always                                      | `<id>:distance`        |
//! | steps        | `include_steps`                             | `<id>:steps`           |
//! | heart rate   | `include_heart_rate` and granted            | `<id>:heart-rate`      |
//! | route        | `include_route`, granted, session has route | `<id>:route`           |
//!
//! A failed sub-query leaves its field absent and records the message under its
//! key; siblings and other workouts are unaffected. Each workout settles only
//! after all of its sub-queries have (`tokio::join!`), and the batch settles
//! after every workout has. Workouts are composed with bounded concurrency and
//! keep session order.

use futures_util::stream::{self, StreamExt};
use health_bridge_core::constants::{metric_names, subqueries};
use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::models::{workout_type_name, HeartRateSample, RouteSample, WorkoutRecord};
use health_bridge_core::permissions::LogicalPermission;
use health_bridge_core::time::TimeRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info_span, warn, Instrument};

use crate::config::BridgeConfig;
use crate::gate::PermissionGate;
use crate::metrics::MetricResolver;
use crate::store::{HealthStore, NativeRecord, RecordPayload, SessionSegment};

/// Optional sub-queries requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutOptions {
    /// Attach heart rate samples
    pub include_heart_rate: bool,
    /// Attach the GPS route
    pub include_route: bool,
    /// Attach the step count
    pub include_steps: bool,
}

/// Composed workouts with per-sub-query failures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutBatch {
    /// Workouts in session order
    pub workouts: Vec<WorkoutRecord>,
    /// Failure messages keyed by `<workoutId>:<subquery>`
    pub errors: BTreeMap<String, String>,
}

type SubQuery<T> = Result<Option<T>, String>;

/// Session fields the sub-queries need
struct Session<'s> {
    record: &'s NativeRecord,
    exercise_type: i64,
    title: Option<&'s str>,
    segments: &'s [SessionSegment],
    has_route: bool,
}

impl<'s> Session<'s> {
    fn from_record(record: &'s NativeRecord) -> Option<Self> {
        match &record.payload {
            RecordPayload::ExerciseSession {
                exercise_type,
                title,
                segments,
                has_route,
            } => Some(Self {
                record,
                exercise_type: *exercise_type,
                title: title.as_deref(),
                segments,
                has_route: *has_route,
            }),
            _ => None,
        }
    }

    fn window(&self) -> TimeRange {
        TimeRange {
            start: self.record.start,
            end: self.record.end.max(self.record.start),
        }
    }

    fn duration_seconds(&self) -> i64 {
        if self.segments.is_empty() {
            return (self.record.end - self.record.start).num_seconds().max(0);
        }
        self.segments
            .iter()
            .map(|segment| (segment.end - segment.start).num_seconds().max(0))
            .sum()
    }
}

/// Builds composite workout records for one request
pub struct WorkoutComposer<'a> {
    store: &'a dyn HealthStore,
    gate: &'a PermissionGate,
    metrics: MetricResolver,
    config: &'a BridgeConfig,
}

impl<'a> WorkoutComposer<'a> {
    /// Composer over a store and the request's permission gate
    #[must_use]
    pub fn new(
        store: &'a dyn HealthStore,
        gate: &'a PermissionGate,
        config: &'a BridgeConfig,
    ) -> Self {
        Self {
            store,
            gate,
            metrics: MetricResolver::for_platform(store.platform()),
            config,
        }
    }

    /// Compose every exercise session starting in `range`
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` when workouts are not granted and
    /// `ADAPTER_FAILURE` when the session list cannot be read. Sub-query
    /// failures never fail the batch.
    pub async fn compose(
        &self,
        range: &TimeRange,
        options: WorkoutOptions,
    ) -> AppResult<WorkoutBatch> {
        self.gate.require(LogicalPermission::Workouts)?;
        let capability = self
            .gate
            .catalog()
            .primary_capability(LogicalPermission::Workouts)
            .ok_or_else(|| AppError::permission_denied(LogicalPermission::Workouts.label()))?;

        let limit = self.config.max_workout_sessions;
        let mut records = self
            .store
            .read_records(capability, range, Some(limit.saturating_add(1)))
            .await?;
        if records.len() > limit {
            warn!(limit, "Workout session list truncated");
            records.truncate(limit);
        }

        let sessions: Vec<Session<'_>> = records.iter().filter_map(Session::from_record).collect();
        debug!(sessions = sessions.len(), ?options, "Composing workouts");

        let composed: Vec<(WorkoutRecord, Vec<(String, String)>)> = stream::iter(
            sessions
                .iter()
                .map(|session| self.compose_one(session, options)),
        )
        .buffered(self.config.workout_concurrency.max(1))
        .collect()
        .await;

        let mut batch = WorkoutBatch::default();
        for (workout, errors) in composed {
            batch.workouts.push(workout);
            batch.errors.extend(errors);
        }
        Ok(batch)
    }

    async fn compose_one(
        &self,
        session: &Session<'_>,
        options: WorkoutOptions,
    ) -> (WorkoutRecord, Vec<(String, String)>) {
        let id = session.record.id.as_str();
        let window = session.window();

        let span = info_span!("compose_workout", workout.id = %id);
        let (calories, distance, steps, heart_rate, route) = async {
            tokio::join!(
                self.calories(&window),
                self.aggregate_field(metric_names::DISTANCE, &window),
                async {
                    if options.include_steps {
                        self.aggregate_field(metric_names::STEPS, &window).await
                    } else {
                        Ok(None)
                    }
                },
                self.heart_rate(&window, options.include_heart_rate),
                self.route(session, options.include_route),
            )
        }
        .instrument(span)
        .await;

        let mut errors = Vec::new();
        let calories = settle(&mut errors, id, subqueries::CALORIES, calories);
        let distance = settle(&mut errors, id, subqueries::DISTANCE, distance);
        let steps = settle(&mut errors, id, subqueries::STEPS, steps);
        let heart_rate = settle(&mut errors, id, subqueries::HEART_RATE, heart_rate);
        let route = settle(&mut errors, id, subqueries::ROUTE, route);

        let workout = WorkoutRecord {
            id: id.to_owned(),
            metadata: session.record.metadata.clone(),
            start_date: session.record.start,
            end_date: session.record.end,
            workout_type: workout_type_name(self.store.platform(), session.exercise_type)
                .to_owned(),
            title: session.title.map(str::to_owned),
            duration: session.duration_seconds(),
            calories,
            distance,
            steps,
            heart_rate,
            route,
        };
        (workout, errors)
    }

    /// Total energy, falling back to active energy; errors only when neither yields a value
    async fn calories(&self, window: &TimeRange) -> SubQuery<f64> {
        let mut failures = Vec::new();
        for name in [metric_names::TOTAL_CALORIES, metric_names::ACTIVE_CALORIES] {
            match self.aggregate_field(name, window).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(message) => failures.push(message),
            }
        }

        if failures.is_empty() {
            Ok(None)
        } else {
            Err(failures.join("; "))
        }
    }

    async fn aggregate_field(&self, name: &str, window: &TimeRange) -> SubQuery<f64> {
        let metric = self.metrics.resolve(name).map_err(|e| e.message)?;
        let Some(native) = self.gate.readable_metric(&metric) else {
            return Ok(None);
        };

        let quantity = self
            .store
            .aggregate(&native, window)
            .await
            .map_err(|e| e.to_string())?;
        Ok(metric.convert(quantity))
    }

    async fn heart_rate(
        &self,
        window: &TimeRange,
        requested: bool,
    ) -> SubQuery<Vec<HeartRateSample>> {
        if !requested {
            return Ok(None);
        }
        let capabilities = self.gate.readable_capabilities(LogicalPermission::HeartRate);
        if capabilities.is_empty() {
            return Ok(None);
        }

        let mut samples = Vec::new();
        for capability in capabilities {
            let records = self
                .store
                .read_records(capability, window, None)
                .await
                .map_err(|e| e.to_string())?;
            samples.extend(heart_rate_samples(&records, window));
        }
        samples.sort_by_key(|sample| sample.timestamp);
        Ok(Some(samples))
    }

    async fn route(&self, session: &Session<'_>, requested: bool) -> SubQuery<Vec<RouteSample>> {
        if !requested || !session.has_route || !self.gate.allows(LogicalPermission::Route) {
            return Ok(None);
        }

        let mut points: Vec<RouteSample> = self
            .store
            .read_route(&session.record.id)
            .await
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|point| RouteSample {
                timestamp: point.time,
                lat: point.latitude,
                lng: point.longitude,
                alt: point.altitude,
            })
            .collect();
        points.sort_by_key(|point| point.timestamp);
        Ok(Some(points))
    }
}

/// Unwrap a settled sub-query, recording its failure under `<id>:<subquery>`
fn settle<T>(
    errors: &mut Vec<(String, String)>,
    id: &str,
    subquery: &str,
    outcome: SubQuery<T>,
) -> Option<T> {
    match outcome {
        Ok(value) => value,
        Err(message) => {
            errors.push((format!("{id}:{subquery}"), message));
            None
        }
    }
}

fn heart_rate_samples<'r>(
    records: &'r [NativeRecord],
    window: &'r TimeRange,
) -> impl Iterator<Item = HeartRateSample> + 'r {
    records
        .iter()
        .filter_map(|record| match &record.payload {
            RecordPayload::HeartRateSeries { samples } => Some(samples),
            _ => None,
        })
        .flatten()
        .filter(|sample| window.contains(sample.time))
        .map(|sample| HeartRateSample {
            timestamp: sample.time,
            bpm: sample.bpm,
        })
}
