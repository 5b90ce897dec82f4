// ABOUTME: Host-facing bridge facade exposing every health command over the normalization engine
// ABOUTME: Validates requests, gates permissions, traces each call and routes commands by name
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Bridge facade
//!
//! [`HealthBridge`] is what a host application talks to. Every command
//! follows the same order:
//!
//! 1. validate the request (`INVALID_ARGUMENT`, `UNSUPPORTED_METRIC`,
//!    `UNSUPPORTED_BUCKET`); nothing touches the store before this passes
//! 2. connect the store through the shared [`StoreHandle`]
//! 3. capture a [`PermissionGate`] snapshot for the request
//! 4. run the read through the bucketer, the composer or a direct read
//!
//! Each call runs inside a `bridge_call` span carrying a generated request id,
//! which is also attached to any error returned.
//!
//! [`HealthBridge::dispatch`] routes command names (`queryWorkouts`, ...) with
//! JSON parameters for hosts that speak JSON only.

/// Request and response shapes
pub mod wire;

pub use wire::{
    AggregatedQuery, AggregatedRequest, AggregatedResponse, AvailabilityResponse, EmptyResponse,
    HeartRateResponse, HrvResponse, OxygenSaturationResponse, PermissionsRequest,
    PermissionsResponse, RangeRequest, SleepResponse, StepsRequest, StepsResponse,
    WorkoutsRequest,
};

use health_bridge_core::constants::{methods, metric_names};
use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::models::{
    AggregatedSample, AggregatedSampleWithMetadata, HeartRateSeriesSample, HrvSample,
    OxygenSaturationSample, SleepRecord, SleepStage,
};
use health_bridge_core::permissions::LogicalPermission;
use health_bridge_core::time::duration_minutes_ceil;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::bucketing::TimeBucketer;
use crate::catalog::PermissionCatalog;
use crate::composer::{WorkoutBatch, WorkoutComposer};
use crate::config::BridgeConfig;
use crate::gate::PermissionGate;
use crate::metrics::MetricResolver;
use crate::store::{
    Availability, HealthStore, NativeQuantity, NativeRecord, RecordPayload, SettingsTarget,
    StoreHandle,
};

/// Unified health query interface over one native store
pub struct HealthBridge {
    handle: StoreHandle,
    config: BridgeConfig,
}

impl HealthBridge {
    /// Bridge over a lazily connected store handle
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when `config` has zero limits
    pub fn new(handle: StoreHandle, config: BridgeConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { handle, config })
    }

    /// Bridge over an already constructed store
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when `config` has zero limits
    pub fn with_store(store: Arc<dyn HealthStore>, config: BridgeConfig) -> AppResult<Self> {
        Self::new(StoreHandle::from_store(store), config)
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Shared store handle
    #[must_use]
    pub const fn handle(&self) -> &StoreHandle {
        &self.handle
    }

    /// `isHealthAvailable`
    ///
    /// Never fails; an unusable store is reported as `available: false`.
    pub async fn is_health_available(&self) -> AvailabilityResponse {
        let availability = self
            .handle
            .availability()
            .instrument(info_span!("bridge_call", method = methods::IS_HEALTH_AVAILABLE))
            .await;
        AvailabilityResponse {
            available: availability == Availability::Available,
        }
    }

    /// `checkHealthPermissions`
    ///
    /// Unknown names are ignored and do not appear in the response.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` without a permission list and
    /// `ADAPTER_FAILURE` when the store is missing or fails
    pub async fn check_health_permissions(
        &self,
        request: &PermissionsRequest,
    ) -> AppResult<PermissionsResponse> {
        traced(
            methods::CHECK_HEALTH_PERMISSIONS,
            self.check_permissions(request),
        )
        .await
    }

    /// `requestHealthPermissions`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` without a permission list and
    /// `ADAPTER_FAILURE` when the store is missing or fails
    pub async fn request_health_permissions(
        &self,
        request: &PermissionsRequest,
    ) -> AppResult<PermissionsResponse> {
        traced(
            methods::REQUEST_HEALTH_PERMISSIONS,
            self.request_permissions(request),
        )
        .await
    }

    /// `queryAggregated`
    ///
    /// Ungranted metrics yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT`, `UNSUPPORTED_METRIC` or `UNSUPPORTED_BUCKET`
    /// for bad requests and `ADAPTER_FAILURE` when the aggregation fails
    pub async fn query_aggregated(
        &self,
        request: &AggregatedRequest,
    ) -> AppResult<AggregatedResponse> {
        traced(methods::QUERY_AGGREGATED, self.aggregated(request))
            .await
    }

    /// `queryWorkouts`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for bad dates, `PERMISSION_DENIED` without
    /// the workouts permission and `ADAPTER_FAILURE` when the session list
    /// cannot be read. Sub-query failures land in the batch's `errors` map.
    pub async fn query_workouts(&self, request: &WorkoutsRequest) -> AppResult<WorkoutBatch> {
        traced(methods::QUERY_WORKOUTS, self.workouts(request))
            .await
    }

    /// `queryHeartRate`
    ///
    /// Series records with one sample keep the record id and interval;
    /// multi-sample series are flattened into `<id>-<index>` instants.
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` ("Heart rate permission not granted")
    /// before any read when heart rate is not granted
    pub async fn query_heart_rate(&self, request: &RangeRequest) -> AppResult<HeartRateResponse> {
        traced(methods::QUERY_HEART_RATE, self.heart_rate(request))
            .await
    }

    /// `queryHRV`
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` ("HRV permission not granted") before any
    /// read when HRV is not granted
    pub async fn query_hrv(&self, request: &RangeRequest) -> AppResult<HrvResponse> {
        traced(methods::QUERY_HRV, self.hrv(request)).await
    }

    /// `queryOxygenSaturation`
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` ("Oxygen saturation permission not
    /// granted") before any read when oxygen saturation is not granted
    pub async fn query_oxygen_saturation(
        &self,
        request: &RangeRequest,
    ) -> AppResult<OxygenSaturationResponse> {
        traced(
            methods::QUERY_OXYGEN_SATURATION,
            self.oxygen_saturation(request),
        )
        .await
    }

    /// `querySleep`
    ///
    /// One entry per stage segment; sessions without stages yield nothing.
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` ("Sleep permission not granted") before any
    /// read when sleep is not granted
    pub async fn query_sleep(&self, request: &RangeRequest) -> AppResult<SleepResponse> {
        traced(methods::QUERY_SLEEP, self.sleep(request)).await
    }

    /// `querySteps`
    ///
    /// Bucketed with source metadata when `bucket` is given, raw step samples
    /// otherwise. Ungranted steps yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` or `UNSUPPORTED_BUCKET` for bad requests and
    /// `ADAPTER_FAILURE` when the store read fails
    pub async fn query_steps(&self, request: &StepsRequest) -> AppResult<StepsResponse> {
        traced(methods::QUERY_STEPS, self.steps(request)).await
    }

    /// `openHealthConnectSettings`
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot open the screen, e.g. on
    /// a platform without Health Connect
    pub async fn open_health_connect_settings(&self) -> AppResult<EmptyResponse> {
        traced(
            methods::OPEN_HEALTH_CONNECT_SETTINGS,
            self.open_settings(SettingsTarget::HealthConnectSettings),
        )
        .await
    }

    /// `openAppleHealthSettings`
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot open the settings screen
    pub async fn open_apple_health_settings(&self) -> AppResult<EmptyResponse> {
        traced(
            methods::OPEN_APPLE_HEALTH_SETTINGS,
            self.open_settings(SettingsTarget::AppleHealthSettings),
        )
        .await
    }

    /// `showHealthConnectInPlayStore`
    ///
    /// Works while Health Connect itself is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot open the store listing
    pub async fn show_health_connect_in_play_store(&self) -> AppResult<EmptyResponse> {
        traced(
            methods::SHOW_HEALTH_CONNECT_IN_PLAY_STORE,
            self.open_settings(SettingsTarget::HealthConnectPlayStore),
        )
        .await
    }

    /// Route a command by name with JSON parameters
    ///
    /// `null` parameters are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGUMENT` for unknown methods or parameters that do not
    /// deserialize, otherwise whatever the command returns
    pub async fn dispatch(&self, method: &str, params: Value) -> AppResult<Value> {
        debug!(method, "Dispatching bridge command");
        match method {
            methods::IS_HEALTH_AVAILABLE => respond(&self.is_health_available().await),
            methods::CHECK_HEALTH_PERMISSIONS => {
                respond(&self.check_health_permissions(&parse_params(method, params)?).await?)
            }
            methods::REQUEST_HEALTH_PERMISSIONS => {
                respond(&self.request_health_permissions(&parse_params(method, params)?).await?)
            }
            methods::QUERY_AGGREGATED => {
                respond(&self.query_aggregated(&parse_params(method, params)?).await?)
            }
            methods::QUERY_WORKOUTS => {
                respond(&self.query_workouts(&parse_params(method, params)?).await?)
            }
            methods::QUERY_HEART_RATE => {
                respond(&self.query_heart_rate(&parse_params(method, params)?).await?)
            }
            methods::QUERY_HRV => respond(&self.query_hrv(&parse_params(method, params)?).await?),
            methods::QUERY_OXYGEN_SATURATION => {
                respond(&self.query_oxygen_saturation(&parse_params(method, params)?).await?)
            }
            methods::QUERY_SLEEP => {
                respond(&self.query_sleep(&parse_params(method, params)?).await?)
            }
            methods::QUERY_STEPS => {
                respond(&self.query_steps(&parse_params(method, params)?).await?)
            }
            methods::OPEN_HEALTH_CONNECT_SETTINGS => {
                respond(&self.open_health_connect_settings().await?)
            }
            methods::OPEN_APPLE_HEALTH_SETTINGS => {
                respond(&self.open_apple_health_settings().await?)
            }
            methods::SHOW_HEALTH_CONNECT_IN_PLAY_STORE => {
                respond(&self.show_health_connect_in_play_store().await?)
            }
            other => Err(AppError::invalid_argument(format!("Unknown method: {other}"))),
        }
    }

    async fn gated_store(&self) -> AppResult<(Arc<dyn HealthStore>, PermissionGate)> {
        let store = self.handle.store().await?;
        let gate = PermissionGate::load(store.as_ref()).await?;
        Ok((store, gate))
    }

    async fn check_permissions(
        &self,
        request: &PermissionsRequest,
    ) -> AppResult<PermissionsResponse> {
        let names = request.names("check")?;
        let (_, gate) = self.gated_store().await?;

        let parsed = gate.catalog().resolve(names);
        if !parsed.unrecognized.is_empty() {
            debug!(ignored = ?parsed.unrecognized, "Ignoring unknown permission names");
        }

        Ok(PermissionsResponse {
            permissions: gate
                .catalog()
                .grant_report(&parsed.recognized, gate.snapshot().identifiers()),
        })
    }

    async fn request_permissions(
        &self,
        request: &PermissionsRequest,
    ) -> AppResult<PermissionsResponse> {
        let names = request.names("request")?;
        let store = self.handle.store().await?;
        let catalog = PermissionCatalog::for_platform(store.platform());

        let parsed = catalog.resolve(names);
        if !parsed.unrecognized.is_empty() {
            debug!(ignored = ?parsed.unrecognized, "Ignoring unknown permission names");
        }

        let capabilities = catalog.capabilities_for_request(&parsed.recognized);
        let granted = if capabilities.is_empty() {
            store.granted_capabilities().await?
        } else {
            store.request_capabilities(&capabilities).await?
        };

        Ok(PermissionsResponse {
            permissions: catalog.grant_report(&parsed.recognized, &granted),
        })
    }

    async fn aggregated(&self, request: &AggregatedRequest) -> AppResult<AggregatedResponse> {
        let query = request.validate()?;
        let is_mindfulness = query.data_type == metric_names::MINDFULNESS;
        let is_metric = MetricResolver::NAMES.contains(&query.data_type.as_str());
        if !is_mindfulness && !is_metric {
            return Err(AppError::unsupported_metric(&query.data_type));
        }

        let (store, gate) = self.gated_store().await?;
        let bucketer = TimeBucketer::new(store.as_ref(), &gate, &self.config);

        let buckets = if is_mindfulness {
            bucketer
                .aggregate_durations(LogicalPermission::Mindfulness, &query.range, query.bucket)
                .await?
        } else {
            let metric = MetricResolver::for_platform(store.platform()).resolve(&query.data_type)?;
            bucketer
                .aggregate(&metric, &query.range, query.bucket, false)
                .await?
        };

        Ok(AggregatedResponse {
            aggregated_data: buckets
                .into_iter()
                .map(AggregatedSampleWithMetadata::into_sample)
                .collect(),
        })
    }

    async fn workouts(&self, request: &WorkoutsRequest) -> AppResult<WorkoutBatch> {
        let range = request.range()?;
        let (store, gate) = self.gated_store().await?;
        WorkoutComposer::new(store.as_ref(), &gate, &self.config)
            .compose(&range, request.options())
            .await
    }

    /// Records of every granted capability behind `permission`, rejecting ungranted calls
    async fn direct_read(
        &self,
        request: &RangeRequest,
        permission: LogicalPermission,
    ) -> AppResult<(Arc<dyn HealthStore>, Vec<NativeRecord>)> {
        let range = request.range()?;
        let (store, gate) = self.gated_store().await?;
        gate.require(permission)?;

        let mut records = Vec::new();
        for capability in gate.readable_capabilities(permission) {
            records.extend(store.read_records(capability, &range, None).await?);
        }
        Ok((store, records))
    }

    async fn heart_rate(&self, request: &RangeRequest) -> AppResult<HeartRateResponse> {
        let (_, records) = self
            .direct_read(request, LogicalPermission::HeartRate)
            .await?;

        let mut heart_rate_records: Vec<HeartRateSeriesSample> =
            records.iter().flat_map(flatten_heart_rate).collect();
        heart_rate_records.sort_by_key(|sample| sample.start_time);
        Ok(HeartRateResponse { heart_rate_records })
    }

    async fn hrv(&self, request: &RangeRequest) -> AppResult<HrvResponse> {
        let (store, records) = self.direct_read(request, LogicalPermission::Hrv).await?;
        let hrv_type = store.platform().hrv_type();

        let hrv_records = records
            .into_iter()
            .filter_map(|record| match record.payload {
                RecordPayload::Hrv { millis } => Some(HrvSample {
                    id: record.id,
                    timestamp: record.start,
                    hrv_value: millis,
                    hrv_type,
                    metadata: record.metadata,
                }),
                _ => None,
            })
            .collect();
        Ok(HrvResponse { hrv_records })
    }

    async fn oxygen_saturation(
        &self,
        request: &RangeRequest,
    ) -> AppResult<OxygenSaturationResponse> {
        let (_, records) = self
            .direct_read(request, LogicalPermission::OxygenSaturation)
            .await?;

        let oxygen_saturation_records = records
            .into_iter()
            .filter_map(|record| match record.payload {
                RecordPayload::OxygenSaturation { percentage } => {
                    Some(OxygenSaturationSample {
                        id: record.id,
                        timestamp: record.start,
                        percentage,
                        metadata: record.metadata,
                    })
                }
                _ => None,
            })
            .collect();
        Ok(OxygenSaturationResponse {
            oxygen_saturation_records,
        })
    }

    async fn sleep(&self, request: &RangeRequest) -> AppResult<SleepResponse> {
        let (store, records) = self.direct_read(request, LogicalPermission::Sleep).await?;
        let platform = store.platform();

        let mut sleep = Vec::new();
        for record in &records {
            let RecordPayload::SleepSession { stages } = &record.payload else {
                continue;
            };
            sleep.extend(stages.iter().enumerate().map(|(index, stage)| SleepRecord {
                id: format!("{}-{index}", record.id),
                session_id: record.id.clone(),
                start_date: stage.start,
                end_date: stage.end,
                duration: duration_minutes_ceil(stage.start, stage.end),
                sleep_stage: SleepStage::from_native(platform, stage.stage),
                metadata: record.metadata.clone(),
            }));
        }
        Ok(SleepResponse { sleep })
    }

    async fn steps(&self, request: &StepsRequest) -> AppResult<StepsResponse> {
        let (range, bucket) = request.validate()?;
        let (store, gate) = self.gated_store().await?;
        let metric = MetricResolver::for_platform(store.platform()).resolve(metric_names::STEPS)?;

        if let Some(period) = bucket {
            let aggregated_data = TimeBucketer::new(store.as_ref(), &gate, &self.config)
                .aggregate(&metric, &range, period, true)
                .await?;
            return Ok(StepsResponse { aggregated_data });
        }

        let Some(native) = gate.readable_metric(&metric) else {
            return Ok(StepsResponse {
                aggregated_data: Vec::new(),
            });
        };

        let mut aggregated_data = Vec::new();
        for source in native.sources {
            for record in store.read_records(source, &range, None).await? {
                let RecordPayload::Quantity { value, unit } = record.payload else {
                    continue;
                };
                aggregated_data.push(AggregatedSampleWithMetadata::from_sample(
                    AggregatedSample {
                        start_date: record.start,
                        end_date: record.end,
                        value: metric.convert(Some(NativeQuantity::new(value, unit))),
                    },
                    record.metadata,
                ));
            }
        }
        aggregated_data.sort_by_key(|sample| sample.start_date);
        Ok(StepsResponse { aggregated_data })
    }

    async fn open_settings(&self, target: SettingsTarget) -> AppResult<EmptyResponse> {
        let store = self.handle.any_store().await?;
        store
            .open_settings(target)
            .await
            .map_err(|e| AppError::adapter_failure(e.to_string()).with_source(e))?;
        Ok(EmptyResponse {})
    }
}

/// Run `call` inside a request span and tag its error with the request id
async fn traced<T, F>(method: &'static str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("bridge_call", method, request_id = %request_id);

    async move {
        match call.await {
            Ok(response) => {
                debug!("Bridge call completed");
                Ok(response)
            }
            Err(e) => {
                warn!(code = ?e.code, error = %e.message, "Bridge call rejected");
                Err(e.with_request_id(request_id))
            }
        }
    }
    .instrument(span)
    .await
}

/// Flatten one series record into samples
fn flatten_heart_rate(record: &NativeRecord) -> Vec<HeartRateSeriesSample> {
    let RecordPayload::HeartRateSeries { samples } = &record.payload else {
        return Vec::new();
    };

    if let [only] = samples.as_slice() {
        return vec![HeartRateSeriesSample {
            id: record.id.clone(),
            start_time: record.start,
            end_time: record.end,
            bpm: only.bpm,
            metadata: record.metadata.clone(),
        }];
    }

    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| HeartRateSeriesSample {
            id: format!("{}-{index}", record.id),
            start_time: sample.time,
            end_time: sample.time,
            bpm: sample.bpm,
            metadata: record.metadata.clone(),
        })
        .collect()
}

fn parse_params<T>(method: &str, params: Value) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| {
        AppError::invalid_argument(format!("Invalid parameters for {method}: {e}")).with_source(e)
    })
}

fn respond<T: Serialize>(response: &T) -> AppResult<Value> {
    Ok(serde_json::to_value(response)?)
}
