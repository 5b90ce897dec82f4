// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Limits, wire method names, sub-query keys and native identifiers for the health bridge
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped by domain. Native capability and metric identifiers
//! live in [`native`], split per platform.

/// Native capability and metric identifiers per platform
pub mod native;

/// Default limits
pub mod limits {
    /// Upper bound on exercise sessions read per workout query
    pub const DEFAULT_MAX_WORKOUT_SESSIONS: usize = 1000;
    /// Number of workouts composed concurrently
    pub const DEFAULT_WORKOUT_CONCURRENCY: usize = 4;
    /// Whether null-valued buckets are kept in aggregated responses
    pub const DEFAULT_INCLUDE_EMPTY_BUCKETS: bool = true;
    /// Upper bound on slices in one bucketed aggregation (about 5.7 years of hours)
    pub const MAX_BUCKET_SLICES: usize = 50_000;
}

/// Environment variable names read by the configuration layer
pub mod env_config {
    /// Maximum sessions per workout query
    pub const MAX_WORKOUT_SESSIONS: &str = "HEALTH_BRIDGE_MAX_WORKOUT_SESSIONS";
    /// Workout composition concurrency
    pub const WORKOUT_CONCURRENCY: &str = "HEALTH_BRIDGE_WORKOUT_CONCURRENCY";
    /// Keep null-valued buckets
    pub const INCLUDE_EMPTY_BUCKETS: &str = "HEALTH_BRIDGE_INCLUDE_EMPTY_BUCKETS";
}

/// Service identification for logs
pub mod service_names {
    /// Service name reported in structured logs
    pub const HEALTH_BRIDGE: &str = "health-bridge";
}

/// Host-facing command names
pub mod methods {
    /// Store availability check
    pub const IS_HEALTH_AVAILABLE: &str = "isHealthAvailable";
    /// Permission status check
    pub const CHECK_HEALTH_PERMISSIONS: &str = "checkHealthPermissions";
    /// Permission prompt
    pub const REQUEST_HEALTH_PERMISSIONS: &str = "requestHealthPermissions";
    /// Bucketed aggregate query
    pub const QUERY_AGGREGATED: &str = "queryAggregated";
    /// Composite workout query
    pub const QUERY_WORKOUTS: &str = "queryWorkouts";
    /// Heart rate series query
    pub const QUERY_HEART_RATE: &str = "queryHeartRate";
    /// Heart rate variability query
    pub const QUERY_HRV: &str = "queryHRV";
    /// Blood oxygen query
    pub const QUERY_OXYGEN_SATURATION: &str = "queryOxygenSaturation";
    /// Sleep stage query
    pub const QUERY_SLEEP: &str = "querySleep";
    /// Steps query with source metadata
    pub const QUERY_STEPS: &str = "querySteps";
    /// Health Connect settings deep link
    pub const OPEN_HEALTH_CONNECT_SETTINGS: &str = "openHealthConnectSettings";
    /// Apple Health settings deep link
    pub const OPEN_APPLE_HEALTH_SETTINGS: &str = "openAppleHealthSettings";
    /// Health Connect store listing
    pub const SHOW_HEALTH_CONNECT_IN_PLAY_STORE: &str = "showHealthConnectInPlayStore";

    /// Every command the dispatcher routes
    pub const ALL: &[&str] = &[
        IS_HEALTH_AVAILABLE,
        CHECK_HEALTH_PERMISSIONS,
        REQUEST_HEALTH_PERMISSIONS,
        QUERY_AGGREGATED,
        QUERY_WORKOUTS,
        QUERY_HEART_RATE,
        QUERY_HRV,
        QUERY_OXYGEN_SATURATION,
        QUERY_SLEEP,
        QUERY_STEPS,
        OPEN_HEALTH_CONNECT_SETTINGS,
        OPEN_APPLE_HEALTH_SETTINGS,
        SHOW_HEALTH_CONNECT_IN_PLAY_STORE,
    ];
}

/// Workout sub-query names used as error-map key suffixes
pub mod subqueries {
    /// Total or active calories
    pub const CALORIES: &str = "calories";
    /// Distance aggregate
    pub const DISTANCE: &str = "distance";
    /// Steps aggregate
    pub const STEPS: &str = "steps";
    /// Heart rate samples
    pub const HEART_RATE: &str = "heart-rate";
    /// GPS route
    pub const ROUTE: &str = "route";
}

/// Logical metric names accepted by aggregate queries
pub mod metric_names {
    /// Step count
    pub const STEPS: &str = "steps";
    /// Active energy burned
    pub const ACTIVE_CALORIES: &str = "active-calories";
    /// Total energy burned
    pub const TOTAL_CALORIES: &str = "total-calories";
    /// Distance covered
    pub const DISTANCE: &str = "distance";
    /// Mindfulness session seconds (duration aggregate, not a quantity metric)
    pub const MINDFULNESS: &str = "mindfulness";
}
