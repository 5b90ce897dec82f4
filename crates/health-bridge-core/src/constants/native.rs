// ABOUTME: Native capability and aggregate metric identifiers for each health store
// ABOUTME: Health Connect permission strings and HealthKit type identifiers used by the catalog
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Health Connect (Android) permission strings and aggregate metric names
pub mod health_connect {
    /// Steps records
    pub const READ_STEPS: &str = "android.permission.health.READ_STEPS";
    /// Exercise sessions
    pub const READ_EXERCISE: &str = "android.permission.health.READ_EXERCISE";
    /// Exercise routes
    pub const READ_EXERCISE_ROUTE: &str = "android.permission.health.READ_EXERCISE_ROUTE";
    /// Heart rate series
    pub const READ_HEART_RATE: &str = "android.permission.health.READ_HEART_RATE";
    /// Heart rate variability (RMSSD)
    pub const READ_HEART_RATE_VARIABILITY: &str =
        "android.permission.health.READ_HEART_RATE_VARIABILITY";
    /// Active calories
    pub const READ_ACTIVE_CALORIES_BURNED: &str =
        "android.permission.health.READ_ACTIVE_CALORIES_BURNED";
    /// Total calories
    pub const READ_TOTAL_CALORIES_BURNED: &str =
        "android.permission.health.READ_TOTAL_CALORIES_BURNED";
    /// Distance
    pub const READ_DISTANCE: &str = "android.permission.health.READ_DISTANCE";
    /// Sleep sessions
    pub const READ_SLEEP: &str = "android.permission.health.READ_SLEEP";
    /// Blood oxygen
    pub const READ_OXYGEN_SATURATION: &str = "android.permission.health.READ_OXYGEN_SATURATION";
    /// Mindfulness sessions
    pub const READ_MINDFULNESS: &str = "android.permission.health.READ_MINDFULNESS";

    /// `StepsRecord.COUNT_TOTAL`
    pub const METRIC_STEPS_COUNT_TOTAL: &str = "Steps.COUNT_TOTAL";
    /// `ActiveCaloriesBurnedRecord.ACTIVE_CALORIES_TOTAL`
    pub const METRIC_ACTIVE_CALORIES_TOTAL: &str = "ActiveCaloriesBurned.ACTIVE_CALORIES_TOTAL";
    /// `TotalCaloriesBurnedRecord.ENERGY_TOTAL`
    pub const METRIC_TOTAL_CALORIES_TOTAL: &str = "TotalCaloriesBurned.ENERGY_TOTAL";
    /// `DistanceRecord.DISTANCE_TOTAL`
    pub const METRIC_DISTANCE_TOTAL: &str = "Distance.DISTANCE_TOTAL";
}

/// HealthKit (iOS) object type identifiers
pub mod health_kit {
    /// Step count quantity type
    pub const STEP_COUNT: &str = "HKQuantityTypeIdentifierStepCount";
    /// Workout sample type
    pub const WORKOUT: &str = "HKWorkoutTypeIdentifier";
    /// Workout route series type
    pub const WORKOUT_ROUTE: &str = "HKWorkoutRouteTypeIdentifier";
    /// Heart rate quantity type
    pub const HEART_RATE: &str = "HKQuantityTypeIdentifierHeartRate";
    /// Heart rate variability (SDNN) quantity type
    pub const HEART_RATE_VARIABILITY_SDNN: &str =
        "HKQuantityTypeIdentifierHeartRateVariabilitySDNN";
    /// Active energy quantity type
    pub const ACTIVE_ENERGY_BURNED: &str = "HKQuantityTypeIdentifierActiveEnergyBurned";
    /// Basal energy quantity type
    pub const BASAL_ENERGY_BURNED: &str = "HKQuantityTypeIdentifierBasalEnergyBurned";
    /// Cycling distance quantity type
    pub const DISTANCE_CYCLING: &str = "HKQuantityTypeIdentifierDistanceCycling";
    /// Swimming distance quantity type
    pub const DISTANCE_SWIMMING: &str = "HKQuantityTypeIdentifierDistanceSwimming";
    /// Walking and running distance quantity type
    pub const DISTANCE_WALKING_RUNNING: &str = "HKQuantityTypeIdentifierDistanceWalkingRunning";
    /// Downhill snow sports distance quantity type
    pub const DISTANCE_DOWNHILL_SNOW_SPORTS: &str =
        "HKQuantityTypeIdentifierDistanceDownhillSnowSports";
    /// Sleep analysis category type
    pub const SLEEP_ANALYSIS: &str = "HKCategoryTypeIdentifierSleepAnalysis";
    /// Blood oxygen quantity type
    pub const OXYGEN_SATURATION: &str = "HKQuantityTypeIdentifierOxygenSaturation";
    /// Mindful session category type
    pub const MINDFUL_SESSION: &str = "HKCategoryTypeIdentifierMindfulSession";

    /// Cumulative sum over step count
    pub const METRIC_STEP_COUNT_SUM: &str = "HKStatistics.cumulativeSum.stepCount";
    /// Cumulative sum over active energy
    pub const METRIC_ACTIVE_ENERGY_SUM: &str = "HKStatistics.cumulativeSum.activeEnergyBurned";
    /// Cumulative sum over active and basal energy
    pub const METRIC_TOTAL_ENERGY_SUM: &str = "HKStatistics.cumulativeSum.totalEnergyBurned";
    /// Cumulative sum over every distance type
    pub const METRIC_DISTANCE_SUM: &str = "HKStatistics.cumulativeSum.distance";
}
