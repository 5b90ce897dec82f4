// ABOUTME: Composite workout record with embedded heart rate and route sequences
// ABOUTME: Native exercise and activity code tables mapped to stable workout type names
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::time::iso_millis;

use super::SourceMetadata;

/// Default workout type for unmapped Health Connect exercise codes
pub const HEALTH_CONNECT_DEFAULT_WORKOUT_TYPE: &str = "OTHER";
/// Default workout type for unmapped HealthKit activity codes
pub const HEALTH_KIT_DEFAULT_WORKOUT_TYPE: &str = "other";

/// Health Connect `ExerciseSessionRecord` exercise type codes
const HEALTH_CONNECT_EXERCISE_TYPES: &[(i64, &str)] = &[
    (0, "OTHER"),
    (2, "BADMINTON"),
    (4, "BASEBALL"),
    (5, "BASKETBALL"),
    (8, "BIKING"),
    (9, "BIKING_STATIONARY"),
    (10, "BOOT_CAMP"),
    (11, "BOXING"),
    (13, "CALISTHENICS"),
    (14, "CRICKET"),
    (16, "DANCING"),
    (25, "ELLIPTICAL"),
    (26, "EXERCISE_CLASS"),
    (27, "FENCING"),
    (28, "FOOTBALL_AMERICAN"),
    (29, "FOOTBALL_AUSTRALIAN"),
    (31, "FRISBEE_DISC"),
    (32, "GOLF"),
    (33, "GUIDED_BREATHING"),
    (34, "GYMNASTICS"),
    (35, "HANDBALL"),
    (36, "HIGH_INTENSITY_INTERVAL_TRAINING"),
    (37, "HIKING"),
    (38, "ICE_HOCKEY"),
    (39, "ICE_SKATING"),
    (44, "MARTIAL_ARTS"),
    (46, "PADDLING"),
    (47, "PARAGLIDING"),
    (48, "PILATES"),
    (50, "RACQUETBALL"),
    (51, "ROCK_CLIMBING"),
    (52, "ROLLER_HOCKEY"),
    (53, "ROWING"),
    (54, "ROWING_MACHINE"),
    (55, "RUGBY"),
    (56, "RUNNING"),
    (57, "RUNNING_TREADMILL"),
    (58, "SAILING"),
    (59, "SCUBA_DIVING"),
    (60, "SKATING"),
    (61, "SKIING"),
    (62, "SNOWBOARDING"),
    (63, "SNOWSHOEING"),
    (64, "SOCCER"),
    (65, "SOFTBALL"),
    (66, "SQUASH"),
    (68, "STAIR_CLIMBING"),
    (69, "STAIR_CLIMBING_MACHINE"),
    (70, "STRENGTH_TRAINING"),
    (71, "STRETCHING"),
    (72, "SURFING"),
    (73, "SWIMMING_OPEN_WATER"),
    (74, "SWIMMING_POOL"),
    (75, "TABLE_TENNIS"),
    (76, "TENNIS"),
    (78, "VOLLEYBALL"),
    (79, "WALKING"),
    (80, "WATER_POLO"),
    (81, "WEIGHTLIFTING"),
    (82, "WHEELCHAIR"),
    (83, "YOGA"),
];

/// HealthKit `HKWorkoutActivityType` raw values
const HEALTH_KIT_ACTIVITY_TYPES: &[(i64, &str)] = &[
    (1, "americanFootball"),
    (2, "archery"),
    (3, "australianFootball"),
    (4, "badminton"),
    (5, "baseball"),
    (6, "basketball"),
    (7, "bowling"),
    (8, "boxing"),
    (9, "climbing"),
    (10, "cricket"),
    (11, "crossTraining"),
    (12, "curling"),
    (13, "cycling"),
    (14, "dance"),
    (15, "danceInspiredTraining"),
    (16, "elliptical"),
    (17, "equestrianSports"),
    (18, "fencing"),
    (19, "fishing"),
    (20, "functionalStrengthTraining"),
    (21, "golf"),
    (22, "gymnastics"),
    (23, "handball"),
    (24, "hiking"),
    (25, "hockey"),
    (26, "hunting"),
    (27, "lacrosse"),
    (28, "martialArts"),
    (29, "mindAndBody"),
    (30, "mixedMetabolicCardioTraining"),
    (31, "paddleSports"),
    (32, "play"),
    (33, "preparationAndRecovery"),
    (34, "racquetball"),
    (35, "rowing"),
    (36, "rugby"),
    (37, "running"),
    (38, "sailing"),
    (39, "skatingSports"),
    (40, "snowSports"),
    (41, "soccer"),
    (42, "softball"),
    (43, "squash"),
    (44, "stairClimbing"),
    (45, "surfingSports"),
    (46, "swimming"),
    (47, "tableTennis"),
    (48, "tennis"),
    (49, "trackAndField"),
    (50, "traditionalStrengthTraining"),
    (51, "volleyball"),
    (52, "walking"),
    (53, "waterFitness"),
    (54, "waterPolo"),
    (55, "waterSports"),
    (56, "wrestling"),
    (57, "yoga"),
    (58, "barre"),
    (59, "coreTraining"),
    (60, "crossCountrySkiing"),
    (61, "downhillSkiing"),
    (62, "flexibility"),
    (63, "highIntensityIntervalTraining"),
    (64, "jumpRope"),
    (65, "kickboxing"),
    (66, "pilates"),
    (67, "snowboarding"),
    (68, "stairs"),
    (69, "stepTraining"),
    (70, "wheelchairWalkPace"),
    (71, "wheelchairRunPace"),
    (72, "taiChi"),
    (73, "mixedCardio"),
    (74, "handCycling"),
    (75, "discSports"),
    (76, "fitnessGaming"),
    (77, "cardioDance"),
    (78, "socialDance"),
    (79, "pickleball"),
    (80, "cooldown"),
    (82, "swimBikeRun"),
    (83, "transition"),
    (84, "underwaterDiving"),
    (3000, "other"),
];

/// Map a native workout code to its stable name
///
/// Unmapped codes fall back to `OTHER` (Health Connect) or `other` (HealthKit).
#[must_use]
pub fn workout_type_name(platform: Platform, code: i64) -> &'static str {
    let (table, default) = match platform {
        Platform::HealthConnect => (
            HEALTH_CONNECT_EXERCISE_TYPES,
            HEALTH_CONNECT_DEFAULT_WORKOUT_TYPE,
        ),
        Platform::HealthKit => (HEALTH_KIT_ACTIVITY_TYPES, HEALTH_KIT_DEFAULT_WORKOUT_TYPE),
    };

    table
        .binary_search_by_key(&code, |(native, _)| *native)
        .map_or(default, |index| table[index].1)
}

/// Heart rate reading embedded in a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Sample time
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Beats per minute
    pub bpm: f64,
}

/// GPS point embedded in a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSample {
    /// Fix time
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Altitude in meters, when recorded
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alt: Option<f64>,
}

/// Exercise session enriched by its correlated sub-queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    /// Session id
    pub id: String,
    /// Source metadata
    #[serde(flatten)]
    pub metadata: SourceMetadata,
    /// Session start
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    /// Session end
    #[serde(with = "iso_millis")]
    pub end_date: DateTime<Utc>,
    /// Mapped workout type
    pub workout_type: String,
    /// User-entered title
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Active seconds: summed segments, else the session span
    pub duration: i64,
    /// Kilocalories from total energy, else active energy
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calories: Option<f64>,
    /// Meters
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
    /// Step count
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub steps: Option<f64>,
    /// Heart rate samples inside the session window, ordered by time
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub heart_rate: Option<Vec<HeartRateSample>>,
    /// Route points, ordered by time
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub route: Option<Vec<RouteSample>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_sorted_for_binary_search() {
        for table in [HEALTH_CONNECT_EXERCISE_TYPES, HEALTH_KIT_ACTIVITY_TYPES] {
            assert!(table.windows(2).all(|pair| pair[0].0 < pair[1].0));
        }
    }

    #[test]
    fn test_known_codes_map_to_names() {
        assert_eq!(workout_type_name(Platform::HealthConnect, 56), "RUNNING");
        assert_eq!(workout_type_name(Platform::HealthConnect, 74), "SWIMMING_POOL");
        assert_eq!(workout_type_name(Platform::HealthKit, 37), "running");
        assert_eq!(workout_type_name(Platform::HealthKit, 63), "highIntensityIntervalTraining");
    }

    #[test]
    fn test_unmapped_code_falls_back_to_platform_default() {
        assert_eq!(workout_type_name(Platform::HealthConnect, 9999), "OTHER");
        assert_eq!(workout_type_name(Platform::HealthConnect, -1), "OTHER");
        assert_eq!(workout_type_name(Platform::HealthKit, 9999), "other");
        assert_eq!(workout_type_name(Platform::HealthKit, 81), "other");
    }
}
