// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Scoring tiers, performance description bands, and tracking limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain. The scoring tiers are fixed tables: the
//! banding is part of the observable scoring contract and is not configurable.

/// Service identification for structured logging
pub mod service_names {
    /// Default service name
    pub const WORKOUT_TRACKER: &str = "workout-tracker";
}

/// Score bounds and fixed scores of the performance algorithm
pub mod scoring {
    /// Lowest possible score
    pub const MIN_SCORE: f64 = 0.0;
    /// Highest possible score
    pub const MAX_SCORE: f64 = 100.0;
    /// Score of an exercise with no recorded sets
    pub const EMPTY_EXERCISE_SCORE: f64 = 0.0;
    /// Base score when no set yields a measurable value
    pub const UNMEASURABLE_SCORE: f64 = 50.0;
    /// Reward for the first recorded attempt of an exercise
    pub const FIRST_ATTEMPT_SCORE: f64 = 75.0;
    /// Flat bonus when every exercise of a session has at least one set
    pub const COMPLETION_BONUS: f64 = 5.0;
    /// Number of most recent historical values forming the consistency reference
    pub const RECENT_WINDOW: usize = 5;

    /// Weight of the improvement sub-score
    pub const IMPROVEMENT_WEIGHT: f64 = 0.4;
    /// Weight of the consistency sub-score
    pub const CONSISTENCY_WEIGHT: f64 = 0.3;
    /// Weight of the volume sub-score
    pub const VOLUME_WEIGHT: f64 = 0.3;
}

/// Tier tables: `(minimum ratio, score)` pairs checked top-down, then a floor formula
pub mod tiers {
    /// Ratio against the personal best
    pub const IMPROVEMENT: [(f64, f64); 6] = [
        (1.00, 100.0),
        (0.95, 90.0),
        (0.90, 80.0),
        (0.85, 70.0),
        (0.80, 60.0),
        (0.70, 50.0),
    ];
    /// Floor and ratio multiplier below the lowest improvement tier
    pub const IMPROVEMENT_FLOOR: (f64, f64) = (20.0, 50.0);

    /// Ratio against the recent average
    pub const CONSISTENCY: [(f64, f64); 5] = [
        (1.10, 100.0),
        (1.05, 85.0),
        (0.95, 75.0),
        (0.90, 65.0),
        (0.85, 55.0),
    ];
    /// Floor and ratio multiplier below the lowest consistency tier
    pub const CONSISTENCY_FLOOR: (f64, f64) = (30.0, 50.0);

    /// Ratio against the overall average
    pub const VOLUME: [(f64, f64); 5] = [
        (1.20, 100.0),
        (1.10, 90.0),
        (1.00, 80.0),
        (0.90, 70.0),
        (0.80, 60.0),
    ];
    /// Floor and ratio multiplier below the lowest volume tier
    pub const VOLUME_FLOOR: (f64, f64) = (40.0, 60.0);
}

/// Presentational labels for score bands
pub mod descriptions {
    /// `(minimum score, label)` pairs checked top-down
    pub const BANDS: [(f64, &str); 7] = [
        (95.0, "Personal Record"),
        (85.0, "Excellent"),
        (75.0, "Great"),
        (65.0, "Good"),
        (55.0, "Solid"),
        (45.0, "Improving"),
        (35.0, "On Track"),
    ];
    /// Label below the lowest band
    pub const FALLBACK: &str = "Keep Going";
}

/// Query limits
pub mod limits {
    /// Default number of recent sessions returned
    pub const DEFAULT_RECENT_SESSIONS: u32 = 20;
    /// Default number of metric history entries returned
    pub const DEFAULT_METRIC_HISTORY: u32 = 50;
    /// Hard cap on list queries
    pub const MAX_LIST_LIMIT: u32 = 500;
}
