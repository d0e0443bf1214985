// ABOUTME: Scoring configuration for exercise and workout performance analysis
// ABOUTME: Sub-score weights, recent window, completion bonus, and fixed fallback scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Scoring Configuration
//!
//! Only the weighting and the fallback scores are configurable. The tier
//! tables in `tracker_core::constants::tiers` are fixed.

use serde::{Deserialize, Serialize};
use tracker_core::constants::scoring::{
    COMPLETION_BONUS, CONSISTENCY_WEIGHT, FIRST_ATTEMPT_SCORE, IMPROVEMENT_WEIGHT, MAX_SCORE,
    MIN_SCORE, RECENT_WINDOW, UNMEASURABLE_SCORE, VOLUME_WEIGHT,
};

use super::ConfigError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights and fixed scores used by the performance analysis service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the improvement sub-score (vs. personal best)
    pub improvement_weight: f64,
    /// Weight of the consistency sub-score (vs. recent average)
    pub consistency_weight: f64,
    /// Weight of the volume sub-score (vs. overall average)
    pub volume_weight: f64,
    /// Number of most recent historical values averaged for consistency
    pub recent_window: usize,
    /// Flat bonus added when every exercise has at least one set
    pub completion_bonus: f64,
    /// Score of a first recorded attempt
    pub first_attempt_score: f64,
    /// Score when no set yields a measurable value
    pub unmeasurable_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            improvement_weight: IMPROVEMENT_WEIGHT,
            consistency_weight: CONSISTENCY_WEIGHT,
            volume_weight: VOLUME_WEIGHT,
            recent_window: RECENT_WINDOW,
            completion_bonus: COMPLETION_BONUS,
            first_attempt_score: FIRST_ATTEMPT_SCORE,
            unmeasurable_score: UNMEASURABLE_SCORE,
        }
    }
}

impl ScoringConfig {
    /// Check weights and score bounds
    ///
    /// # Errors
    ///
    /// - `InvalidWeights` when a weight is negative or the weights do not sum to 1.0
    /// - `ValueOutOfRange` when the window is zero or a score lies outside `[0, 100]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            self.improvement_weight,
            self.consistency_weight,
            self.volume_weight,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(ConfigError::InvalidWeights(
                "scoring weights must be finite and non-negative",
            ));
        }
        if (weights.iter().sum::<f64>() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights("scoring weights must sum to 1.0"));
        }
        if self.recent_window == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "recent_window must be at least 1",
            ));
        }

        let in_range = |score: f64| (MIN_SCORE..=MAX_SCORE).contains(&score);
        if !in_range(self.completion_bonus) {
            return Err(ConfigError::ValueOutOfRange(
                "completion_bonus must be within 0..=100",
            ));
        }
        if !in_range(self.first_attempt_score) || !in_range(self.unmeasurable_score) {
            return Err(ConfigError::ValueOutOfRange(
                "fallback scores must be within 0..=100",
            ));
        }
        Ok(())
    }
}
