// ABOUTME: Exercise and workout performance scoring against historical bests
// ABOUTME: Improvement, consistency and volume sub-scores combined into a 0-100 score
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Performance scoring engine
//!
//! Scores one exercise performance against prior performances of the same
//! exercise, and a whole session as the average of its exercise scores. The
//! service holds only its configuration and never touches storage: callers
//! supply history ordered oldest to newest.
#![allow(clippy::cast_precision_loss)] // Safe: history lengths are small

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::trace;
use uuid::Uuid;

use tracker_core::constants::descriptions::{BANDS, FALLBACK};
use tracker_core::constants::scoring::{EMPTY_EXERCISE_SCORE, MAX_SCORE, MIN_SCORE};
use tracker_core::constants::tiers::{
    CONSISTENCY, CONSISTENCY_FLOOR, IMPROVEMENT, IMPROVEMENT_FLOOR, VOLUME, VOLUME_FLOOR,
};
use tracker_core::models::{WorkoutSession, WorkoutSessionExercise};

use crate::config::{ConfigError, ScoringConfig};

/// Historical exercises keyed by exercise catalog id
pub type HistoryByExercise = HashMap<Uuid, Vec<WorkoutSessionExercise>>;

/// Stateless scoring service
#[derive(Debug, Clone, Default)]
pub struct PerformanceAnalysisService {
    config: ScoringConfig,
}

impl PerformanceAnalysisService {
    /// Create a service with the default scoring configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation
    pub fn with_config(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score `current` against prior performances of the same exercise
    ///
    /// History entries for other exercises, and entries with no measurable
    /// best, are ignored. The result is always within `[0, 100]`.
    #[must_use]
    pub fn calculate_performance_score(
        &self,
        current: &WorkoutSessionExercise,
        history: &[WorkoutSessionExercise],
    ) -> f64 {
        if !current.has_sets() {
            return EMPTY_EXERCISE_SCORE;
        }
        let Some(current_best) = current.get_best_performance() else {
            return self.config.unmeasurable_score;
        };

        let values: Vec<f64> = history
            .iter()
            .filter(|h| h.exercise_id == current.exercise_id)
            .filter_map(WorkoutSessionExercise::get_best_performance)
            .collect();
        if values.is_empty() {
            return self.config.first_attempt_score;
        }

        let personal_best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let recent = &values[values.len().saturating_sub(self.config.recent_window)..];
        let recent_average = mean(recent);
        let overall_average = mean(&values);

        let improvement = improvement_score(ratio(current_best, personal_best));
        let consistency = consistency_score(ratio(current_best, recent_average));
        let volume = volume_score(ratio(current_best, overall_average));

        let score = self.config.improvement_weight * improvement
            + self.config.consistency_weight * consistency
            + self.config.volume_weight * volume;
        trace!(
            exercise.id = %current.exercise_id,
            improvement,
            consistency,
            volume,
            score,
            "Scored exercise performance"
        );
        clamp_score(score)
    }

    /// Score every exercise of a session against its own history
    ///
    /// Scores come back in exercise order. Exercises with no history entry are
    /// scored as first attempts.
    #[must_use]
    pub fn score_exercises(
        &self,
        session: &WorkoutSession,
        history: &HistoryByExercise,
    ) -> Vec<(Uuid, f64)> {
        session
            .exercises()
            .par_iter()
            .map(|exercise| {
                let prior = history
                    .get(&exercise.exercise_id)
                    .map_or(&[][..], Vec::as_slice);
                (
                    exercise.exercise_id,
                    self.calculate_performance_score(exercise, prior),
                )
            })
            .collect()
    }

    /// Combine per-exercise scores into the session score
    ///
    /// Averages the scores, adds the completion bonus when every exercise has at
    /// least one set, and clamps to `[0, 100]`. A session with no exercises
    /// scores 0.
    #[must_use]
    pub fn combine_exercise_scores(&self, session: &WorkoutSession, scores: &[(Uuid, f64)]) -> f64 {
        if session.exercises().is_empty() || scores.is_empty() {
            return MIN_SCORE;
        }
        let total: f64 = scores.iter().map(|(_, score)| score).sum();
        let mut score = total / scores.len() as f64;
        if session.all_exercises_have_sets() {
            score += self.config.completion_bonus;
        }
        clamp_score(score)
    }

    /// Score a whole session against per-exercise history
    #[must_use]
    pub fn calculate_workout_score(
        &self,
        session: &WorkoutSession,
        history: &HistoryByExercise,
    ) -> f64 {
        let scores = self.score_exercises(session, history);
        self.combine_exercise_scores(session, &scores)
    }

    /// Presentational label for a score
    #[must_use]
    pub fn get_performance_description(score: f64) -> &'static str {
        BANDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map_or(FALLBACK, |(_, label)| *label)
    }
}

/// Sub-score against the personal best
#[must_use]
pub fn improvement_score(ratio: f64) -> f64 {
    tiered(ratio, &IMPROVEMENT, IMPROVEMENT_FLOOR)
}

/// Sub-score against the recent average
#[must_use]
pub fn consistency_score(ratio: f64) -> f64 {
    tiered(ratio, &CONSISTENCY, CONSISTENCY_FLOOR)
}

/// Sub-score against the overall average
#[must_use]
pub fn volume_score(ratio: f64) -> f64 {
    tiered(ratio, &VOLUME, VOLUME_FLOOR)
}

fn tiered(ratio: f64, tiers: &[(f64, f64)], (floor, multiplier): (f64, f64)) -> f64 {
    tiers
        .iter()
        .find(|(min_ratio, _)| ratio >= *min_ratio)
        .map_or_else(|| floor.max(ratio * multiplier), |(_, score)| *score)
}

/// `current / reference`; a non-positive reference counts as beaten by any positive value
fn ratio(current: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        current / reference
    } else if current > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}
