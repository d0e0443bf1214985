// ABOUTME: Domain aggregates for workout tracking
// ABOUTME: Re-exports sessions, planned workouts and user metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Three aggregates make up the tracking domain:
//!
//! - [`WorkoutSession`] owns its exercises and their sets and drives the session
//!   state machine.
//! - [`PlannedWorkout`] schedules a workout template on a calendar date and
//!   follows the session that executes it.
//! - [`UserMetric`] records a dated body measurement or personal record.
//!
//! Aggregates are plain data plus transition methods. Every method validates
//! before mutating, so a rejected call leaves the aggregate untouched.

/// Planned workout aggregate
pub mod planned_workout;
/// User metric aggregate
pub mod user_metric;
/// Workout session aggregate
pub mod workout_session;

pub use planned_workout::{PlannedWorkout, PlannedWorkoutRecord, PlannedWorkoutStatus};
pub use user_metric::{UserMetric, UserMetricType};
pub use workout_session::{
    ExerciseMetricType, PerceivedDifficulty, SessionStatus, SetParameters, WorkoutSession,
    WorkoutSessionExercise, WorkoutSessionRecord, WorkoutSessionSet,
};
