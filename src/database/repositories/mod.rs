// ABOUTME: Repository trait definitions for workout tracking storage
// ABOUTME: Narrow per-aggregate contracts with cooperative cancellation on every call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::DatabaseError;
use crate::models::{
    PlannedWorkout, UserMetric, UserMetricType, WorkoutSession, WorkoutSessionExercise,
};

// Repository implementations
/// Planned workout repository implementation
pub mod planned_workout_repository;
/// User metric repository implementation
pub mod user_metric_repository;
/// Workout session repository implementation
pub mod workout_session_repository;

// Re-export implementations
pub use planned_workout_repository::PlannedWorkoutRepositoryImpl;
pub use user_metric_repository::UserMetricRepositoryImpl;
pub use workout_session_repository::WorkoutSessionRepositoryImpl;

/// Workout session aggregate storage
///
/// A session is always loaded and saved whole, exercises and sets included.
#[async_trait]
pub trait WorkoutSessionRepository: Send + Sync {
    /// Get a session by ID
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError>;

    /// Get the user's in-progress session, if any
    async fn get_active_session_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError>;

    /// Prior performances of an exercise from the user's completed sessions, oldest first
    async fn get_history_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSessionExercise>, DatabaseError>;

    /// Most recent sessions of a user, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSession>, DatabaseError>;

    /// Persist a new session
    async fn add(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;

    /// Persist changes to an existing session
    ///
    /// Fails with `StaleVersion` when the session was saved after it was loaded.
    async fn update(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;

    /// Persist a new session and the planned workout it starts in one transaction
    async fn add_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;

    /// Persist changes to a session and its linked planned workout in one transaction
    async fn update_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;
}

/// Planned workout storage
#[async_trait]
pub trait PlannedWorkoutRepository: Send + Sync {
    /// Get a planned workout by ID
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<PlannedWorkout>, DatabaseError>;

    /// Whether a non-cancelled schedule exists for the user, workout and date
    async fn has_planned_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, DatabaseError>;

    /// Planned workouts scheduled within `[from, to]`, earliest first
    async fn list_for_user_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlannedWorkout>, DatabaseError>;

    /// Persist a new planned workout
    async fn add(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;

    /// Persist changes to an existing planned workout
    ///
    /// Fails with `StaleVersion` when it was saved after it was loaded.
    async fn update(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;
}

/// User metric storage
#[async_trait]
pub trait UserMetricRepository: Send + Sync {
    /// Get a metric by ID
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<UserMetric>, DatabaseError>;

    /// Most recently recorded metric of a type
    async fn get_latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        cancel: &CancellationToken,
    ) -> Result<Option<UserMetric>, DatabaseError>;

    /// Metrics of a type, newest first
    async fn list_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserMetric>, DatabaseError>;

    /// Persist a new metric
    async fn add(&self, metric: &UserMetric, cancel: &CancellationToken)
        -> Result<(), DatabaseError>;

    /// Persist changes to an existing metric
    async fn update(
        &self,
        metric: &UserMetric,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError>;

    /// Remove a metric
    async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<(), DatabaseError>;
}

/// Race a read against cancellation; a cancelled read yields `Cancelled`
pub(crate) async fn cancellable_read<T, F>(
    cancel: &CancellationToken,
    query: F,
) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>> + Send,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DatabaseError::Cancelled),
        result = query => result,
    }
}

/// Writes observe cancellation only before they start, then run to completion
pub(crate) fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), DatabaseError> {
    if cancel.is_cancelled() {
        Err(DatabaseError::Cancelled)
    } else {
        Ok(())
    }
}
