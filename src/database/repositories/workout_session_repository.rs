// ABOUTME: Workout session repository implementation backed by SQLite
// ABOUTME: Wraps the session manager with cooperative cancellation and paired planned-workout saves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{cancellable_read, ensure_not_cancelled, WorkoutSessionRepository};
use crate::database::{Database, WorkoutSessionManager};
use crate::errors::DatabaseError;
use crate::models::{PlannedWorkout, WorkoutSession, WorkoutSessionExercise};

/// `SQLite` implementation of `WorkoutSessionRepository`
pub struct WorkoutSessionRepositoryImpl {
    db: Database,
}

impl WorkoutSessionRepositoryImpl {
    /// Create a new `WorkoutSessionRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn manager(&self) -> WorkoutSessionManager {
        WorkoutSessionManager::new(self.db.pool().clone())
    }
}

#[async_trait]
impl WorkoutSessionRepository for WorkoutSessionRepositoryImpl {
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError> {
        cancellable_read(cancel, self.manager().get_by_id(id)).await
    }

    async fn get_active_session_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError> {
        cancellable_read(cancel, self.manager().get_active_for_user(user_id)).await
    }

    async fn get_history_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSessionExercise>, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.get_history_for_exercise(user_id, exercise_id)).await
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSession>, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.list_for_user(user_id, limit)).await
    }

    async fn add(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().insert(session).await
    }

    async fn update(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().update(session).await
    }

    async fn add_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().insert_with_planned(session, planned).await
    }

    async fn update_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().update_with_planned(session, planned).await
    }
}
