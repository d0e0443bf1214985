// ABOUTME: Planned workout repository implementation backed by SQLite
// ABOUTME: Wraps the planned workout manager with cooperative cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{cancellable_read, ensure_not_cancelled, PlannedWorkoutRepository};
use crate::database::{Database, PlannedWorkoutManager};
use crate::errors::DatabaseError;
use crate::models::PlannedWorkout;

/// `SQLite` implementation of `PlannedWorkoutRepository`
pub struct PlannedWorkoutRepositoryImpl {
    db: Database,
}

impl PlannedWorkoutRepositoryImpl {
    /// Create a new `PlannedWorkoutRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn manager(&self) -> PlannedWorkoutManager {
        PlannedWorkoutManager::new(self.db.pool().clone())
    }
}

#[async_trait]
impl PlannedWorkoutRepository for PlannedWorkoutRepositoryImpl {
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<PlannedWorkout>, DatabaseError> {
        cancellable_read(cancel, self.manager().get_by_id(id)).await
    }

    async fn has_planned_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.exists(user_id, workout_id, date)).await
    }

    async fn list_for_user_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlannedWorkout>, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.list_between(user_id, from, to)).await
    }

    async fn add(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().insert(planned).await
    }

    async fn update(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().update(planned).await
    }
}
