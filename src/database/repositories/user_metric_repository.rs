// ABOUTME: User metric repository implementation backed by SQLite
// ABOUTME: Wraps the metric manager with cooperative cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{cancellable_read, ensure_not_cancelled, UserMetricRepository};
use crate::database::{Database, UserMetricManager};
use crate::errors::DatabaseError;
use crate::models::{UserMetric, UserMetricType};

/// `SQLite` implementation of `UserMetricRepository`
pub struct UserMetricRepositoryImpl {
    db: Database,
}

impl UserMetricRepositoryImpl {
    /// Create a new `UserMetricRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn manager(&self) -> UserMetricManager {
        UserMetricManager::new(self.db.pool().clone())
    }
}

#[async_trait]
impl UserMetricRepository for UserMetricRepositoryImpl {
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<UserMetric>, DatabaseError> {
        cancellable_read(cancel, self.manager().get_by_id(id)).await
    }

    async fn get_latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        cancel: &CancellationToken,
    ) -> Result<Option<UserMetric>, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.get_latest_by_type(user_id, metric_type)).await
    }

    async fn list_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserMetric>, DatabaseError> {
        let manager = self.manager();
        cancellable_read(cancel, manager.list_by_type(user_id, metric_type, limit)).await
    }

    async fn add(&self, metric: &UserMetric, cancel: &CancellationToken) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().insert(metric).await
    }

    async fn update(
        &self,
        metric: &UserMetric,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().update(metric).await
    }

    async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<(), DatabaseError> {
        ensure_not_cancelled(cancel)?;
        self.manager().delete(id).await
    }
}
