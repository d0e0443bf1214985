// ABOUTME: Database operations for user body metrics and personal records
// ABOUTME: Metric CRUD plus latest-by-type and history queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_label, parse_timestamp, parse_uuid};
use crate::errors::DatabaseError;
use crate::models::{UserMetric, UserMetricType};

/// User metric database operations
pub struct UserMetricManager {
    pool: SqlitePool,
}

impl UserMetricManager {
    /// Create a new user metric manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a metric by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserMetric>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, metric_type, value, unit, recorded_at, notes
            FROM user_metrics
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_metric(&r)).transpose()
    }

    /// Most recently recorded metric of a type
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
    ) -> Result<Option<UserMetric>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, metric_type, value, unit, recorded_at, notes
            FROM user_metrics
            WHERE user_id = $1 AND metric_type = $2
            ORDER BY recorded_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(metric_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_metric(&r)).transpose()
    }

    /// Metrics of a type, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn list_by_type(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        limit: u32,
    ) -> Result<Vec<UserMetric>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, metric_type, value, unit, recorded_at, notes
            FROM user_metrics
            WHERE user_id = $1 AND metric_type = $2
            ORDER BY recorded_at DESC, rowid DESC
            LIMIT $3
            ",
        )
        .bind(user_id.to_string())
        .bind(metric_type.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_metric).collect()
    }

    /// Insert a metric
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn insert(&self, metric: &UserMetric) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO user_metrics (id, user_id, metric_type, value, unit, recorded_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(metric.id.to_string())
        .bind(metric.user_id.to_string())
        .bind(metric.metric_type.as_str())
        .bind(metric.value())
        .bind(&metric.unit)
        .bind(format_timestamp(metric.recorded_at()))
        .bind(&metric.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update the value, unit, timestamp and notes of a metric
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the metric does not exist, or another error if the write fails
    pub async fn update(&self, metric: &UserMetric) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r"
            UPDATE user_metrics
            SET value = $2, unit = $3, recorded_at = $4, notes = $5
            WHERE id = $1
            ",
        )
        .bind(metric.id.to_string())
        .bind(metric.value())
        .bind(&metric.unit)
        .bind(format_timestamp(metric.recorded_at()))
        .bind(&metric.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(metric.id));
        }
        Ok(())
    }

    /// Delete a metric
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the metric does not exist, or another error if the write fails
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM user_metrics WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "user_metric",
        entity_id: id.to_string(),
    }
}

fn row_to_metric(row: &SqliteRow) -> Result<UserMetric, DatabaseError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let metric_type: String = row.try_get("metric_type")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    Ok(UserMetric::restore(
        parse_uuid(&id)?,
        parse_uuid(&user_id)?,
        parse_label("metric_type", &metric_type, UserMetricType::parse)?,
        row.try_get("value")?,
        row.try_get("unit")?,
        parse_timestamp(&recorded_at)?,
        row.try_get("notes")?,
    ))
}
