// ABOUTME: Database operations for planned workouts
// ABOUTME: Schedule persistence, duplicate-schedule lookup, and calendar window queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{
    format_date, format_timestamp, parse_date, parse_label, parse_optional_uuid, parse_timestamp,
    parse_uuid, to_u32, unmatched_update,
};
use crate::errors::DatabaseError;
use crate::models::{PlannedWorkout, PlannedWorkoutRecord, PlannedWorkoutStatus};

/// Planned workout database operations
pub struct PlannedWorkoutManager {
    pool: SqlitePool,
}

impl PlannedWorkoutManager {
    /// Create a new planned workout manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a planned workout by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<PlannedWorkout>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, workout_id, scheduled_date, status, program_id,
                   workout_session_id, created_at, updated_at, version
            FROM planned_workouts
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_planned_workout(&r)).transpose()
    }

    /// Whether a non-cancelled schedule exists for the user, workout and date
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn exists(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM planned_workouts
            WHERE user_id = $1 AND workout_id = $2 AND scheduled_date = $3 AND status <> 'cancelled'
            ",
        )
        .bind(user_id.to_string())
        .bind(workout_id.to_string())
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Planned workouts of a user scheduled within `[from, to]`, earliest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn list_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PlannedWorkout>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, workout_id, scheduled_date, status, program_id,
                   workout_session_id, created_at, updated_at, version
            FROM planned_workouts
            WHERE user_id = $1 AND scheduled_date >= $2 AND scheduled_date <= $3
            ORDER BY scheduled_date ASC, created_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_planned_workout).collect()
    }

    /// Insert a planned workout
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if a live schedule already exists for the same
    /// user, workout and date, or another error if the write fails
    pub async fn insert(&self, planned: &PlannedWorkout) -> Result<(), DatabaseError> {
        let record = planned.to_record();
        sqlx::query(
            r"
            INSERT INTO planned_workouts
                (id, user_id, workout_id, scheduled_date, status, program_id,
                 workout_session_id, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.workout_id.to_string())
        .bind(format_date(record.scheduled_date))
        .bind(record.status.as_str())
        .bind(record.program_id.map(|id| id.to_string()))
        .bind(record.workout_session_id.map(|id| id.to_string()))
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .bind(i64::from(record.version))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update the mutable columns of a planned workout
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the planned workout does not exist, `StaleVersion`
    /// if it was saved since it was loaded, `UniqueViolation` if a reschedule
    /// collides with a live schedule, or another error if the write fails
    pub async fn update(&self, planned: &PlannedWorkout) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_in(&mut tx, planned).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Versioned update of a planned workout inside a caller's transaction
pub(super) async fn update_in(
    tx: &mut Transaction<'_, Sqlite>,
    planned: &PlannedWorkout,
) -> Result<(), DatabaseError> {
    let record = planned.to_record();
    let result = sqlx::query(
        r"
        UPDATE planned_workouts
        SET scheduled_date = $2, status = $3, workout_session_id = $4, updated_at = $5,
            version = version + 1
        WHERE id = $1 AND version = $6
        ",
    )
    .bind(record.id.to_string())
    .bind(format_date(record.scheduled_date))
    .bind(record.status.as_str())
    .bind(record.workout_session_id.map(|id| id.to_string()))
    .bind(format_timestamp(record.updated_at))
    .bind(i64::from(record.version))
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(unmatched_update(tx, "planned_workouts", "planned_workout", record.id).await);
    }
    Ok(())
}

fn row_to_planned_workout(row: &SqliteRow) -> Result<PlannedWorkout, DatabaseError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let workout_id: String = row.try_get("workout_id")?;
    let scheduled_date: String = row.try_get("scheduled_date")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(PlannedWorkout::restore(PlannedWorkoutRecord {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        workout_id: parse_uuid(&workout_id)?,
        scheduled_date: parse_date(&scheduled_date)?,
        status: parse_label("status", &status, PlannedWorkoutStatus::parse)?,
        program_id: parse_optional_uuid(row.try_get("program_id")?)?,
        workout_session_id: parse_optional_uuid(row.try_get("workout_session_id")?)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        version: to_u32("version", row.try_get("version")?)?,
    }))
}
