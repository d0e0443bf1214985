// ABOUTME: Database operations for workout sessions with their exercises and sets
// ABOUTME: Atomic aggregate saves, active-session lookup, and per-exercise history queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{
    format_timestamp, parse_label, parse_optional_timestamp, parse_optional_uuid, parse_timestamp,
    parse_uuid, planned_workouts, to_optional_u32, to_u32, unmatched_update,
};
use crate::errors::DatabaseError;
use crate::models::{
    ExerciseMetricType, PerceivedDifficulty, PlannedWorkout, SessionStatus, WorkoutSession,
    WorkoutSessionExercise, WorkoutSessionRecord, WorkoutSessionSet,
};

const SESSION_COLUMNS: &str = r"
    id, user_id, workout_id, planned_workout_id, status, started_at, completed_at,
    perceived_difficulty, notes, abandon_reason, workout_score, created_at, updated_at, version
";

/// Workout session database operations
pub struct WorkoutSessionManager {
    pool: SqlitePool,
}

impl WorkoutSessionManager {
    /// Create a new workout session manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a session with its exercises and sets
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<WorkoutSession>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row_to_record(&row)?).await?)),
            None => Ok(None),
        }
    }

    /// Get the user's in-progress session
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<WorkoutSession>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions WHERE user_id = $1 AND status = 'in_progress'"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row_to_record(&row)?).await?)),
            None => Ok(None),
        }
    }

    /// Most recent sessions of a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WorkoutSession>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            sessions.push(self.hydrate(row_to_record(row)?).await?);
        }
        Ok(sessions)
    }

    /// Prior performances of an exercise from the user's completed sessions
    ///
    /// Ordered oldest to newest by completion time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value cannot be decoded
    pub async fn get_history_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WorkoutSessionExercise>, DatabaseError> {
        let exercise_rows = sqlx::query(
            r"
            SELECT e.session_id, e.exercise_id, e.exercise_name, e.metric_type,
                   e.exercise_order, e.performance_score
            FROM workout_session_exercises e
            JOIN workout_sessions s ON s.id = e.session_id
            WHERE s.user_id = $1 AND e.exercise_id = $2 AND s.status = 'completed'
            ORDER BY s.completed_at ASC, s.id ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let set_rows = sqlx::query(
            r"
            SELECT t.session_id, t.exercise_id, t.set_number, t.repetitions, t.weight,
                   t.duration_seconds, t.distance, t.rest_time_seconds, t.recorded_at
            FROM workout_session_sets t
            JOIN workout_sessions s ON s.id = t.session_id
            WHERE s.user_id = $1 AND t.exercise_id = $2 AND s.status = 'completed'
            ORDER BY t.session_id, t.set_number
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        assemble_exercises(&exercise_rows, &set_rows)
    }

    /// Insert a new session with its children in one transaction
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the id exists or the user already has an
    /// in-progress session, or another error if the write fails
    pub async fn insert(&self, session: &WorkoutSession) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_in(&mut tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Insert a new session and save the planned workout it starts, atomically
    ///
    /// # Errors
    ///
    /// Fails as [`Self::insert`] or as the planned workout update does; on any
    /// failure neither write is kept
    pub async fn insert_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_in(&mut tx, session).await?;
        planned_workouts::update_in(&mut tx, planned).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replace a stored session and its children in one transaction
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist, `StaleVersion` if it
    /// was saved since it was loaded, `UniqueViolation` if the update would give
    /// the user a second in-progress session, or another error if the write fails
    pub async fn update(&self, session: &WorkoutSession) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_in(&mut tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Save a session and its linked planned workout, atomically
    ///
    /// # Errors
    ///
    /// Fails as [`Self::update`] or as the planned workout update does; on any
    /// failure neither write is kept
    pub async fn update_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_in(&mut tx, session).await?;
        planned_workouts::update_in(&mut tx, planned).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn hydrate(&self, record: WorkoutSessionRecord) -> Result<WorkoutSession, DatabaseError> {
        let session_id = record.id.to_string();

        let exercise_rows = sqlx::query(
            r"
            SELECT session_id, exercise_id, exercise_name, metric_type, exercise_order, performance_score
            FROM workout_session_exercises
            WHERE session_id = $1
            ORDER BY exercise_order
            ",
        )
        .bind(&session_id)
        .fetch_all(&self.pool)
        .await?;

        let set_rows = sqlx::query(
            r"
            SELECT session_id, exercise_id, set_number, repetitions, weight,
                   duration_seconds, distance, rest_time_seconds, recorded_at
            FROM workout_session_sets
            WHERE session_id = $1
            ORDER BY exercise_id, set_number
            ",
        )
        .bind(&session_id)
        .fetch_all(&self.pool)
        .await?;

        let exercises = assemble_exercises(&exercise_rows, &set_rows)?;
        Ok(WorkoutSession::restore(record, exercises))
    }
}

async fn insert_in(
    tx: &mut Transaction<'_, Sqlite>,
    session: &WorkoutSession,
) -> Result<(), DatabaseError> {
    bind_record(
        sqlx::query(&format!(
            "INSERT INTO workout_sessions ({SESSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        )),
        &session.to_record(),
    )
    .execute(&mut **tx)
    .await?;

    insert_children(tx, session).await
}

/// Only matches the row at the version the session was loaded at
async fn update_in(
    tx: &mut Transaction<'_, Sqlite>,
    session: &WorkoutSession,
) -> Result<(), DatabaseError> {
    let record = session.to_record();
    let query = sqlx::query(
        r"
        UPDATE workout_sessions
        SET user_id = $2, workout_id = $3, planned_workout_id = $4, status = $5,
            started_at = $6, completed_at = $7, perceived_difficulty = $8, notes = $9,
            abandon_reason = $10, workout_score = $11, created_at = $12, updated_at = $13,
            version = version + 1
        WHERE id = $1 AND version = $14
        ",
    );
    let result = bind_record(query, &record).execute(&mut **tx).await?;
    if result.rows_affected() == 0 {
        return Err(unmatched_update(tx, "workout_sessions", "workout_session", record.id).await);
    }

    let session_id = record.id.to_string();
    sqlx::query("DELETE FROM workout_session_sets WHERE session_id = $1")
        .bind(&session_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM workout_session_exercises WHERE session_id = $1")
        .bind(&session_id)
        .execute(&mut **tx)
        .await?;

    insert_children(tx, session).await
}

fn bind_record<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    record: &WorkoutSessionRecord,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.workout_id.to_string())
        .bind(record.planned_workout_id.map(|id| id.to_string()))
        .bind(record.status.as_str())
        .bind(record.started_at.map(format_timestamp))
        .bind(record.completed_at.map(format_timestamp))
        .bind(record.perceived_difficulty.map(|d| d.as_str()))
        .bind(record.notes.clone())
        .bind(record.abandon_reason.clone())
        .bind(record.workout_score)
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .bind(i64::from(record.version))
}

async fn insert_children(
    tx: &mut Transaction<'_, Sqlite>,
    session: &WorkoutSession,
) -> Result<(), DatabaseError> {
    let session_id = session.id().to_string();

    for exercise in session.exercises() {
        let exercise_id = exercise.exercise_id.to_string();
        sqlx::query(
            r"
            INSERT INTO workout_session_exercises
                (session_id, exercise_id, exercise_name, metric_type, exercise_order, performance_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&session_id)
        .bind(&exercise_id)
        .bind(&exercise.exercise_name)
        .bind(exercise.metric_type.as_str())
        .bind(i64::from(exercise.order))
        .bind(exercise.performance_score)
        .execute(&mut **tx)
        .await?;

        for set in &exercise.sets {
            sqlx::query(
                r"
                INSERT INTO workout_session_sets
                    (session_id, exercise_id, set_number, repetitions, weight,
                     duration_seconds, distance, rest_time_seconds, recorded_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(&session_id)
            .bind(&exercise_id)
            .bind(i64::from(set.set_number))
            .bind(set.repetitions.map(i64::from))
            .bind(set.weight)
            .bind(set.duration_seconds.map(i64::from))
            .bind(set.distance)
            .bind(set.rest_time_seconds.map(i64::from))
            .bind(format_timestamp(set.recorded_at))
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

fn row_to_record(row: &SqliteRow) -> Result<WorkoutSessionRecord, DatabaseError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let workout_id: String = row.try_get("workout_id")?;
    let status: String = row.try_get("status")?;
    let difficulty: Option<String> = row.try_get("perceived_difficulty")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(WorkoutSessionRecord {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        workout_id: parse_uuid(&workout_id)?,
        planned_workout_id: parse_optional_uuid(row.try_get("planned_workout_id")?)?,
        status: parse_label("status", &status, SessionStatus::parse)?,
        started_at: parse_optional_timestamp(row.try_get("started_at")?)?,
        completed_at: parse_optional_timestamp(row.try_get("completed_at")?)?,
        perceived_difficulty: difficulty
            .as_deref()
            .map(|d| parse_label("perceived_difficulty", d, PerceivedDifficulty::parse))
            .transpose()?,
        notes: row.try_get("notes")?,
        abandon_reason: row.try_get("abandon_reason")?,
        workout_score: row.try_get("workout_score")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        version: to_u32("version", row.try_get("version")?)?,
    })
}

fn row_to_set(row: &SqliteRow) -> Result<WorkoutSessionSet, DatabaseError> {
    let recorded_at: String = row.try_get("recorded_at")?;
    Ok(WorkoutSessionSet {
        set_number: to_u32("set_number", row.try_get("set_number")?)?,
        repetitions: to_optional_u32("repetitions", row.try_get("repetitions")?)?,
        weight: row.try_get("weight")?,
        duration_seconds: to_optional_u32("duration_seconds", row.try_get("duration_seconds")?)?,
        distance: row.try_get("distance")?,
        rest_time_seconds: to_optional_u32("rest_time_seconds", row.try_get("rest_time_seconds")?)?,
        recorded_at: parse_timestamp(&recorded_at)?,
    })
}

/// Build exercises in row order and attach their sets
fn assemble_exercises(
    exercise_rows: &[SqliteRow],
    set_rows: &[SqliteRow],
) -> Result<Vec<WorkoutSessionExercise>, DatabaseError> {
    let mut sets: HashMap<(String, String), Vec<WorkoutSessionSet>> = HashMap::new();
    for row in set_rows {
        let key = (row.try_get("session_id")?, row.try_get("exercise_id")?);
        sets.entry(key).or_default().push(row_to_set(row)?);
    }

    exercise_rows
        .iter()
        .map(|row| -> Result<WorkoutSessionExercise, DatabaseError> {
            let session_id: String = row.try_get("session_id")?;
            let exercise_id: String = row.try_get("exercise_id")?;
            let metric_type: String = row.try_get("metric_type")?;
            let exercise_sets = sets
                .remove(&(session_id.clone(), exercise_id.clone()))
                .unwrap_or_default();

            Ok(WorkoutSessionExercise {
                session_id: parse_uuid(&session_id)?,
                exercise_id: parse_uuid(&exercise_id)?,
                exercise_name: row.try_get("exercise_name")?,
                metric_type: parse_label("metric_type", &metric_type, ExerciseMetricType::parse)?,
                order: to_u32("exercise_order", row.try_get("exercise_order")?)?,
                sets: exercise_sets,
                performance_score: row.try_get("performance_score")?,
            })
        })
        .collect()
}
