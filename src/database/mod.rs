// ABOUTME: SQLite database management for workout tracking storage
// ABOUTME: Connection pool setup, idempotent migrations, and column codecs shared by managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Owns the `SQLite` pool and the schema. Per-aggregate managers hold the SQL;
//! the repository implementations in [`repositories`] wrap them with
//! cancellation and are what the service layer consumes.
//!
//! Two partial unique indexes carry the cross-aggregate invariants:
//! one in-progress session per user, and one live schedule per
//! `(user, workout, date)`.
//!
//! Sessions and planned workouts carry a `version` column. An update only
//! matches the row at the version it was loaded at and advances it, so a save
//! based on a stale read fails with `StaleVersion` instead of overwriting.

mod planned_workouts;
mod user_metrics;
mod workout_sessions;

/// Repository traits and their `SQLite` implementations
pub mod repositories;

pub use planned_workouts::PlannedWorkoutManager;
pub use user_metrics::UserMetricManager;
pub use workout_sessions::WorkoutSessionManager;

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::DatabaseError;

/// Index enforcing at most one in-progress session per user
pub const ACTIVE_SESSION_INDEX: &str = "workout_sessions.user_id";

/// Index enforcing one live schedule per user, workout and date
pub const PLANNED_SCHEDULE_INDEX: &str = "planned_workouts.user_id";

/// Database handle shared by all repositories
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let config = DatabaseConfig {
            url: DatabaseUrl::parse_url(database_url)?,
            ..DatabaseConfig::default()
        };
        Self::from_config(&config).await
    }

    /// Open the database described by `config`
    ///
    /// An in-memory database lives in a single pinned connection, since every
    /// `SQLite` memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or a migration fails
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if let DatabaseUrl::SQLite { path } = &config.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if config.url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };
        debug!(url = %config.url, "Opened database pool");

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_workout_sessions().await?;
        self.migrate_planned_workouts().await?;
        self.migrate_user_metrics().await?;
        info!("Database migrations complete");
        Ok(())
    }

    async fn migrate_workout_sessions(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                workout_id TEXT NOT NULL,
                planned_workout_id TEXT,
                status TEXT NOT NULL CHECK (status IN ('planned', 'in_progress', 'completed', 'abandoned', 'cancelled')),
                started_at TEXT,
                completed_at TEXT,
                perceived_difficulty TEXT,
                notes TEXT,
                abandon_reason TEXT,
                workout_score REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_session_exercises (
                session_id TEXT NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL,
                exercise_name TEXT NOT NULL,
                metric_type TEXT NOT NULL,
                exercise_order INTEGER NOT NULL CHECK (exercise_order >= 1),
                performance_score REAL,
                PRIMARY KEY (session_id, exercise_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_session_sets (
                session_id TEXT NOT NULL,
                exercise_id TEXT NOT NULL,
                set_number INTEGER NOT NULL CHECK (set_number >= 1),
                repetitions INTEGER,
                weight REAL,
                duration_seconds INTEGER,
                distance REAL,
                rest_time_seconds INTEGER,
                recorded_at TEXT NOT NULL,
                PRIMARY KEY (session_id, exercise_id, set_number),
                FOREIGN KEY (session_id, exercise_id)
                    REFERENCES workout_session_exercises(session_id, exercise_id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_workout_sessions_one_active ON workout_sessions(user_id) WHERE status = 'in_progress'",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_user ON workout_sessions(user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_exercises_exercise ON workout_session_exercises(exercise_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_planned_workouts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS planned_workouts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                workout_id TEXT NOT NULL,
                scheduled_date TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('planned', 'in_progress', 'completed', 'abandoned', 'cancelled')),
                program_id TEXT,
                workout_session_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_planned_workouts_schedule ON planned_workouts(user_id, workout_id, scheduled_date) WHERE status <> 'cancelled'",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_planned_workouts_user_date ON planned_workouts(user_id, scheduled_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_user_metrics(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_metrics (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                metric_type TEXT NOT NULL,
                value REAL NOT NULL CHECK (value >= 0),
                unit TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_user_metrics_user_type ON user_metrics(user_id, metric_type, recorded_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Column codecs
// ============================================================================

/// Timestamps are stored as fixed-width RFC 3339 so text order is time order
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::SerializationError(format!("invalid timestamp {value}: {e}")))
}

pub(crate) fn parse_optional_timestamp(
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DatabaseError::SerializationError(format!("invalid date {value}: {e}")))
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|e| DatabaseError::SerializationError(format!("invalid id {value}: {e}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> Result<Option<Uuid>, DatabaseError> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn to_u32(column: &str, value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|_| {
        DatabaseError::SerializationError(format!("{column} out of range: {value}"))
    })
}

pub(crate) fn to_optional_u32(column: &str, value: Option<i64>) -> Result<Option<u32>, DatabaseError> {
    value.map(|v| to_u32(column, v)).transpose()
}

/// Decode a stored enum label with its `parse` function
pub(crate) fn parse_label<T>(
    column: &str,
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, DatabaseError> {
    parse(value).ok_or_else(|| {
        DatabaseError::SerializationError(format!("unknown {column} value: {value}"))
    })
}

/// Explain an update guarded by `version` that matched no row
///
/// Either the row is gone, or another writer saved it after it was loaded.
pub(crate) async fn unmatched_update(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    entity_type: &'static str,
    id: Uuid,
) -> DatabaseError {
    let stored = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table} WHERE id = $1"))
        .bind(id.to_string())
        .fetch_one(&mut **tx)
        .await;

    match stored {
        Ok(0) => DatabaseError::NotFound {
            entity_type,
            entity_id: id.to_string(),
        },
        Ok(_) => DatabaseError::StaleVersion {
            entity_type,
            entity_id: id.to_string(),
        },
        Err(e) => e.into(),
    }
}
