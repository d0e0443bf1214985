// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory and file-backed tracking services, and workout fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `workout_tracker`

use std::sync::Once;

use anyhow::Result;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use workout_tracker::config::{DatabaseConfig, DatabaseUrl};
use workout_tracker::database::Database;
use workout_tracker::intelligence::PerformanceAnalysisService;
use workout_tracker::models::{
    ExerciseMetricType, PerceivedDifficulty, SetParameters, WorkoutSession,
};
use workout_tracker::services::{SessionCompletion, TrackingService};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; tests are quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

/// File-backed test database with a multi-connection pool
///
/// The returned `TempDir` must outlive the database.
pub async fn create_file_database() -> Result<(Database, TempDir)> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.path().join("tracker.db"),
        },
        max_connections: 4,
        auto_migrate: true,
    };
    let database = Database::from_config(&config).await?;
    Ok((database, dir))
}

/// Tracking service over a fresh in-memory database
pub async fn create_test_service() -> Result<TrackingService> {
    let database = create_test_database().await?;
    Ok(TrackingService::from_database(
        &database,
        PerformanceAnalysisService::new(),
    ))
}

/// A token that is never cancelled
pub fn live() -> CancellationToken {
    CancellationToken::new()
}

/// Run a full session with one repetition exercise and complete it
///
/// Each entry of `sets` is `(repetitions, weight)`.
pub async fn complete_strength_session(
    service: &TrackingService,
    user_id: Uuid,
    exercise_id: Uuid,
    sets: &[(u32, f64)],
) -> Result<SessionCompletion> {
    let cancel = live();
    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &cancel)
        .await?;
    service
        .add_exercise(
            user_id,
            session.id(),
            exercise_id,
            "Back Squat",
            ExerciseMetricType::Repetition,
            &cancel,
        )
        .await?;
    for &(reps, weight) in sets {
        service
            .add_set(
                user_id,
                session.id(),
                exercise_id,
                SetParameters::reps(reps, Some(weight)),
                &cancel,
            )
            .await?;
    }
    Ok(service
        .complete_workout_session(
            user_id,
            session.id(),
            PerceivedDifficulty::Moderate,
            None,
            &cancel,
        )
        .await?)
}

/// Start an ad-hoc session for a fresh user
pub async fn start_session(service: &TrackingService) -> Result<(Uuid, WorkoutSession)> {
    let user_id = Uuid::new_v4();
    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &live())
        .await?;
    Ok((user_id, session))
}
