// ABOUTME: Integration tests for concurrent requests, cooperative cancellation and file-backed storage
// ABOUTME: Racing starts, schedules and stale saves must be caught by storage; failed steps persist nothing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{create_file_database, create_test_database, create_test_service, live};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use workout_tracker::config::{DatabaseConfig, DatabaseUrl};
use workout_tracker::database::repositories::{
    PlannedWorkoutRepository, PlannedWorkoutRepositoryImpl, UserMetricRepositoryImpl,
    WorkoutSessionRepository, WorkoutSessionRepositoryImpl,
};
use workout_tracker::database::Database;
use workout_tracker::errors::{DatabaseError, TrackingError};
use workout_tracker::intelligence::PerformanceAnalysisService;
use workout_tracker::models::{
    ExerciseMetricType, PerceivedDifficulty, PlannedWorkout, PlannedWorkoutStatus, SessionStatus,
    SetParameters, WorkoutSession, WorkoutSessionExercise,
};
use workout_tracker::services::TrackingService;

#[tokio::test]
async fn test_concurrent_starts_leave_one_active_session() {
    let (database, _dir) = create_file_database().await.unwrap();
    let service = TrackingService::from_database(&database, PerformanceAnalysisService::new());
    let user_id = Uuid::new_v4();
    let cancel = live();

    let (first, second) = tokio::join!(
        service.start_workout_session(user_id, Uuid::new_v4(), &cancel),
        service.start_workout_session(user_id, Uuid::new_v4(), &cancel),
    );

    let results = [first, second];
    let started: Vec<&WorkoutSession> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(started.len(), 1, "exactly one start must win: {results:?}");
    let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        rejected,
        TrackingError::UserAlreadyHasActiveWorkoutSession { user_id: u, .. } if *u == user_id
    ));

    let active = service
        .get_active_workout_session(user_id, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id(), started[0].id());
}

#[tokio::test]
async fn test_concurrent_starts_from_spawned_tasks() {
    let (database, _dir) = create_file_database().await.unwrap();
    let service = TrackingService::from_database(&database, PerformanceAnalysisService::new());
    let user_id = Uuid::new_v4();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .start_workout_session(user_id, Uuid::new_v4(), &CancellationToken::new())
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(TrackingError::UserAlreadyHasActiveWorkoutSession { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_concurrent_schedules_leave_one_planned_workout() {
    let (database, _dir) = create_file_database().await.unwrap();
    let service = TrackingService::from_database(&database, PerformanceAnalysisService::new());
    let user_id = Uuid::new_v4();
    let workout_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let cancel = live();

    let (first, second) = tokio::join!(
        service.schedule_workout(user_id, workout_id, date, None, &cancel),
        service.schedule_workout(user_id, workout_id, date, None, &cancel),
    );
    assert!(first.is_ok() ^ second.is_ok());
    let rejected = first.err().or(second.err()).unwrap();
    assert_eq!(
        rejected,
        TrackingError::WorkoutAlreadyScheduled {
            user_id,
            workout_id,
            date,
        }
    );

    let scheduled = service
        .get_scheduled_workouts(user_id, date, date, &cancel)
        .await
        .unwrap();
    assert_eq!(scheduled.len(), 1);
}

#[tokio::test]
async fn test_cancelled_start_persists_nothing() {
    let service = create_test_service().await.unwrap();
    let user_id = Uuid::new_v4();
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = service
        .start_workout_session(user_id, Uuid::new_v4(), &cancelled)
        .await
        .unwrap_err();
    assert_eq!(err, TrackingError::Cancelled);

    assert!(service
        .get_active_workout_session(user_id, &live())
        .await
        .unwrap()
        .is_none());
    assert!(service
        .get_recent_workout_sessions(user_id, None, &live())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_cancelled_reads_report_cancellation() {
    let service = create_test_service().await.unwrap();
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = service
        .get_workout_session(Uuid::new_v4(), Uuid::new_v4(), &cancelled)
        .await
        .unwrap_err();
    assert_eq!(err, TrackingError::Cancelled);
    assert!(!err.is_not_found());
}

/// Session repository that fires the token once history has been read
struct CancelAfterHistory {
    inner: WorkoutSessionRepositoryImpl,
    token: CancellationToken,
}

#[async_trait]
impl WorkoutSessionRepository for CancelAfterHistory {
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError> {
        self.inner.get_by_id(id, cancel).await
    }

    async fn get_active_session_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkoutSession>, DatabaseError> {
        self.inner.get_active_session_for_user(user_id, cancel).await
    }

    async fn get_history_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSessionExercise>, DatabaseError> {
        let history = self
            .inner
            .get_history_for_exercise(user_id, exercise_id, cancel)
            .await;
        self.token.cancel();
        history
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkoutSession>, DatabaseError> {
        self.inner.list_for_user(user_id, limit, cancel).await
    }

    async fn add(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.add(session, cancel).await
    }

    async fn update(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.update(session, cancel).await
    }

    async fn add_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.add_with_planned(session, planned, cancel).await
    }

    async fn update_with_planned(
        &self,
        session: &WorkoutSession,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.update_with_planned(session, planned, cancel).await
    }
}

#[tokio::test]
async fn test_cancellation_after_scoring_leaves_session_untouched() {
    let database = create_test_database().await.unwrap();
    let token = CancellationToken::new();
    let service = TrackingService::new(
        Arc::new(CancelAfterHistory {
            inner: WorkoutSessionRepositoryImpl::new(database.clone()),
            token: token.clone(),
        }),
        Arc::new(PlannedWorkoutRepositoryImpl::new(database.clone())),
        Arc::new(UserMetricRepositoryImpl::new(database.clone())),
        PerformanceAnalysisService::new(),
    );
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &token)
        .await
        .unwrap();
    service
        .add_exercise(
            user_id,
            session.id(),
            squat,
            "Back Squat",
            ExerciseMetricType::Repetition,
            &token,
        )
        .await
        .unwrap();
    service
        .add_set(
            user_id,
            session.id(),
            squat,
            SetParameters::reps(5, Some(100.0)),
            &token,
        )
        .await
        .unwrap();

    let err = service
        .complete_workout_session(
            user_id,
            session.id(),
            PerceivedDifficulty::Moderate,
            None,
            &token,
        )
        .await
        .unwrap_err();
    assert_eq!(err, TrackingError::Cancelled);

    let reloaded = service
        .get_workout_session(user_id, session.id(), &live())
        .await
        .unwrap();
    assert_eq!(reloaded.status(), SessionStatus::InProgress);
    assert_eq!(reloaded.workout_score(), None);
    assert_eq!(reloaded.exercise(squat).unwrap().performance_score, None);
}

/// Planned workout repository where another request cancels each workout right after it is read
struct CancelledAfterRead {
    inner: PlannedWorkoutRepositoryImpl,
}

#[async_trait]
impl PlannedWorkoutRepository for CancelledAfterRead {
    async fn get_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<PlannedWorkout>, DatabaseError> {
        let loaded = self.inner.get_by_id(id, cancel).await?;
        if let Some(planned) = &loaded {
            let mut other = planned.clone();
            if other.cancel().is_ok() {
                self.inner.update(&other, cancel).await?;
            }
        }
        Ok(loaded)
    }

    async fn has_planned_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, DatabaseError> {
        self.inner
            .has_planned_workout(user_id, workout_id, date, cancel)
            .await
    }

    async fn list_for_user_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlannedWorkout>, DatabaseError> {
        self.inner
            .list_for_user_between(user_id, from, to, cancel)
            .await
    }

    async fn add(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.add(planned, cancel).await
    }

    async fn update(
        &self,
        planned: &PlannedWorkout,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        self.inner.update(planned, cancel).await
    }
}

#[tokio::test]
async fn test_start_racing_a_cancel_persists_no_session() {
    let database = create_test_database().await.unwrap();
    let service = TrackingService::new(
        Arc::new(WorkoutSessionRepositoryImpl::new(database.clone())),
        Arc::new(CancelledAfterRead {
            inner: PlannedWorkoutRepositoryImpl::new(database.clone()),
        }),
        Arc::new(UserMetricRepositoryImpl::new(database.clone())),
        PerformanceAnalysisService::new(),
    );
    let user_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 8, 12).unwrap();
    let cancel = live();

    let planned = service
        .schedule_workout(user_id, Uuid::new_v4(), date, None, &cancel)
        .await
        .unwrap();

    let err = service
        .start_planned_workout(user_id, planned.id(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TrackingError::ConcurrentModification {
            entity_type: "planned_workout",
            ..
        }
    ));

    // The session insert shared the transaction with the rejected planned update
    assert!(service
        .get_active_workout_session(user_id, &cancel)
        .await
        .unwrap()
        .is_none());
    assert!(service
        .get_recent_workout_sessions(user_id, None, &cancel)
        .await
        .unwrap()
        .is_empty());

    let stored = PlannedWorkoutRepositoryImpl::new(database)
        .get_by_id(planned.id(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), PlannedWorkoutStatus::Cancelled);
    assert_eq!(stored.workout_session_id(), None);
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.path().join("nested").join("tracker.db"),
        },
        max_connections: 2,
        auto_migrate: true,
    };
    let user_id = Uuid::new_v4();

    let session_id = {
        let database = Database::from_config(&config).await.unwrap();
        let service =
            TrackingService::from_database(&database, PerformanceAnalysisService::new());
        let session = service
            .start_workout_session(user_id, Uuid::new_v4(), &live())
            .await
            .unwrap();
        database.pool().close().await;
        session.id()
    };

    let reopened = Database::from_config(&config).await.unwrap();
    let service = TrackingService::from_database(&reopened, PerformanceAnalysisService::new());
    let active = service
        .get_active_workout_session(user_id, &live())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id(), session_id);
}
