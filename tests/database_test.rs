// ABOUTME: Integration tests for the SQLite repositories behind the tracking service
// ABOUTME: Covers round trips, history ordering, uniqueness indexes, stale saves and paired writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
#![allow(missing_docs)]

mod common;

use chrono::{NaiveDate, Utc};
use common::{create_test_database, live};
use uuid::Uuid;
use workout_tracker::database::repositories::{
    PlannedWorkoutRepository, PlannedWorkoutRepositoryImpl, UserMetricRepository,
    UserMetricRepositoryImpl, WorkoutSessionRepository, WorkoutSessionRepositoryImpl,
};
use workout_tracker::database::{ACTIVE_SESSION_INDEX, PLANNED_SCHEDULE_INDEX};
use workout_tracker::errors::DatabaseError;
use workout_tracker::intelligence::PerformanceAnalysisService;
use workout_tracker::models::{
    ExerciseMetricType, PerceivedDifficulty, PlannedWorkout, PlannedWorkoutStatus, SessionStatus,
    SetParameters, UserMetric, UserMetricType, WorkoutSession,
};
use workout_tracker::services::TrackingService;

fn squat_session(user_id: Uuid, squat: Uuid, weight: f64) -> WorkoutSession {
    let mut session = WorkoutSession::start_ad_hoc(user_id, Uuid::new_v4());
    session
        .add_exercise(squat, "Back Squat", ExerciseMetricType::Repetition)
        .unwrap();
    session
        .add_set(squat, SetParameters::reps(5, Some(weight)).with_rest(120))
        .unwrap();
    session
}

#[tokio::test]
async fn test_session_aggregate_round_trip() {
    let db = create_test_database().await.unwrap();
    let repo = WorkoutSessionRepositoryImpl::new(db);
    let squat = Uuid::new_v4();
    let session = squat_session(Uuid::new_v4(), squat, 100.0);

    repo.add(&session, &live()).await.unwrap();
    let loaded = repo.get_by_id(session.id(), &live()).await.unwrap().unwrap();

    assert_eq!(loaded.status(), session.status());
    assert_eq!(loaded.exercises().len(), 1);
    let exercise = loaded.exercise(squat).unwrap();
    assert_eq!(exercise.exercise_name, "Back Squat");
    assert_eq!(exercise.sets.len(), 1);
    assert_eq!(exercise.sets[0].weight, Some(100.0));
    assert_eq!(exercise.sets[0].rest_time_seconds, Some(120));

    assert!(repo.get_by_id(Uuid::new_v4(), &live()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_of_unsaved_session_is_not_found() {
    let db = create_test_database().await.unwrap();
    let repo = WorkoutSessionRepositoryImpl::new(db);
    let session = WorkoutSession::start_ad_hoc(Uuid::new_v4(), Uuid::new_v4());

    let err = repo.update(&session, &live()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { .. }));
}

#[tokio::test]
async fn test_active_session_index_rejects_second_session() {
    let db = create_test_database().await.unwrap();
    let repo = WorkoutSessionRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();

    repo.add(&WorkoutSession::start_ad_hoc(user_id, Uuid::new_v4()), &live())
        .await
        .unwrap();
    let err = repo
        .add(&WorkoutSession::start_ad_hoc(user_id, Uuid::new_v4()), &live())
        .await
        .unwrap_err();
    assert!(err.is_unique_violation_of(ACTIVE_SESSION_INDEX));

    // A planned session does not occupy the active slot
    repo.add(&WorkoutSession::new_planned(user_id, Uuid::new_v4()), &live())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_history_is_completed_sessions_oldest_first() {
    let db = create_test_database().await.unwrap();
    let repo = WorkoutSessionRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    for weight in [100.0, 105.0, 110.0] {
        let mut session = squat_session(user_id, squat, weight);
        repo.add(&session, &live()).await.unwrap();
        session
            .complete(PerceivedDifficulty::Moderate, None)
            .unwrap();
        repo.update(&session, &live()).await.unwrap();
    }
    // Still in progress, so not history
    repo.add(&squat_session(user_id, squat, 200.0), &live())
        .await
        .unwrap();

    let history = repo
        .get_history_for_exercise(user_id, squat, &live())
        .await
        .unwrap();
    let bests: Vec<Option<f64>> = history.iter().map(|e| e.get_best_performance()).collect();
    assert_eq!(bests, vec![Some(500.0), Some(525.0), Some(550.0)]);

    assert!(repo
        .get_history_for_exercise(Uuid::new_v4(), squat, &live())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_planned_schedule_index() {
    let db = create_test_database().await.unwrap();
    let repo = PlannedWorkoutRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();
    let workout_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();

    let mut first = PlannedWorkout::schedule(user_id, workout_id, date, None);
    repo.add(&first, &live()).await.unwrap();
    assert!(repo
        .has_planned_workout(user_id, workout_id, date, &live())
        .await
        .unwrap());

    let err = repo
        .add(&PlannedWorkout::schedule(user_id, workout_id, date, None), &live())
        .await
        .unwrap_err();
    assert!(err.is_unique_violation_of(PLANNED_SCHEDULE_INDEX));

    // Cancelled schedules release the slot
    first.cancel().unwrap();
    repo.update(&first, &live()).await.unwrap();
    assert!(!repo
        .has_planned_workout(user_id, workout_id, date, &live())
        .await
        .unwrap());
    repo.add(&PlannedWorkout::schedule(user_id, workout_id, date, None), &live())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_metric_delete_of_missing_row() {
    let db = create_test_database().await.unwrap();
    let repo = UserMetricRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();

    let metric = UserMetric::record(user_id, UserMetricType::Height, 181.5, "cm", Utc::now())
        .unwrap()
        .with_notes("Stadiometer");
    repo.add(&metric, &live()).await.unwrap();

    let latest = repo
        .get_latest_by_type(user_id, UserMetricType::Height, &live())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, metric.id);
    assert_eq!(latest.value(), 181.5);
    assert_eq!(latest.notes.as_deref(), Some("Stadiometer"));

    repo.delete(metric.id, &live()).await.unwrap();
    let err = repo.delete(metric.id, &live()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { .. }));
}

#[tokio::test]
async fn test_stale_session_save_cannot_reopen_completed_session() {
    let db = create_test_database().await.unwrap();
    let repo = WorkoutSessionRepositoryImpl::new(db.clone());
    let service = TrackingService::from_database(&db, PerformanceAnalysisService::new());
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &live())
        .await
        .unwrap();
    service
        .add_exercise(
            user_id,
            session.id(),
            squat,
            "Back Squat",
            ExerciseMetricType::Repetition,
            &live(),
        )
        .await
        .unwrap();
    service
        .add_set(
            user_id,
            session.id(),
            squat,
            SetParameters::reps(5, Some(100.0)),
            &live(),
        )
        .await
        .unwrap();

    let mut stale = repo.get_by_id(session.id(), &live()).await.unwrap().unwrap();
    service
        .complete_workout_session(
            user_id,
            session.id(),
            PerceivedDifficulty::Easy,
            None,
            &live(),
        )
        .await
        .unwrap();

    stale
        .add_set(squat, SetParameters::reps(5, Some(105.0)))
        .unwrap();
    let err = repo.update(&stale, &live()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::StaleVersion { entity_type: "workout_session", .. }));

    let after = repo.get_by_id(session.id(), &live()).await.unwrap().unwrap();
    assert_eq!(after.status(), SessionStatus::Completed);
    assert!(after.completed_at().is_some());
    assert_eq!(after.exercise(squat).unwrap().sets.len(), 1);
    assert!(after.version() > stale.version());
}

#[tokio::test]
async fn test_stale_planned_start_cannot_undo_cancel() {
    let db = create_test_database().await.unwrap();
    let repo = PlannedWorkoutRepositoryImpl::new(db);
    let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
    let planned = PlannedWorkout::schedule(Uuid::new_v4(), Uuid::new_v4(), date, None);
    repo.add(&planned, &live()).await.unwrap();

    let mut starting = repo.get_by_id(planned.id(), &live()).await.unwrap().unwrap();
    let mut cancelling = repo.get_by_id(planned.id(), &live()).await.unwrap().unwrap();
    cancelling.cancel().unwrap();
    repo.update(&cancelling, &live()).await.unwrap();

    starting.start(Uuid::new_v4()).unwrap();
    let err = repo.update(&starting, &live()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::StaleVersion { entity_type: "planned_workout", .. }));

    let stored = repo.get_by_id(planned.id(), &live()).await.unwrap().unwrap();
    assert_eq!(stored.status(), PlannedWorkoutStatus::Cancelled);
    assert_eq!(stored.workout_session_id(), None);
}

#[tokio::test]
async fn test_paired_save_keeps_nothing_when_planned_write_fails() {
    let db = create_test_database().await.unwrap();
    let sessions = WorkoutSessionRepositoryImpl::new(db.clone());
    let planned_repo = PlannedWorkoutRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();

    // Never stored, so the planned half of the write matches no row
    let mut unsaved = PlannedWorkout::schedule(user_id, Uuid::new_v4(), date, None);
    let session = WorkoutSession::start_ad_hoc(user_id, unsaved.workout_id())
        .for_planned_workout(unsaved.id());
    unsaved.start(session.id()).unwrap();

    let err = sessions
        .add_with_planned(&session, &unsaved, &live())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { entity_type: "planned_workout", .. }));
    assert!(sessions.get_by_id(session.id(), &live()).await.unwrap().is_none());
    assert!(sessions
        .get_active_session_for_user(user_id, &live())
        .await
        .unwrap()
        .is_none());

    // Same pair with the planned workout stored goes through as one unit
    let mut planned = PlannedWorkout::schedule(user_id, Uuid::new_v4(), date, None);
    planned_repo.add(&planned, &live()).await.unwrap();
    let session = WorkoutSession::start_ad_hoc(user_id, planned.workout_id())
        .for_planned_workout(planned.id());
    planned.start(session.id()).unwrap();
    sessions
        .add_with_planned(&session, &planned, &live())
        .await
        .unwrap();

    let stored = planned_repo
        .get_by_id(planned.id(), &live())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), PlannedWorkoutStatus::InProgress);
    assert_eq!(stored.workout_session_id(), Some(session.id()));
    assert_eq!(stored.version(), 1);
}

#[tokio::test]
async fn test_paired_update_rolls_back_session_on_stale_planned_workout() {
    let db = create_test_database().await.unwrap();
    let sessions = WorkoutSessionRepositoryImpl::new(db.clone());
    let planned_repo = PlannedWorkoutRepositoryImpl::new(db);
    let user_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();

    let mut planned = PlannedWorkout::schedule(user_id, Uuid::new_v4(), date, None);
    planned_repo.add(&planned, &live()).await.unwrap();
    let mut session = WorkoutSession::start_ad_hoc(user_id, planned.workout_id())
        .for_planned_workout(planned.id());
    planned.start(session.id()).unwrap();
    sessions
        .add_with_planned(&session, &planned, &live())
        .await
        .unwrap();

    // `planned` still carries the version it was loaded at before the start
    session.abandon(Some("Rain".into())).unwrap();
    planned.abandon().unwrap();
    let err = sessions
        .update_with_planned(&session, &planned, &live())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::StaleVersion { .. }));

    let reloaded = sessions.get_by_id(session.id(), &live()).await.unwrap().unwrap();
    assert_eq!(reloaded.status(), SessionStatus::InProgress);
    assert_eq!(reloaded.abandon_reason(), None);
}
