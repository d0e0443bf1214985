// ABOUTME: Integration tests for performance scoring against stored exercise history
// ABOUTME: Verifies first attempts, progressions, regressions, completion bonus and history isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
#![allow(missing_docs)]

mod common;

use common::{complete_strength_session, create_test_service, live, start_session};
use uuid::Uuid;
use workout_tracker::errors::TrackingError;
use workout_tracker::models::{ExerciseMetricType, PerceivedDifficulty, SetParameters};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_first_attempt_scores_seventy_five() {
    let service = create_test_service().await.unwrap();
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    let completion = complete_strength_session(&service, user_id, squat, &[(5, 100.0)])
        .await
        .unwrap();

    assert_eq!(completion.exercise_scores.len(), 1);
    let exercise = &completion.exercise_scores[0];
    assert_close(exercise.score, 75.0);
    assert_eq!(exercise.best_performance, Some(500.0));
    assert_eq!(exercise.description, "Great");

    // Average plus the completion bonus
    assert_close(completion.workout_score, 80.0);
    assert_eq!(completion.description, "Great");
}

#[tokio::test]
async fn test_progression_and_regression() {
    let service = create_test_service().await.unwrap();
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    complete_strength_session(&service, user_id, squat, &[(5, 100.0)])
        .await
        .unwrap();

    // 550 against [500]: improvement 100, consistency 100, volume 90
    let progressed = complete_strength_session(&service, user_id, squat, &[(5, 110.0)])
        .await
        .unwrap();
    assert_close(progressed.exercise_scores[0].score, 97.0);
    assert_eq!(progressed.exercise_scores[0].description, "Personal Record");
    assert_close(progressed.workout_score, 100.0);

    // 450 against [500, 550]: improvement 60, consistency 55, volume 60
    let regressed = complete_strength_session(&service, user_id, squat, &[(5, 90.0)])
        .await
        .unwrap();
    assert_close(regressed.exercise_scores[0].score, 58.5);
    assert_eq!(regressed.exercise_scores[0].description, "Solid");
    assert_close(regressed.workout_score, 63.5);
    assert_eq!(regressed.description, "Solid");
}

#[tokio::test]
async fn test_scores_are_persisted_on_the_session() {
    let service = create_test_service().await.unwrap();
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    let completion = complete_strength_session(&service, user_id, squat, &[(8, 60.0)])
        .await
        .unwrap();
    let reloaded = service
        .get_workout_session(user_id, completion.session.id(), &live())
        .await
        .unwrap();

    assert_eq!(reloaded.workout_score(), Some(80.0));
    assert_eq!(reloaded.exercise(squat).unwrap().performance_score, Some(75.0));
}

#[tokio::test]
async fn test_empty_session_scores_zero() {
    let service = create_test_service().await.unwrap();
    let (user_id, session) = start_session(&service).await.unwrap();

    let completion = service
        .complete_workout_session(
            user_id,
            session.id(),
            PerceivedDifficulty::VeryEasy,
            None,
            &live(),
        )
        .await
        .unwrap();
    assert!(completion.exercise_scores.is_empty());
    assert_close(completion.workout_score, 0.0);
    assert_eq!(completion.description, "Keep Going");
}

#[tokio::test]
async fn test_exercise_without_sets_drops_the_bonus() {
    let service = create_test_service().await.unwrap();
    let cancel = live();
    let (user_id, session) = start_session(&service).await.unwrap();
    let plank = Uuid::new_v4();
    let lunge = Uuid::new_v4();

    service
        .add_exercise(
            user_id,
            session.id(),
            plank,
            "Plank",
            ExerciseMetricType::Duration,
            &cancel,
        )
        .await
        .unwrap();
    service
        .add_set(user_id, session.id(), plank, SetParameters::duration(90), &cancel)
        .await
        .unwrap();
    service
        .add_exercise(
            user_id,
            session.id(),
            lunge,
            "Walking Lunge",
            ExerciseMetricType::Repetition,
            &cancel,
        )
        .await
        .unwrap();

    let completion = service
        .complete_workout_session(
            user_id,
            session.id(),
            PerceivedDifficulty::Moderate,
            None,
            &cancel,
        )
        .await
        .unwrap();

    let scores: Vec<(Uuid, f64)> = completion
        .exercise_scores
        .iter()
        .map(|e| (e.exercise_id, e.score))
        .collect();
    assert_eq!(scores, vec![(plank, 75.0), (lunge, 0.0)]);
    assert_close(completion.workout_score, 37.5);
    assert_eq!(completion.description, "On Track");
}

#[tokio::test]
async fn test_history_is_per_user() {
    let service = create_test_service().await.unwrap();
    let squat = Uuid::new_v4();

    complete_strength_session(&service, Uuid::new_v4(), squat, &[(5, 200.0)])
        .await
        .unwrap();
    let completion = complete_strength_session(&service, Uuid::new_v4(), squat, &[(5, 50.0)])
        .await
        .unwrap();

    assert_close(completion.exercise_scores[0].score, 75.0);
}

#[tokio::test]
async fn test_abandoned_sessions_are_not_history() {
    let service = create_test_service().await.unwrap();
    let cancel = live();
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &cancel)
        .await
        .unwrap();
    service
        .add_exercise(
            user_id,
            session.id(),
            squat,
            "Back Squat",
            ExerciseMetricType::Repetition,
            &cancel,
        )
        .await
        .unwrap();
    service
        .add_set(
            user_id,
            session.id(),
            squat,
            SetParameters::reps(5, Some(300.0)),
            &cancel,
        )
        .await
        .unwrap();
    service
        .abandon_workout_session(user_id, session.id(), None, &cancel)
        .await
        .unwrap();

    let completion = complete_strength_session(&service, user_id, squat, &[(5, 100.0)])
        .await
        .unwrap();
    assert_close(completion.exercise_scores[0].score, 75.0);
}

#[tokio::test]
async fn test_score_preview_does_not_store() {
    let service = create_test_service().await.unwrap();
    let cancel = live();
    let user_id = Uuid::new_v4();
    let squat = Uuid::new_v4();

    complete_strength_session(&service, user_id, squat, &[(5, 100.0)])
        .await
        .unwrap();

    let session = service
        .start_workout_session(user_id, Uuid::new_v4(), &cancel)
        .await
        .unwrap();
    service
        .add_exercise(
            user_id,
            session.id(),
            squat,
            "Back Squat",
            ExerciseMetricType::Repetition,
            &cancel,
        )
        .await
        .unwrap();
    service
        .add_set(
            user_id,
            session.id(),
            squat,
            SetParameters::reps(5, Some(110.0)),
            &cancel,
        )
        .await
        .unwrap();

    let exercise = service
        .calculate_exercise_performance(user_id, session.id(), squat, &cancel)
        .await
        .unwrap();
    assert_close(exercise.score, 97.0);

    let preview = service
        .calculate_workout_score(user_id, session.id(), &cancel)
        .await
        .unwrap();
    assert_close(preview.score, 100.0);
    assert_eq!(preview.exercise_scores, vec![exercise]);

    let reloaded = service
        .get_workout_session(user_id, session.id(), &cancel)
        .await
        .unwrap();
    assert_eq!(reloaded.workout_score(), None);
    assert_eq!(reloaded.exercise(squat).unwrap().performance_score, None);

    let missing = Uuid::new_v4();
    let err = service
        .calculate_exercise_performance(user_id, session.id(), missing, &cancel)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TrackingError::ExerciseNotFoundInSession {
            session_id: session.id(),
            exercise_id: missing,
        }
    );
}
