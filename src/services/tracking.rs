// ABOUTME: Workout tracking orchestration over sessions, planned workouts and body metrics
// ABOUTME: Enforces cross-aggregate invariants and feeds exercise history into performance scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tracking Service
//!
//! Every operation loads an aggregate, applies one command to it and saves it.
//! Validation happens before the first write, so a rejected command persists
//! nothing. Two cross-aggregate rules live here rather than in the aggregates:
//!
//! - a user has at most one `InProgress` session
//! - a workout is scheduled at most once per user and date
//!
//! Both are checked up front for a precise error, and both are backed by a
//! unique index so that two racing requests cannot slip past the check.
//!
//! Cancellation is cooperative. Reads stop as soon as the token fires; writes
//! check it before starting and then run to completion. When an operation
//! writes a session and its planned workout, both go in one transaction.
//!
//! Saves are versioned. A command whose aggregate was saved by another request
//! in the meantime fails with `ConcurrentModification` and changes nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracker_intelligence::{HistoryByExercise, PerformanceAnalysisService};
use uuid::Uuid;

use crate::constants::limits::{DEFAULT_METRIC_HISTORY, DEFAULT_RECENT_SESSIONS, MAX_LIST_LIMIT};
use crate::database::repositories::{
    PlannedWorkoutRepository, PlannedWorkoutRepositoryImpl, UserMetricRepository,
    UserMetricRepositoryImpl, WorkoutSessionRepository, WorkoutSessionRepositoryImpl,
};
use crate::database::{Database, ACTIVE_SESSION_INDEX, PLANNED_SCHEDULE_INDEX};
use crate::errors::{DatabaseError, TrackingError, TrackingResult};
use crate::models::{
    ExerciseMetricType, PerceivedDifficulty, PlannedWorkout, SessionStatus, SetParameters,
    UserMetric, UserMetricType, WorkoutSession, WorkoutSessionExercise, WorkoutSessionSet,
};

/// Score of one exercise with its presentational label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePerformance {
    /// Scored exercise
    pub exercise_id: Uuid,
    /// Display name at the time of the session
    pub exercise_name: String,
    /// Best set value, absent when no set was measurable
    pub best_performance: Option<f64>,
    /// Score in `[0, 100]`
    pub score: f64,
    /// Label of the score band
    pub description: String,
}

/// Whole-session score with its per-exercise breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutScore {
    /// Scored session
    pub session_id: Uuid,
    /// Score in `[0, 100]`
    pub score: f64,
    /// Label of the score band
    pub description: String,
    /// Scores in exercise order
    pub exercise_scores: Vec<ExercisePerformance>,
}

/// Result of completing a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCompletion {
    /// Completed session with its recorded scores
    pub session: WorkoutSession,
    /// Scores in exercise order
    pub exercise_scores: Vec<ExercisePerformance>,
    /// Whole-session score
    pub workout_score: f64,
    /// Label of the whole-session score band
    pub description: String,
}

/// New body metric measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInput {
    /// Measurement kind
    pub metric_type: UserMetricType,
    /// Measured value, must not be negative
    pub value: f64,
    /// Unit label
    pub unit: String,
    /// When the measurement was taken, defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Correction of an existing body metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricUpdate {
    /// Replacement value, must not be negative
    pub value: f64,
    /// Replacement timestamp, defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
    /// Replacement notes; `None` keeps the current notes
    pub notes: Option<String>,
}

/// Workout tracking orchestrator
#[derive(Clone)]
pub struct TrackingService {
    sessions: Arc<dyn WorkoutSessionRepository>,
    planned_workouts: Arc<dyn PlannedWorkoutRepository>,
    metrics: Arc<dyn UserMetricRepository>,
    analyzer: PerformanceAnalysisService,
}

impl TrackingService {
    /// Create a service over explicit repositories
    #[must_use]
    pub fn new(
        sessions: Arc<dyn WorkoutSessionRepository>,
        planned_workouts: Arc<dyn PlannedWorkoutRepository>,
        metrics: Arc<dyn UserMetricRepository>,
        analyzer: PerformanceAnalysisService,
    ) -> Self {
        Self {
            sessions,
            planned_workouts,
            metrics,
            analyzer,
        }
    }

    /// Create a service backed by the SQLite repositories of `database`
    #[must_use]
    pub fn from_database(database: &Database, analyzer: PerformanceAnalysisService) -> Self {
        Self::new(
            Arc::new(WorkoutSessionRepositoryImpl::new(database.clone())),
            Arc::new(PlannedWorkoutRepositoryImpl::new(database.clone())),
            Arc::new(UserMetricRepositoryImpl::new(database.clone())),
            analyzer,
        )
    }

    /// Scoring service used for completions and score queries
    #[must_use]
    pub const fn analyzer(&self) -> &PerformanceAnalysisService {
        &self.analyzer
    }

    // ── Session lifecycle ───────────────────────────────────────────────

    /// Start an ad-hoc session, created directly `InProgress`
    ///
    /// # Errors
    ///
    /// Returns `UserAlreadyHasActiveWorkoutSession` when the user already has a
    /// session in progress, or a storage error
    pub async fn start_workout_session(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        self.ensure_no_active_session(user_id, cancel).await?;

        let session = WorkoutSession::start_ad_hoc(user_id, workout_id);
        self.sessions
            .add(&session, cancel)
            .await
            .map_err(|e| active_session_conflict(user_id, e))?;

        info!(
            user.id = %user_id,
            session.id = %session.id(),
            workout.id = %workout_id,
            "Workout session started"
        );
        Ok(session)
    }

    /// Create a session in `Planned` status, to be begun later
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn prepare_workout_session(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let session = WorkoutSession::new_planned(user_id, workout_id);
        self.sessions.add(&session, cancel).await?;

        info!(user.id = %user_id, session.id = %session.id(), "Workout session prepared");
        Ok(session)
    }

    /// Move a prepared session to `InProgress`
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `CannotStartSession` when the session is not `Planned`
    /// - `UserAlreadyHasActiveWorkoutSession` when another session is in progress
    pub async fn begin_workout_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let mut session = self.load_session(user_id, session_id, cancel).await?;
        if session.status() != SessionStatus::Planned {
            warn!(session.id = %session_id, status = %session.status(), "Rejected session start");
            return Err(TrackingError::CannotStartSession {
                session_id,
                status: session.status(),
            });
        }
        self.ensure_no_active_session(user_id, cancel).await?;

        session.start()?;
        self.sessions
            .update(&session, cancel)
            .await
            .map_err(|e| active_session_conflict(user_id, e))?;

        info!(user.id = %user_id, session.id = %session_id, "Workout session begun");
        Ok(session)
    }

    /// Start the session that executes a planned workout
    ///
    /// The new session is linked to the planned workout, and the planned
    /// workout moves to `InProgress` pointing back at it.
    ///
    /// # Errors
    ///
    /// - `PlannedWorkoutNotFound` when the planned workout does not exist for this user
    /// - `CannotStartPlannedWorkout` when it is not `Planned`
    /// - `UserAlreadyHasActiveWorkoutSession` when another session is in progress
    /// - `ConcurrentModification` when either aggregate was saved since it was loaded
    pub async fn start_planned_workout(
        &self,
        user_id: Uuid,
        planned_workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let mut planned = self
            .load_planned_workout(user_id, planned_workout_id, cancel)
            .await?;
        let session = WorkoutSession::start_ad_hoc(user_id, planned.workout_id())
            .for_planned_workout(planned_workout_id);
        planned
            .start(session.id())
            .inspect_err(|e| warn!(planned_workout.id = %planned_workout_id, error = %e, "Rejected planned workout start"))?;
        self.ensure_no_active_session(user_id, cancel).await?;

        self.sessions
            .add_with_planned(&session, &planned, cancel)
            .await
            .map_err(|e| active_session_conflict(user_id, e))?;

        info!(
            user.id = %user_id,
            session.id = %session.id(),
            planned_workout.id = %planned_workout_id,
            "Planned workout started"
        );
        Ok(session)
    }

    /// Complete a session and score it against the user's history
    ///
    /// Every exercise is scored against prior completed sessions of the same
    /// exercise, the scores are stored on the session, and a linked planned
    /// workout is completed with it.
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `CannotCompleteSession` when the session is not `InProgress`
    /// - `CannotCompletePlannedWorkout` when the linked planned workout is not `InProgress`
    /// - `Cancelled` when the token fires before the session is saved
    /// - `ConcurrentModification` when either aggregate was saved since it was loaded
    pub async fn complete_workout_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        perceived_difficulty: PerceivedDifficulty,
        notes: Option<String>,
        cancel: &CancellationToken,
    ) -> TrackingResult<SessionCompletion> {
        let mut session = self.load_session(user_id, session_id, cancel).await?;
        session
            .complete(perceived_difficulty, notes)
            .inspect_err(|e| warn!(session.id = %session_id, error = %e, "Rejected session completion"))?;

        let linked = match session.planned_workout_id() {
            Some(planned_id) => {
                let mut planned = self.load_planned_workout(user_id, planned_id, cancel).await?;
                planned.complete()?;
                Some(planned)
            }
            None => None,
        };

        let history = self.collect_history(&session, cancel).await?;
        let scores = self.analyzer.score_exercises(&session, &history);
        let workout_score = self.analyzer.combine_exercise_scores(&session, &scores);
        session.record_scores(&scores, workout_score)?;

        self.save_with_link(&session, linked.as_ref(), cancel).await?;

        let description = PerformanceAnalysisService::get_performance_description(workout_score);
        info!(
            user.id = %user_id,
            session.id = %session_id,
            workout_score,
            description,
            "Workout session completed"
        );
        Ok(SessionCompletion {
            exercise_scores: describe_scores(&session, &scores),
            session,
            workout_score,
            description: description.to_owned(),
        })
    }

    /// Abandon an in-progress session, and its planned workout when linked
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `CannotAbandonSession` when the session is not `InProgress`
    /// - `CannotAbandonPlannedWorkout` when the linked planned workout is not `InProgress`
    /// - `ConcurrentModification` when either aggregate was saved since it was loaded
    pub async fn abandon_workout_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        reason: Option<String>,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let mut session = self.load_session(user_id, session_id, cancel).await?;
        session
            .abandon(reason)
            .inspect_err(|e| warn!(session.id = %session_id, error = %e, "Rejected session abandon"))?;

        let linked = match session.planned_workout_id() {
            Some(planned_id) => {
                let mut planned = self.load_planned_workout(user_id, planned_id, cancel).await?;
                planned.abandon()?;
                Some(planned)
            }
            None => None,
        };

        self.save_with_link(&session, linked.as_ref(), cancel).await?;

        info!(user.id = %user_id, session.id = %session_id, "Workout session abandoned");
        Ok(session)
    }

    /// Cancel a prepared session that was never begun
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `Planned`
    pub async fn cancel_workout_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let (session, ()) = self
            .modify_session(user_id, session_id, cancel, WorkoutSession::cancel)
            .await?;
        info!(user.id = %user_id, session.id = %session_id, "Workout session cancelled");
        Ok(session)
    }

    // ── Exercises and sets ──────────────────────────────────────────────

    /// Add an exercise at the end of an in-progress session
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `InProgress`
    /// - `ExerciseAlreadyExists` when the exercise is already part of the session
    pub async fn add_exercise(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        exercise_name: &str,
        metric_type: ExerciseMetricType,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSessionExercise> {
        let (_, exercise) = self
            .modify_session(user_id, session_id, cancel, |session| {
                session
                    .add_exercise(exercise_id, exercise_name, metric_type)
                    .cloned()
            })
            .await?;
        debug!(session.id = %session_id, exercise.id = %exercise_id, order = exercise.order, "Exercise added");
        Ok(exercise)
    }

    /// Remove an exercise and its sets
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    pub async fn remove_exercise(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let (session, ()) = self
            .modify_session(user_id, session_id, cancel, |session| {
                session.remove_exercise(exercise_id)
            })
            .await?;
        debug!(session.id = %session_id, exercise.id = %exercise_id, "Exercise removed");
        Ok(session)
    }

    /// Move an exercise to a new 1-based position
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `InProgress`
    /// - `OrderMustBeAtLeastOne` when `new_order` is zero
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    pub async fn reorder_exercise(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        new_order: u32,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let (session, ()) = self
            .modify_session(user_id, session_id, cancel, |session| {
                session.reorder_exercise(exercise_id, new_order)
            })
            .await?;
        debug!(session.id = %session_id, exercise.id = %exercise_id, new_order, "Exercise reordered");
        Ok(session)
    }

    /// Record a set for an exercise of an in-progress session
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    /// - `NoExerciseParameters` / `NegativeMetricValue` for invalid measurements
    pub async fn add_set(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        params: SetParameters,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSessionSet> {
        let (_, set) = self
            .modify_session(user_id, session_id, cancel, |session| {
                session.add_set(exercise_id, params).cloned()
            })
            .await?;
        debug!(
            session.id = %session_id,
            exercise.id = %exercise_id,
            set_number = set.set_number,
            "Set recorded"
        );
        Ok(set)
    }

    /// Remove a recorded set; later sets are renumbered
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `InvalidSessionStatus` when the session is not `InProgress`
    /// - `ExerciseNotFoundInSession` / `SetNotFound` when the target is absent
    pub async fn remove_set(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        set_number: u32,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        let (session, ()) = self
            .modify_session(user_id, session_id, cancel, |session| {
                session.remove_set(exercise_id, set_number)
            })
            .await?;
        debug!(session.id = %session_id, exercise.id = %exercise_id, set_number, "Set removed");
        Ok(session)
    }

    // ── Session queries ─────────────────────────────────────────────────

    /// Get a session of this user
    ///
    /// # Errors
    ///
    /// Returns `WorkoutSessionNotFound` when the session does not exist for this user
    pub async fn get_workout_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        self.load_session(user_id, session_id, cancel).await
    }

    /// The user's in-progress session, if any
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn get_active_workout_session(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<Option<WorkoutSession>> {
        Ok(self
            .sessions
            .get_active_session_for_user(user_id, cancel)
            .await?)
    }

    /// The user's most recent sessions, newest first
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn get_recent_workout_sessions(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> TrackingResult<Vec<WorkoutSession>> {
        let limit = clamp_limit(limit, DEFAULT_RECENT_SESSIONS);
        debug!(user.id = %user_id, limit, "Listing recent workout sessions");
        Ok(self.sessions.list_for_user(user_id, limit, cancel).await?)
    }

    /// Score one exercise of a session against the user's history
    ///
    /// # Errors
    ///
    /// - `WorkoutSessionNotFound` when the session does not exist for this user
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    pub async fn calculate_exercise_performance(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<ExercisePerformance> {
        let session = self.load_session(user_id, session_id, cancel).await?;
        let exercise = session
            .exercise(exercise_id)
            .ok_or(TrackingError::ExerciseNotFoundInSession {
                session_id,
                exercise_id,
            })?;

        let history = self.exercise_history(&session, exercise_id, cancel).await?;
        let score = self.analyzer.calculate_performance_score(exercise, &history);
        Ok(describe_exercise(exercise, score))
    }

    /// Score a whole session against the user's history without storing anything
    ///
    /// # Errors
    ///
    /// Returns `WorkoutSessionNotFound` when the session does not exist for this user
    pub async fn calculate_workout_score(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutScore> {
        let session = self.load_session(user_id, session_id, cancel).await?;
        let history = self.collect_history(&session, cancel).await?;
        let scores = self.analyzer.score_exercises(&session, &history);
        let score = self.analyzer.combine_exercise_scores(&session, &scores);

        Ok(WorkoutScore {
            session_id,
            score,
            description: PerformanceAnalysisService::get_performance_description(score).to_owned(),
            exercise_scores: describe_scores(&session, &scores),
        })
    }

    // ── Planned workouts ────────────────────────────────────────────────

    /// Schedule a workout on a date
    ///
    /// # Errors
    ///
    /// Returns `WorkoutAlreadyScheduled` when a live schedule exists for the same
    /// user, workout and date, or a storage error
    pub async fn schedule_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        program_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> TrackingResult<PlannedWorkout> {
        self.ensure_not_scheduled(user_id, workout_id, date, cancel)
            .await?;

        let planned = PlannedWorkout::schedule(user_id, workout_id, date, program_id);
        self.planned_workouts
            .add(&planned, cancel)
            .await
            .map_err(|e| schedule_conflict(user_id, workout_id, date, e))?;

        info!(
            user.id = %user_id,
            planned_workout.id = %planned.id(),
            workout.id = %workout_id,
            %date,
            "Workout scheduled"
        );
        Ok(planned)
    }

    /// Move a planned workout to another date
    ///
    /// # Errors
    ///
    /// - `PlannedWorkoutNotFound` when it does not exist for this user
    /// - `CannotRescheduleWorkout` when it is not `Planned`
    /// - `WorkoutAlreadyScheduled` when the workout is already scheduled on `new_date`
    pub async fn reschedule_planned_workout(
        &self,
        user_id: Uuid,
        planned_workout_id: Uuid,
        new_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> TrackingResult<PlannedWorkout> {
        let mut planned = self
            .load_planned_workout(user_id, planned_workout_id, cancel)
            .await?;
        let previous_date = planned.scheduled_date();
        planned
            .reschedule(new_date)
            .inspect_err(|e| warn!(planned_workout.id = %planned_workout_id, error = %e, "Rejected reschedule"))?;

        if new_date != previous_date {
            self.ensure_not_scheduled(user_id, planned.workout_id(), new_date, cancel)
                .await?;
        }
        self.planned_workouts
            .update(&planned, cancel)
            .await
            .map_err(|e| schedule_conflict(user_id, planned.workout_id(), new_date, e))?;

        info!(
            planned_workout.id = %planned_workout_id,
            from = %previous_date,
            to = %new_date,
            "Planned workout rescheduled"
        );
        Ok(planned)
    }

    /// Cancel a planned workout that has not been started
    ///
    /// # Errors
    ///
    /// - `PlannedWorkoutNotFound` when it does not exist for this user
    /// - `CannotCancelPlannedWorkout` when it is not `Planned`
    pub async fn cancel_planned_workout(
        &self,
        user_id: Uuid,
        planned_workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<PlannedWorkout> {
        let mut planned = self
            .load_planned_workout(user_id, planned_workout_id, cancel)
            .await?;
        planned.cancel()?;
        self.planned_workouts.update(&planned, cancel).await?;

        info!(planned_workout.id = %planned_workout_id, "Planned workout cancelled");
        Ok(planned)
    }

    /// Get a planned workout of this user
    ///
    /// # Errors
    ///
    /// Returns `PlannedWorkoutNotFound` when it does not exist for this user
    pub async fn get_planned_workout(
        &self,
        user_id: Uuid,
        planned_workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<PlannedWorkout> {
        self.load_planned_workout(user_id, planned_workout_id, cancel)
            .await
    }

    /// Planned workouts scheduled within `[from, to]`, earliest first
    ///
    /// An inverted range yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn get_scheduled_workouts(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> TrackingResult<Vec<PlannedWorkout>> {
        if from > to {
            debug!(user.id = %user_id, %from, %to, "Inverted schedule range");
            return Ok(Vec::new());
        }
        Ok(self
            .planned_workouts
            .list_for_user_between(user_id, from, to, cancel)
            .await?)
    }

    // ── Body metrics ────────────────────────────────────────────────────

    /// Record a body metric or personal record
    ///
    /// # Errors
    ///
    /// Returns `NegativeMetricValue` for a negative value, or a storage error
    pub async fn record_metric(
        &self,
        user_id: Uuid,
        input: MetricInput,
        cancel: &CancellationToken,
    ) -> TrackingResult<UserMetric> {
        let mut metric = UserMetric::record(
            user_id,
            input.metric_type,
            input.value,
            input.unit,
            input.recorded_at.unwrap_or_else(Utc::now),
        )?;
        metric.notes = input.notes;
        self.metrics.add(&metric, cancel).await?;

        info!(
            user.id = %user_id,
            metric.id = %metric.id,
            metric_type = metric.metric_type.as_str(),
            value = metric.value(),
            "Metric recorded"
        );
        Ok(metric)
    }

    /// Correct the value of a recorded metric
    ///
    /// # Errors
    ///
    /// - `MetricNotFound` when the metric does not exist for this user
    /// - `NegativeMetricValue` for a negative value
    pub async fn update_metric(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
        update: MetricUpdate,
        cancel: &CancellationToken,
    ) -> TrackingResult<UserMetric> {
        let mut metric = self.load_metric(user_id, metric_id, cancel).await?;
        metric.update_value(update.value, update.recorded_at.unwrap_or_else(Utc::now))?;
        if let Some(notes) = update.notes {
            metric.notes = Some(notes);
        }
        self.metrics
            .update(&metric, cancel)
            .await
            .map_err(|e| metric_not_found(metric_id, e))?;

        debug!(metric.id = %metric_id, value = metric.value(), "Metric updated");
        Ok(metric)
    }

    /// Delete a recorded metric
    ///
    /// # Errors
    ///
    /// Returns `MetricNotFound` when the metric does not exist for this user
    pub async fn delete_metric(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<()> {
        self.load_metric(user_id, metric_id, cancel).await?;
        self.metrics
            .delete(metric_id, cancel)
            .await
            .map_err(|e| metric_not_found(metric_id, e))?;

        info!(user.id = %user_id, metric.id = %metric_id, "Metric deleted");
        Ok(())
    }

    /// Get a metric of this user
    ///
    /// # Errors
    ///
    /// Returns `MetricNotFound` when the metric does not exist for this user
    pub async fn get_metric(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<UserMetric> {
        self.load_metric(user_id, metric_id, cancel).await
    }

    /// Most recently recorded metric of a type, if any
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn get_latest_metric(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        cancel: &CancellationToken,
    ) -> TrackingResult<Option<UserMetric>> {
        Ok(self
            .metrics
            .get_latest_by_type(user_id, metric_type, cancel)
            .await?)
    }

    /// Metrics of a type, newest first
    ///
    /// # Errors
    ///
    /// Returns a storage error
    pub async fn get_metric_history(
        &self,
        user_id: Uuid,
        metric_type: UserMetricType,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> TrackingResult<Vec<UserMetric>> {
        let limit = clamp_limit(limit, DEFAULT_METRIC_HISTORY);
        Ok(self
            .metrics
            .list_by_type(user_id, metric_type, limit, cancel)
            .await?)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    async fn load_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<WorkoutSession> {
        self.sessions
            .get_by_id(session_id, cancel)
            .await?
            .filter(|session| session.user_id() == user_id)
            .ok_or(TrackingError::WorkoutSessionNotFound { session_id })
    }

    async fn load_planned_workout(
        &self,
        user_id: Uuid,
        planned_workout_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<PlannedWorkout> {
        self.planned_workouts
            .get_by_id(planned_workout_id, cancel)
            .await?
            .filter(|planned| planned.user_id() == user_id)
            .ok_or(TrackingError::PlannedWorkoutNotFound { planned_workout_id })
    }

    async fn load_metric(
        &self,
        user_id: Uuid,
        metric_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<UserMetric> {
        self.metrics
            .get_by_id(metric_id, cancel)
            .await?
            .filter(|metric| metric.user_id == user_id)
            .ok_or(TrackingError::MetricNotFound { metric_id })
    }

    /// Load a session, apply one command, save it
    async fn modify_session<T, F>(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        cancel: &CancellationToken,
        apply: F,
    ) -> TrackingResult<(WorkoutSession, T)>
    where
        F: FnOnce(&mut WorkoutSession) -> TrackingResult<T> + Send,
        T: Send,
    {
        let mut session = self.load_session(user_id, session_id, cancel).await?;
        let output = apply(&mut session)
            .inspect_err(|e| warn!(session.id = %session_id, error = %e, "Rejected session command"))?;
        self.sessions.update(&session, cancel).await?;
        Ok((session, output))
    }

    /// Save a finished session together with its planned workout, when linked
    async fn save_with_link(
        &self,
        session: &WorkoutSession,
        planned: Option<&PlannedWorkout>,
        cancel: &CancellationToken,
    ) -> TrackingResult<()> {
        match planned {
            Some(planned) => {
                self.sessions
                    .update_with_planned(session, planned, cancel)
                    .await?;
            }
            None => self.sessions.update(session, cancel).await?,
        }
        Ok(())
    }

    async fn ensure_no_active_session(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<()> {
        match self
            .sessions
            .get_active_session_for_user(user_id, cancel)
            .await?
        {
            Some(active) => {
                warn!(user.id = %user_id, active_session.id = %active.id(), "User already has an active session");
                Err(TrackingError::UserAlreadyHasActiveWorkoutSession {
                    user_id,
                    active_session_id: Some(active.id()),
                })
            }
            None => Ok(()),
        }
    }

    async fn ensure_not_scheduled(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> TrackingResult<()> {
        if self
            .planned_workouts
            .has_planned_workout(user_id, workout_id, date, cancel)
            .await?
        {
            warn!(user.id = %user_id, workout.id = %workout_id, %date, "Workout already scheduled");
            return Err(TrackingError::WorkoutAlreadyScheduled {
                user_id,
                workout_id,
                date,
            });
        }
        Ok(())
    }

    /// Prior performances of one exercise, excluding `session` itself
    async fn exercise_history(
        &self,
        session: &WorkoutSession,
        exercise_id: Uuid,
        cancel: &CancellationToken,
    ) -> TrackingResult<Vec<WorkoutSessionExercise>> {
        let mut history = self
            .sessions
            .get_history_for_exercise(session.user_id(), exercise_id, cancel)
            .await?;
        history.retain(|entry| entry.session_id != session.id());
        Ok(history)
    }

    async fn collect_history(
        &self,
        session: &WorkoutSession,
        cancel: &CancellationToken,
    ) -> TrackingResult<HistoryByExercise> {
        let mut history = HashMap::with_capacity(session.exercises().len());
        for exercise in session.exercises() {
            let entries = self
                .exercise_history(session, exercise.exercise_id, cancel)
                .await?;
            history.insert(exercise.exercise_id, entries);
        }
        debug!(
            session.id = %session.id(),
            exercises = history.len(),
            entries = history.values().map(Vec::len).sum::<usize>(),
            "Collected exercise history"
        );
        Ok(history)
    }
}

fn active_session_conflict(user_id: Uuid, error: DatabaseError) -> TrackingError {
    if error.is_unique_violation_of(ACTIVE_SESSION_INDEX) {
        warn!(user.id = %user_id, "Concurrent session start rejected by storage");
        TrackingError::UserAlreadyHasActiveWorkoutSession {
            user_id,
            active_session_id: None,
        }
    } else {
        error.into()
    }
}

fn schedule_conflict(
    user_id: Uuid,
    workout_id: Uuid,
    date: NaiveDate,
    error: DatabaseError,
) -> TrackingError {
    if error.is_unique_violation_of(PLANNED_SCHEDULE_INDEX) {
        TrackingError::WorkoutAlreadyScheduled {
            user_id,
            workout_id,
            date,
        }
    } else {
        error.into()
    }
}

fn metric_not_found(metric_id: Uuid, error: DatabaseError) -> TrackingError {
    match error {
        DatabaseError::NotFound { .. } => TrackingError::MetricNotFound { metric_id },
        other => other.into(),
    }
}

fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

fn describe_exercise(exercise: &WorkoutSessionExercise, score: f64) -> ExercisePerformance {
    ExercisePerformance {
        exercise_id: exercise.exercise_id,
        exercise_name: exercise.exercise_name.clone(),
        best_performance: exercise.get_best_performance(),
        score,
        description: PerformanceAnalysisService::get_performance_description(score).to_owned(),
    }
}

fn describe_scores(session: &WorkoutSession, scores: &[(Uuid, f64)]) -> Vec<ExercisePerformance> {
    scores
        .iter()
        .filter_map(|&(exercise_id, score)| {
            session
                .exercise(exercise_id)
                .map(|exercise| describe_exercise(exercise, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 20), 20);
        assert_eq!(clamp_limit(Some(0), 20), 1);
        assert_eq!(clamp_limit(Some(10_000), 20), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_storage_conflicts_map_to_domain_errors() {
        let user_id = Uuid::new_v4();
        let race = DatabaseError::UniqueViolation {
            constraint: "UNIQUE constraint failed: workout_sessions.user_id".into(),
        };
        assert_eq!(
            active_session_conflict(user_id, race),
            TrackingError::UserAlreadyHasActiveWorkoutSession {
                user_id,
                active_session_id: None,
            }
        );

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let workout_id = Uuid::new_v4();
        let duplicate = DatabaseError::UniqueViolation {
            constraint: "UNIQUE constraint failed: planned_workouts.user_id, planned_workouts.workout_id, planned_workouts.scheduled_date".into(),
        };
        assert_eq!(
            schedule_conflict(user_id, workout_id, date, duplicate),
            TrackingError::WorkoutAlreadyScheduled {
                user_id,
                workout_id,
                date,
            }
        );

        assert_eq!(
            active_session_conflict(user_id, DatabaseError::Cancelled),
            TrackingError::Cancelled
        );
    }

    #[test]
    fn test_missing_metric_maps_to_metric_not_found() {
        let metric_id = Uuid::new_v4();
        let error = DatabaseError::NotFound {
            entity_type: "user_metric",
            entity_id: metric_id.to_string(),
        };
        assert_eq!(
            metric_not_found(metric_id, error),
            TrackingError::MetricNotFound { metric_id }
        );
    }
}
