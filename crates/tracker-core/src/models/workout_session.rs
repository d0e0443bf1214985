// ABOUTME: Workout session aggregate with exercises, sets, and the session state machine
// ABOUTME: WorkoutSession, WorkoutSessionExercise, WorkoutSessionSet and their status enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::scoring::{MAX_SCORE, MIN_SCORE};
use crate::errors::{TrackingError, TrackingResult};

/// Lifecycle status of a workout session
///
/// ```text
/// Planned ──start──> InProgress ──complete──> Completed
///    │                    └──────abandon────> Abandoned
///    └──cancel──> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created but not started
    Planned,
    /// Currently being performed
    InProgress,
    /// Finished normally
    Completed,
    /// Stopped before finishing
    Abandoned,
    /// Withdrawn before it started
    Cancelled,
}

impl SessionStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// No transition leaves a terminal status
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned | Self::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subjective rating of how hard a completed session felt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceivedDifficulty {
    /// Barely an effort
    VeryEasy,
    /// Comfortable
    Easy,
    /// Challenging but sustainable
    Moderate,
    /// Near the limit
    Hard,
    /// Maximal effort
    VeryHard,
}

impl PerceivedDifficulty {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VeryEasy => "very_easy",
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
            Self::VeryHard => "very_hard",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "very_easy" => Some(Self::VeryEasy),
            "easy" => Some(Self::Easy),
            "moderate" => Some(Self::Moderate),
            "hard" => Some(Self::Hard),
            "very_hard" => Some(Self::VeryHard),
            _ => None,
        }
    }
}

/// How an exercise's effort is measured; decides which set fields count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMetricType {
    /// Repetitions, optionally loaded with weight
    Repetition,
    /// Time under effort in seconds
    Duration,
    /// Distance covered
    Distance,
}

impl ExerciseMetricType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Repetition => "repetition",
            Self::Duration => "duration",
            Self::Distance => "distance",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "repetition" => Some(Self::Repetition),
            "duration" => Some(Self::Duration),
            "distance" => Some(Self::Distance),
            _ => None,
        }
    }
}

/// Measured values of one set, as supplied by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetParameters {
    /// Repetitions performed
    pub repetitions: Option<u32>,
    /// Load moved per repetition
    pub weight: Option<f64>,
    /// Time under effort in seconds
    pub duration_seconds: Option<u32>,
    /// Distance covered
    pub distance: Option<f64>,
    /// Rest taken after the set, in seconds
    pub rest_time_seconds: Option<u32>,
}

impl SetParameters {
    /// Repetitions with an optional load
    #[must_use]
    pub const fn reps(repetitions: u32, weight: Option<f64>) -> Self {
        Self {
            repetitions: Some(repetitions),
            weight,
            duration_seconds: None,
            distance: None,
            rest_time_seconds: None,
        }
    }

    /// A timed effort
    #[must_use]
    pub const fn duration(seconds: u32) -> Self {
        Self {
            repetitions: None,
            weight: None,
            duration_seconds: Some(seconds),
            distance: None,
            rest_time_seconds: None,
        }
    }

    /// A distance effort
    #[must_use]
    pub const fn distance(distance: f64) -> Self {
        Self {
            repetitions: None,
            weight: None,
            duration_seconds: None,
            distance: Some(distance),
            rest_time_seconds: None,
        }
    }

    /// Set the rest taken after the set
    #[must_use]
    pub const fn with_rest(mut self, seconds: u32) -> Self {
        self.rest_time_seconds = Some(seconds);
        self
    }

    const fn has_measurement(&self) -> bool {
        self.repetitions.is_some()
            || self.weight.is_some()
            || self.duration_seconds.is_some()
            || self.distance.is_some()
    }
}

/// One recorded set; immutable once appended to its exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionSet {
    /// 1-based position within the exercise
    pub set_number: u32,
    /// Repetitions performed
    pub repetitions: Option<u32>,
    /// Load moved per repetition
    pub weight: Option<f64>,
    /// Time under effort in seconds
    pub duration_seconds: Option<u32>,
    /// Distance covered
    pub distance: Option<f64>,
    /// Rest taken after the set, in seconds
    pub rest_time_seconds: Option<u32>,
    /// When the set was recorded
    pub recorded_at: DateTime<Utc>,
}

impl WorkoutSessionSet {
    /// Validate measured values and build a set
    ///
    /// # Errors
    ///
    /// - `NoExerciseParameters` when repetitions, weight, duration and distance are all absent
    /// - `NegativeMetricValue` when weight or distance is negative
    pub fn new(
        exercise_id: Uuid,
        set_number: u32,
        params: SetParameters,
        recorded_at: DateTime<Utc>,
    ) -> TrackingResult<Self> {
        if !params.has_measurement() {
            return Err(TrackingError::NoExerciseParameters { exercise_id });
        }
        ensure_non_negative("weight", params.weight)?;
        ensure_non_negative("distance", params.distance)?;

        Ok(Self {
            set_number,
            repetitions: params.repetitions,
            weight: params.weight,
            duration_seconds: params.duration_seconds,
            distance: params.distance,
            rest_time_seconds: params.rest_time_seconds,
            recorded_at,
        })
    }

    /// Comparable value of this set under the given metric
    ///
    /// Repetition sets score `reps * weight`, or plain `reps` when no weight was
    /// recorded. A set without the metric's field has no value.
    #[must_use]
    pub fn performance_value(&self, metric_type: ExerciseMetricType) -> Option<f64> {
        match metric_type {
            ExerciseMetricType::Repetition => self.repetitions.map(|reps| {
                let reps = f64::from(reps);
                self.weight.map_or(reps, |weight| reps * weight)
            }),
            ExerciseMetricType::Duration => self.duration_seconds.map(f64::from),
            ExerciseMetricType::Distance => self.distance,
        }
    }
}

fn ensure_non_negative(field: &'static str, value: Option<f64>) -> TrackingResult<()> {
    match value {
        Some(v) if v < 0.0 || v.is_nan() => Err(TrackingError::NegativeMetricValue { field, value: v }),
        _ => Ok(()),
    }
}

/// One exercise performed within a session, owning its sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionExercise {
    /// Owning session
    pub session_id: Uuid,
    /// Exercise catalog identifier
    pub exercise_id: Uuid,
    /// Exercise name captured when the exercise was added
    pub exercise_name: String,
    /// Measurement kind
    pub metric_type: ExerciseMetricType,
    /// 1-based position within the session
    pub order: u32,
    /// Recorded sets, numbered 1..n
    pub sets: Vec<WorkoutSessionSet>,
    /// Score against history, recorded on completion
    pub performance_score: Option<f64>,
}

impl WorkoutSessionExercise {
    /// Create an exercise with no sets
    pub fn new(
        session_id: Uuid,
        exercise_id: Uuid,
        exercise_name: impl Into<String>,
        metric_type: ExerciseMetricType,
        order: u32,
    ) -> Self {
        Self {
            session_id,
            exercise_id,
            exercise_name: exercise_name.into(),
            metric_type,
            order,
            sets: Vec::new(),
            performance_score: None,
        }
    }

    /// Highest single-set value, or `None` when no set is measurable
    #[must_use]
    pub fn get_best_performance(&self) -> Option<f64> {
        self.sets
            .iter()
            .filter_map(|set| set.performance_value(self.metric_type))
            .reduce(f64::max)
    }

    /// Whether any set has been recorded
    #[must_use]
    pub fn has_sets(&self) -> bool {
        !self.sets.is_empty()
    }

    /// Number of recorded sets
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Store the score of this exercise against history
    ///
    /// # Errors
    ///
    /// Returns `PerformanceScoreOutOfRange` when the score is outside `[0, 100]`
    pub fn record_performance_score(&mut self, score: f64) -> TrackingResult<()> {
        validate_score(score)?;
        self.performance_score = Some(score);
        Ok(())
    }
}

fn validate_score(score: f64) -> TrackingResult<()> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(TrackingError::PerformanceScoreOutOfRange { score })
    }
}

/// Flat persisted form of a session's own columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionRecord {
    /// Session identifier
    pub id: Uuid,
    /// Performing user
    pub user_id: Uuid,
    /// Workout template
    pub workout_id: Uuid,
    /// Planned workout this session executes, if any
    pub planned_workout_id: Option<Uuid>,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Set once on entering `InProgress`
    pub started_at: Option<DateTime<Utc>>,
    /// Set once on entering `Completed` or `Abandoned`
    pub completed_at: Option<DateTime<Utc>>,
    /// Rating given on completion
    pub perceived_difficulty: Option<PerceivedDifficulty>,
    /// Free-form notes given on completion
    pub notes: Option<String>,
    /// Reason given on abandon
    pub abandon_reason: Option<String>,
    /// Whole-session score, recorded on completion
    pub workout_score: Option<f64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
    /// Stored version this state was loaded at; each save advances it by one
    pub version: u32,
}

/// One execution of a workout by a user
///
/// Fields are private: status and timestamps only move through the transition
/// methods, and exercises/sets are only reachable by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    id: Uuid,
    user_id: Uuid,
    workout_id: Uuid,
    planned_workout_id: Option<Uuid>,
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    perceived_difficulty: Option<PerceivedDifficulty>,
    notes: Option<String>,
    abandon_reason: Option<String>,
    workout_score: Option<f64>,
    exercises: Vec<WorkoutSessionExercise>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u32,
}

impl WorkoutSession {
    /// Create a session in `Planned` status
    #[must_use]
    pub fn new_planned(user_id: Uuid, workout_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            workout_id,
            planned_workout_id: None,
            status: SessionStatus::Planned,
            started_at: None,
            completed_at: None,
            perceived_difficulty: None,
            notes: None,
            abandon_reason: None,
            workout_score: None,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Create a session directly in `InProgress` (ad-hoc start)
    #[must_use]
    pub fn start_ad_hoc(user_id: Uuid, workout_id: Uuid) -> Self {
        let mut session = Self::new_planned(user_id, workout_id);
        session.status = SessionStatus::InProgress;
        session.started_at = Some(session.created_at);
        session
    }

    /// Link this session to the planned workout it executes
    #[must_use]
    pub const fn for_planned_workout(mut self, planned_workout_id: Uuid) -> Self {
        self.planned_workout_id = Some(planned_workout_id);
        self
    }

    /// Rebuild a session from storage
    #[must_use]
    pub fn restore(record: WorkoutSessionRecord, mut exercises: Vec<WorkoutSessionExercise>) -> Self {
        exercises.sort_by_key(|e| e.order);
        for exercise in &mut exercises {
            exercise.sets.sort_by_key(|s| s.set_number);
        }
        Self {
            id: record.id,
            user_id: record.user_id,
            workout_id: record.workout_id,
            planned_workout_id: record.planned_workout_id,
            status: record.status,
            started_at: record.started_at,
            completed_at: record.completed_at,
            perceived_difficulty: record.perceived_difficulty,
            notes: record.notes,
            abandon_reason: record.abandon_reason,
            workout_score: record.workout_score,
            exercises,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
        }
    }

    /// Flat persisted form of the session's own columns
    #[must_use]
    pub fn to_record(&self) -> WorkoutSessionRecord {
        WorkoutSessionRecord {
            id: self.id,
            user_id: self.user_id,
            workout_id: self.workout_id,
            planned_workout_id: self.planned_workout_id,
            status: self.status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            perceived_difficulty: self.perceived_difficulty,
            notes: self.notes.clone(),
            abandon_reason: self.abandon_reason.clone(),
            workout_score: self.workout_score,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// `Planned -> InProgress`, stamping `started_at`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSessionStatus` unless the session is `Planned`
    pub fn start(&mut self) -> TrackingResult<()> {
        if self.status != SessionStatus::Planned {
            return Err(self.invalid_status(SessionStatus::Planned));
        }
        let now = Utc::now();
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `InProgress -> Completed`, stamping `completed_at` and the difficulty rating
    ///
    /// # Errors
    ///
    /// Returns `CannotCompleteSession` unless the session is `InProgress` and started
    pub fn complete(
        &mut self,
        perceived_difficulty: PerceivedDifficulty,
        notes: Option<String>,
    ) -> TrackingResult<()> {
        if self.status != SessionStatus::InProgress || self.started_at.is_none() {
            return Err(TrackingError::CannotCompleteSession {
                session_id: self.id,
                status: self.status,
            });
        }
        let now = Utc::now();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        self.perceived_difficulty = Some(perceived_difficulty);
        self.notes = notes;
        self.updated_at = now;
        Ok(())
    }

    /// `InProgress -> Abandoned`, stamping `completed_at`
    ///
    /// # Errors
    ///
    /// Returns `CannotAbandonSession` unless the session is `InProgress`
    pub fn abandon(&mut self, reason: Option<String>) -> TrackingResult<()> {
        if self.status != SessionStatus::InProgress {
            return Err(TrackingError::CannotAbandonSession {
                session_id: self.id,
                status: self.status,
            });
        }
        let now = Utc::now();
        self.status = SessionStatus::Abandoned;
        self.completed_at = Some(now);
        self.abandon_reason = reason;
        self.updated_at = now;
        Ok(())
    }

    /// `Planned -> Cancelled`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSessionStatus` unless the session is `Planned`
    pub fn cancel(&mut self) -> TrackingResult<()> {
        if self.status != SessionStatus::Planned {
            return Err(self.invalid_status(SessionStatus::Planned));
        }
        self.status = SessionStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ── Exercise and set commands (InProgress only) ─────────────────────

    /// Append an exercise at position `count + 1`
    ///
    /// # Errors
    ///
    /// - `InvalidSessionStatus` unless `InProgress`
    /// - `ExerciseAlreadyExists` when the exercise is already in the session
    pub fn add_exercise(
        &mut self,
        exercise_id: Uuid,
        exercise_name: impl Into<String>,
        metric_type: ExerciseMetricType,
    ) -> TrackingResult<&WorkoutSessionExercise> {
        self.ensure_in_progress()?;
        if self.exercise(exercise_id).is_some() {
            return Err(TrackingError::ExerciseAlreadyExists {
                session_id: self.id,
                exercise_id,
            });
        }

        let order = next_position(self.exercises.len());
        self.exercises.push(WorkoutSessionExercise::new(
            self.id,
            exercise_id,
            exercise_name,
            metric_type,
            order,
        ));
        self.updated_at = Utc::now();
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    /// Remove an exercise and its sets; later exercises move up one position
    ///
    /// # Errors
    ///
    /// - `InvalidSessionStatus` unless `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    pub fn remove_exercise(&mut self, exercise_id: Uuid) -> TrackingResult<()> {
        self.ensure_in_progress()?;
        let index = self.exercise_index(exercise_id)?;
        self.exercises.remove(index);
        self.renumber_exercises();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move an exercise to `new_order`; positions stay contiguous from 1
    ///
    /// Positions past the end place the exercise last.
    ///
    /// # Errors
    ///
    /// - `OrderMustBeAtLeastOne` when `new_order` is 0
    /// - `InvalidSessionStatus` unless `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    pub fn reorder_exercise(&mut self, exercise_id: Uuid, new_order: u32) -> TrackingResult<()> {
        if new_order < 1 {
            return Err(TrackingError::OrderMustBeAtLeastOne { order: new_order });
        }
        self.ensure_in_progress()?;
        let index = self.exercise_index(exercise_id)?;

        let exercise = self.exercises.remove(index);
        let target = (new_order as usize - 1).min(self.exercises.len());
        self.exercises.insert(target, exercise);
        self.renumber_exercises();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append a set numbered `count + 1` to an exercise
    ///
    /// # Errors
    ///
    /// - `InvalidSessionStatus` unless `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    /// - `NoExerciseParameters` / `NegativeMetricValue` for invalid measurements
    pub fn add_set(
        &mut self,
        exercise_id: Uuid,
        params: SetParameters,
    ) -> TrackingResult<&WorkoutSessionSet> {
        self.ensure_in_progress()?;
        let index = self.exercise_index(exercise_id)?;
        let now = Utc::now();

        let exercise = &mut self.exercises[index];
        let set = WorkoutSessionSet::new(
            exercise_id,
            next_position(exercise.sets.len()),
            params,
            now,
        )?;
        exercise.sets.push(set);
        self.updated_at = now;

        let sets = &self.exercises[index].sets;
        Ok(&sets[sets.len() - 1])
    }

    /// Remove a set; later sets of the exercise are renumbered down by one
    ///
    /// # Errors
    ///
    /// - `InvalidSessionStatus` unless `InProgress`
    /// - `ExerciseNotFoundInSession` when the exercise is absent
    /// - `SetNotFound` when no set has that number
    pub fn remove_set(&mut self, exercise_id: Uuid, set_number: u32) -> TrackingResult<()> {
        self.ensure_in_progress()?;
        let index = self.exercise_index(exercise_id)?;
        let exercise = &mut self.exercises[index];

        let position = exercise
            .sets
            .iter()
            .position(|s| s.set_number == set_number)
            .ok_or(TrackingError::SetNotFound {
                exercise_id,
                set_number,
            })?;
        exercise.sets.remove(position);
        for (i, set) in exercise.sets.iter_mut().enumerate() {
            set.set_number = next_position(i);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record per-exercise scores and the whole-session score
    ///
    /// All scores are validated before any is stored, so a rejected call leaves
    /// the session unchanged.
    ///
    /// # Errors
    ///
    /// - `PerformanceScoreOutOfRange` for any score outside `[0, 100]`
    /// - `ExerciseNotFoundInSession` for a score addressed to an unknown exercise
    pub fn record_scores(
        &mut self,
        exercise_scores: &[(Uuid, f64)],
        workout_score: f64,
    ) -> TrackingResult<()> {
        validate_score(workout_score)?;
        for &(exercise_id, score) in exercise_scores {
            validate_score(score)?;
            self.exercise_index(exercise_id)?;
        }

        for &(exercise_id, score) in exercise_scores {
            let index = self.exercise_index(exercise_id)?;
            self.exercises[index].record_performance_score(score)?;
        }
        self.workout_score = Some(workout_score);
        self.updated_at = Utc::now();
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Performing user
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Workout template
    #[must_use]
    pub const fn workout_id(&self) -> Uuid {
        self.workout_id
    }

    /// Planned workout this session executes
    #[must_use]
    pub const fn planned_workout_id(&self) -> Option<Uuid> {
        self.planned_workout_id
    }

    /// Lifecycle status
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// When the session entered `InProgress`
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the session was completed or abandoned
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Rating given on completion
    #[must_use]
    pub const fn perceived_difficulty(&self) -> Option<PerceivedDifficulty> {
        self.perceived_difficulty
    }

    /// Notes given on completion
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Reason given on abandon
    #[must_use]
    pub fn abandon_reason(&self) -> Option<&str> {
        self.abandon_reason.as_deref()
    }

    /// Whole-session score recorded on completion
    #[must_use]
    pub const fn workout_score(&self) -> Option<f64> {
        self.workout_score
    }

    /// Exercises in order
    #[must_use]
    pub fn exercises(&self) -> &[WorkoutSessionExercise] {
        &self.exercises
    }

    /// Look up an exercise by catalog id
    #[must_use]
    pub fn exercise(&self, exercise_id: Uuid) -> Option<&WorkoutSessionExercise> {
        self.exercises.iter().find(|e| e.exercise_id == exercise_id)
    }

    /// Creation timestamp
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stored version this value was loaded at, 0 before the first save
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Elapsed time between start and completion
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        Some(self.completed_at? - self.started_at?)
    }

    /// Whether every exercise has at least one set
    #[must_use]
    pub fn all_exercises_have_sets(&self) -> bool {
        self.exercises.iter().all(WorkoutSessionExercise::has_sets)
    }

    fn ensure_in_progress(&self) -> TrackingResult<()> {
        if self.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(self.invalid_status(SessionStatus::InProgress))
        }
    }

    const fn invalid_status(&self, expected: SessionStatus) -> TrackingError {
        TrackingError::InvalidSessionStatus {
            session_id: self.id,
            expected,
            actual: self.status,
        }
    }

    fn exercise_index(&self, exercise_id: Uuid) -> TrackingResult<usize> {
        self.exercises
            .iter()
            .position(|e| e.exercise_id == exercise_id)
            .ok_or(TrackingError::ExerciseNotFoundInSession {
                session_id: self.id,
                exercise_id,
            })
    }

    fn renumber_exercises(&mut self) {
        for (i, exercise) in self.exercises.iter_mut().enumerate() {
            exercise.order = next_position(i);
        }
    }
}

/// 1-based position following `count` existing items
fn next_position(count: usize) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |c| c.saturating_add(1))
}
