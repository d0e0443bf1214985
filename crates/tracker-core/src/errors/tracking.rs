// ABOUTME: Closed taxonomy of workout tracking failures raised by aggregates and the orchestrator
// ABOUTME: Each variant carries the structured data of the violation; rendering happens at the boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tracking Error Types
//!
//! One variant per failure the tracking core can produce:
//! - state-transition violations (session and planned-workout state machines)
//! - data-integrity violations (exercise/set/metric validation)
//! - conflicts (single active session, duplicate schedule, stale saves)
//! - not-found results for commands addressing a missing aggregate
//!
//! Storage failures and cooperative cancellation are carried alongside so that
//! every orchestration operation has a single error type.

use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use super::{DatabaseError, ErrorCode};
use crate::models::{PlannedWorkoutStatus, SessionStatus};

/// Result alias for tracking operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Coarse classification of a [`TrackingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Operation attempted from a lifecycle state that forbids it
    StateTransition,
    /// Input or aggregate content violates a data rule
    DataIntegrity,
    /// Operation conflicts with another aggregate
    Conflict,
    /// Addressed aggregate does not exist
    NotFound,
    /// Storage failure or cancellation
    Infrastructure,
}

/// Errors raised by workout tracking aggregates and the tracking service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    // ── State-transition violations ─────────────────────────────────────
    /// Session is not in the status the operation requires
    #[error("Workout session {session_id} is {actual}, expected {expected}")]
    InvalidSessionStatus {
        /// Session that rejected the operation
        session_id: Uuid,
        /// Status the operation requires
        expected: SessionStatus,
        /// Status the session is in
        actual: SessionStatus,
    },

    /// Session cannot be started from its current status
    #[error("Workout session {session_id} cannot be started while {status}")]
    CannotStartSession {
        /// Session that was asked to start
        session_id: Uuid,
        /// Current status
        status: SessionStatus,
    },

    /// Session cannot be completed from its current status
    #[error("Workout session {session_id} cannot be completed while {status}")]
    CannotCompleteSession {
        /// Session that was asked to complete
        session_id: Uuid,
        /// Current status
        status: SessionStatus,
    },

    /// Session cannot be abandoned from its current status
    #[error("Workout session {session_id} cannot be abandoned while {status}")]
    CannotAbandonSession {
        /// Session that was asked to abandon
        session_id: Uuid,
        /// Current status
        status: SessionStatus,
    },

    /// Planned workout cannot be started from its current status
    #[error("Planned workout {planned_workout_id} cannot be started while {status}")]
    CannotStartPlannedWorkout {
        /// Planned workout that was asked to start
        planned_workout_id: Uuid,
        /// Current status
        status: PlannedWorkoutStatus,
    },

    /// Planned workout cannot be rescheduled from its current status
    #[error("Planned workout {planned_workout_id} cannot be rescheduled while {status}")]
    CannotRescheduleWorkout {
        /// Planned workout that was asked to move
        planned_workout_id: Uuid,
        /// Current status
        status: PlannedWorkoutStatus,
    },

    /// Planned workout cannot be completed from its current status
    #[error("Planned workout {planned_workout_id} cannot be completed while {status}")]
    CannotCompletePlannedWorkout {
        /// Planned workout that was asked to complete
        planned_workout_id: Uuid,
        /// Current status
        status: PlannedWorkoutStatus,
    },

    /// Planned workout cannot be cancelled from its current status
    #[error("Planned workout {planned_workout_id} cannot be cancelled while {status}")]
    CannotCancelPlannedWorkout {
        /// Planned workout that was asked to cancel
        planned_workout_id: Uuid,
        /// Current status
        status: PlannedWorkoutStatus,
    },

    /// Planned workout cannot be abandoned from its current status
    #[error("Planned workout {planned_workout_id} cannot be abandoned while {status}")]
    CannotAbandonPlannedWorkout {
        /// Planned workout that was asked to abandon
        planned_workout_id: Uuid,
        /// Current status
        status: PlannedWorkoutStatus,
    },

    // ── Data integrity violations ───────────────────────────────────────
    /// Exercise is already part of the session
    #[error("Exercise {exercise_id} is already part of workout session {session_id}")]
    ExerciseAlreadyExists {
        /// Session holding the exercise
        session_id: Uuid,
        /// Duplicate exercise
        exercise_id: Uuid,
    },

    /// Exercise is not part of the session
    #[error("Exercise {exercise_id} is not part of workout session {session_id}")]
    ExerciseNotFoundInSession {
        /// Session that was searched
        session_id: Uuid,
        /// Missing exercise
        exercise_id: Uuid,
    },

    /// Set carries none of repetitions, weight, duration or distance
    #[error("A set for exercise {exercise_id} needs repetitions, weight, duration or distance")]
    NoExerciseParameters {
        /// Exercise the set was recorded for
        exercise_id: Uuid,
    },

    /// A measured value is negative
    #[error("{field} must not be negative (got {value})")]
    NegativeMetricValue {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Exercise order positions start at one
    #[error("Exercise order must be at least 1 (got {order})")]
    OrderMustBeAtLeastOne {
        /// Rejected position
        order: u32,
    },

    /// Set number does not exist for the exercise
    #[error("Set {set_number} does not exist for exercise {exercise_id}")]
    SetNotFound {
        /// Exercise that was searched
        exercise_id: Uuid,
        /// Missing set number
        set_number: u32,
    },

    /// Performance score outside `[0, 100]`
    #[error("Performance score {score} is outside the range 0-100")]
    PerformanceScoreOutOfRange {
        /// Rejected score
        score: f64,
    },

    // ── Cross-aggregate conflicts ───────────────────────────────────────
    /// User already has a session in progress
    #[error("User {user_id} already has an active workout session")]
    UserAlreadyHasActiveWorkoutSession {
        /// User attempting to start a second session
        user_id: Uuid,
        /// Active session, when known (absent when the storage constraint caught the race)
        active_session_id: Option<Uuid>,
    },

    /// Same workout already scheduled for the same user and date
    #[error("Workout {workout_id} is already scheduled for user {user_id} on {date}")]
    WorkoutAlreadyScheduled {
        /// Scheduling user
        user_id: Uuid,
        /// Workout template
        workout_id: Uuid,
        /// Scheduled date
        date: NaiveDate,
    },

    /// Aggregate was saved by another request after this one loaded it
    #[error("{entity_type} {entity_id} was modified concurrently, reload and retry")]
    ConcurrentModification {
        /// Aggregate name
        entity_type: &'static str,
        /// Aggregate identifier
        entity_id: String,
    },

    // ── Not found ───────────────────────────────────────────────────────
    /// Body metric does not exist for this user
    #[error("Metric {metric_id} not found")]
    MetricNotFound {
        /// Requested metric
        metric_id: Uuid,
    },

    /// Workout session does not exist for this user
    #[error("Workout session {session_id} not found")]
    WorkoutSessionNotFound {
        /// Requested session
        session_id: Uuid,
    },

    /// Planned workout does not exist for this user
    #[error("Planned workout {planned_workout_id} not found")]
    PlannedWorkoutNotFound {
        /// Requested planned workout
        planned_workout_id: Uuid,
    },

    // ── Infrastructure ──────────────────────────────────────────────────
    /// Caller cancelled the operation; nothing was persisted by the cancelled step
    #[error("Operation cancelled")]
    Cancelled,

    /// Storage failure
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for TrackingError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Cancelled => Self::Cancelled,
            DatabaseError::StaleVersion {
                entity_type,
                entity_id,
            } => Self::ConcurrentModification {
                entity_type,
                entity_id,
            },
            other => Self::Database(other),
        }
    }
}

impl TrackingError {
    /// Taxonomy family of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSessionStatus { .. }
            | Self::CannotStartSession { .. }
            | Self::CannotCompleteSession { .. }
            | Self::CannotAbandonSession { .. }
            | Self::CannotStartPlannedWorkout { .. }
            | Self::CannotRescheduleWorkout { .. }
            | Self::CannotCompletePlannedWorkout { .. }
            | Self::CannotCancelPlannedWorkout { .. }
            | Self::CannotAbandonPlannedWorkout { .. } => ErrorCategory::StateTransition,
            Self::ExerciseAlreadyExists { .. }
            | Self::ExerciseNotFoundInSession { .. }
            | Self::NoExerciseParameters { .. }
            | Self::NegativeMetricValue { .. }
            | Self::OrderMustBeAtLeastOne { .. }
            | Self::SetNotFound { .. }
            | Self::PerformanceScoreOutOfRange { .. } => ErrorCategory::DataIntegrity,
            Self::UserAlreadyHasActiveWorkoutSession { .. }
            | Self::WorkoutAlreadyScheduled { .. }
            | Self::ConcurrentModification { .. } => ErrorCategory::Conflict,
            Self::MetricNotFound { .. }
            | Self::WorkoutSessionNotFound { .. }
            | Self::PlannedWorkoutNotFound { .. } => ErrorCategory::NotFound,
            Self::Cancelled | Self::Database(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Stable error code used when rendering this error at the boundary
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ExerciseNotFoundInSession { .. } | Self::SetNotFound { .. } => {
                ErrorCode::ResourceNotFound
            }
            Self::NegativeMetricValue { .. }
            | Self::OrderMustBeAtLeastOne { .. }
            | Self::PerformanceScoreOutOfRange { .. } => ErrorCode::ValueOutOfRange,
            Self::NoExerciseParameters { .. } => ErrorCode::MissingRequiredField,
            Self::ExerciseAlreadyExists { .. } => ErrorCode::ResourceAlreadyExists,
            Self::Cancelled => ErrorCode::OperationCancelled,
            Self::ConcurrentModification { .. } => ErrorCode::ConcurrentModification,
            Self::Database(db) => db.code(),
            other => match other.category() {
                ErrorCategory::StateTransition => ErrorCode::InvalidState,
                ErrorCategory::Conflict => ErrorCode::ResourceAlreadyExists,
                ErrorCategory::NotFound => ErrorCode::ResourceNotFound,
                ErrorCategory::DataIntegrity => ErrorCode::InvalidInput,
                ErrorCategory::Infrastructure => ErrorCode::InternalError,
            },
        }
    }

    /// Structured fields of the violation, for boundary rendering
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::InvalidSessionStatus {
                session_id,
                expected,
                actual,
            } => json!({ "session_id": session_id, "expected": expected, "actual": actual }),
            Self::CannotStartSession { session_id, status }
            | Self::CannotCompleteSession { session_id, status }
            | Self::CannotAbandonSession { session_id, status } => {
                json!({ "session_id": session_id, "status": status })
            }
            Self::CannotStartPlannedWorkout {
                planned_workout_id,
                status,
            }
            | Self::CannotRescheduleWorkout {
                planned_workout_id,
                status,
            }
            | Self::CannotCompletePlannedWorkout {
                planned_workout_id,
                status,
            }
            | Self::CannotCancelPlannedWorkout {
                planned_workout_id,
                status,
            }
            | Self::CannotAbandonPlannedWorkout {
                planned_workout_id,
                status,
            } => json!({ "planned_workout_id": planned_workout_id, "status": status }),
            Self::ExerciseAlreadyExists {
                session_id,
                exercise_id,
            }
            | Self::ExerciseNotFoundInSession {
                session_id,
                exercise_id,
            } => json!({ "session_id": session_id, "exercise_id": exercise_id }),
            Self::NoExerciseParameters { exercise_id } => json!({ "exercise_id": exercise_id }),
            Self::NegativeMetricValue { field, value } => json!({ "field": field, "value": value }),
            Self::OrderMustBeAtLeastOne { order } => json!({ "order": order }),
            Self::SetNotFound {
                exercise_id,
                set_number,
            } => json!({ "exercise_id": exercise_id, "set_number": set_number }),
            Self::PerformanceScoreOutOfRange { score } => json!({ "score": score }),
            Self::UserAlreadyHasActiveWorkoutSession {
                user_id,
                active_session_id,
            } => json!({ "user_id": user_id, "active_session_id": active_session_id }),
            Self::WorkoutAlreadyScheduled {
                user_id,
                workout_id,
                date,
            } => json!({ "user_id": user_id, "workout_id": workout_id, "date": date }),
            Self::ConcurrentModification {
                entity_type,
                entity_id,
            } => json!({ "entity_type": entity_type, "entity_id": entity_id }),
            Self::MetricNotFound { metric_id } => json!({ "metric_id": metric_id }),
            Self::WorkoutSessionNotFound { session_id } => json!({ "session_id": session_id }),
            Self::PlannedWorkoutNotFound { planned_workout_id } => {
                json!({ "planned_workout_id": planned_workout_id })
            }
            Self::Cancelled | Self::Database(_) => serde_json::Value::Null,
        }
    }

    /// Whether this is a not-found result
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.category(), ErrorCategory::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_taxonomy() {
        let id = Uuid::new_v4();
        assert_eq!(
            TrackingError::CannotRescheduleWorkout {
                planned_workout_id: id,
                status: PlannedWorkoutStatus::Completed,
            }
            .category(),
            ErrorCategory::StateTransition
        );
        assert_eq!(
            TrackingError::NoExerciseParameters { exercise_id: id }.category(),
            ErrorCategory::DataIntegrity
        );
        assert_eq!(
            TrackingError::UserAlreadyHasActiveWorkoutSession {
                user_id: id,
                active_session_id: None,
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert!(TrackingError::MetricNotFound { metric_id: id }.is_not_found());
        assert_eq!(TrackingError::Cancelled.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            TrackingError::WorkoutAlreadyScheduled {
                user_id: id,
                workout_id: id,
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            }
            .code(),
            ErrorCode::ResourceAlreadyExists
        );
        assert_eq!(
            TrackingError::CannotCompleteSession {
                session_id: id,
                status: SessionStatus::Planned,
            }
            .code(),
            ErrorCode::InvalidState
        );
        assert_eq!(
            TrackingError::PerformanceScoreOutOfRange { score: 120.0 }.code(),
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn test_storage_cancellation_is_cancelled() {
        assert_eq!(
            TrackingError::from(DatabaseError::Cancelled),
            TrackingError::Cancelled
        );
        assert!(matches!(
            TrackingError::from(DatabaseError::ConnectionError("closed".into())),
            TrackingError::Database(_)
        ));
    }

    #[test]
    fn test_stale_save_is_a_conflict() {
        let err = TrackingError::from(DatabaseError::StaleVersion {
            entity_type: "workout_session",
            entity_id: "abc".into(),
        });
        assert_eq!(
            err,
            TrackingError::ConcurrentModification {
                entity_type: "workout_session",
                entity_id: "abc".into(),
            }
        );
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.code(), ErrorCode::ConcurrentModification);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display_uses_structured_fields() {
        let err = TrackingError::NegativeMetricValue {
            field: "weight",
            value: -2.5,
        };
        assert_eq!(err.to_string(), "weight must not be negative (got -2.5)");
    }
}
