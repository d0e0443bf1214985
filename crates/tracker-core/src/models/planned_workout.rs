// ABOUTME: Planned workout aggregate scheduling a workout template for a calendar date
// ABOUTME: PlannedWorkout state machine with overdue detection and session linkage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{TrackingError, TrackingResult};

/// Lifecycle status of a planned workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedWorkoutStatus {
    /// Scheduled and not yet started
    Planned,
    /// A session executing it is under way
    InProgress,
    /// Its session completed
    Completed,
    /// Its session was abandoned
    Abandoned,
    /// Withdrawn before it started
    Cancelled,
}

impl PlannedWorkoutStatus {
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
}

impl fmt::Display for PlannedWorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat persisted form of a planned workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWorkoutRecord {
    /// Planned workout identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Workout template
    pub workout_id: Uuid,
    /// Calendar date it is scheduled for
    pub scheduled_date: NaiveDate,
    /// Lifecycle status
    pub status: PlannedWorkoutStatus,
    /// Program that generated it, if any
    pub program_id: Option<Uuid>,
    /// Session executing it, set on start
    pub workout_session_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
    /// Stored version this state was loaded at; each save advances it by one
    pub version: u32,
}

/// A workout template scheduled for a specific date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWorkout {
    id: Uuid,
    user_id: Uuid,
    workout_id: Uuid,
    scheduled_date: NaiveDate,
    status: PlannedWorkoutStatus,
    program_id: Option<Uuid>,
    workout_session_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u32,
}

impl PlannedWorkout {
    /// Schedule a workout; `program_id` marks it as generated by a training program
    #[must_use]
    pub fn schedule(
        user_id: Uuid,
        workout_id: Uuid,
        scheduled_date: NaiveDate,
        program_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            workout_id,
            scheduled_date,
            status: PlannedWorkoutStatus::Planned,
            program_id,
            workout_session_id: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Rebuild a planned workout from storage
    #[must_use]
    pub const fn restore(record: PlannedWorkoutRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            workout_id: record.workout_id,
            scheduled_date: record.scheduled_date,
            status: record.status,
            program_id: record.program_id,
            workout_session_id: record.workout_session_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
        }
    }

    /// Flat persisted form
    #[must_use]
    pub const fn to_record(&self) -> PlannedWorkoutRecord {
        PlannedWorkoutRecord {
            id: self.id,
            user_id: self.user_id,
            workout_id: self.workout_id,
            scheduled_date: self.scheduled_date,
            status: self.status,
            program_id: self.program_id,
            workout_session_id: self.workout_session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    /// Move to another date while still `Planned`
    ///
    /// # Errors
    ///
    /// Returns `CannotRescheduleWorkout` unless `Planned`
    pub fn reschedule(&mut self, new_date: NaiveDate) -> TrackingResult<()> {
        if self.status != PlannedWorkoutStatus::Planned {
            return Err(TrackingError::CannotRescheduleWorkout {
                planned_workout_id: self.id,
                status: self.status,
            });
        }
        self.scheduled_date = new_date;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `Planned -> InProgress`, linking the executing session
    ///
    /// # Errors
    ///
    /// Returns `CannotStartPlannedWorkout` unless `Planned`
    pub fn start(&mut self, workout_session_id: Uuid) -> TrackingResult<()> {
        if self.status != PlannedWorkoutStatus::Planned {
            return Err(TrackingError::CannotStartPlannedWorkout {
                planned_workout_id: self.id,
                status: self.status,
            });
        }
        self.status = PlannedWorkoutStatus::InProgress;
        self.workout_session_id = Some(workout_session_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `InProgress -> Completed`
    ///
    /// # Errors
    ///
    /// Returns `CannotCompletePlannedWorkout` unless `InProgress`
    pub fn complete(&mut self) -> TrackingResult<()> {
        if self.status != PlannedWorkoutStatus::InProgress {
            return Err(TrackingError::CannotCompletePlannedWorkout {
                planned_workout_id: self.id,
                status: self.status,
            });
        }
        self.status = PlannedWorkoutStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `InProgress -> Abandoned`
    ///
    /// # Errors
    ///
    /// Returns `CannotAbandonPlannedWorkout` unless `InProgress`
    pub fn abandon(&mut self) -> TrackingResult<()> {
        if self.status != PlannedWorkoutStatus::InProgress {
            return Err(TrackingError::CannotAbandonPlannedWorkout {
                planned_workout_id: self.id,
                status: self.status,
            });
        }
        self.status = PlannedWorkoutStatus::Abandoned;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `Planned -> Cancelled`
    ///
    /// # Errors
    ///
    /// Returns `CannotCancelPlannedWorkout` unless `Planned`
    pub fn cancel(&mut self) -> TrackingResult<()> {
        if self.status != PlannedWorkoutStatus::Planned {
            return Err(TrackingError::CannotCancelPlannedWorkout {
                planned_workout_id: self.id,
                status: self.status,
            });
        }
        self.status = PlannedWorkoutStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Still `Planned` with a scheduled date before `today`
    #[must_use]
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.status == PlannedWorkoutStatus::Planned && self.scheduled_date < today
    }

    /// [`Self::is_overdue_on`] against the current UTC date
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Planned workout identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Workout template
    #[must_use]
    pub const fn workout_id(&self) -> Uuid {
        self.workout_id
    }

    /// Scheduled calendar date
    #[must_use]
    pub const fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    /// Lifecycle status
    #[must_use]
    pub const fn status(&self) -> PlannedWorkoutStatus {
        self.status
    }

    /// Whether a training program generated it
    #[must_use]
    pub const fn is_from_program(&self) -> bool {
        self.program_id.is_some()
    }

    /// Generating program
    #[must_use]
    pub const fn program_id(&self) -> Option<Uuid> {
        self.program_id
    }

    /// Session executing it
    #[must_use]
    pub const fn workout_session_id(&self) -> Option<Uuid> {
        self.workout_session_id
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn planned(on: NaiveDate) -> PlannedWorkout {
        PlannedWorkout::schedule(Uuid::new_v4(), Uuid::new_v4(), on, None)
    }

    #[test]
    fn test_overdue_only_while_planned() {
        let mut workout = planned(date(2025, 3, 1));
        assert!(workout.is_overdue_on(date(2025, 3, 2)));
        assert!(!workout.is_overdue_on(date(2025, 3, 1)));

        workout.start(Uuid::new_v4()).unwrap();
        assert!(!workout.is_overdue_on(date(2025, 3, 2)));
    }

    #[test]
    fn test_reschedule_then_start_and_complete() {
        let mut workout = planned(date(2025, 3, 1));
        workout.reschedule(date(2025, 3, 4)).unwrap();
        assert_eq!(workout.scheduled_date(), date(2025, 3, 4));

        let session_id = Uuid::new_v4();
        workout.start(session_id).unwrap();
        assert_eq!(workout.status(), PlannedWorkoutStatus::InProgress);
        assert_eq!(workout.workout_session_id(), Some(session_id));

        assert!(matches!(
            workout.reschedule(date(2025, 3, 9)),
            Err(TrackingError::CannotRescheduleWorkout { status: PlannedWorkoutStatus::InProgress, .. })
        ));
        assert!(matches!(
            workout.start(Uuid::new_v4()),
            Err(TrackingError::CannotStartPlannedWorkout { .. })
        ));
        assert!(matches!(workout.cancel(), Err(TrackingError::CannotCancelPlannedWorkout { .. })));

        workout.complete().unwrap();
        assert_eq!(workout.status(), PlannedWorkoutStatus::Completed);
        assert!(matches!(workout.abandon(), Err(TrackingError::CannotAbandonPlannedWorkout { .. })));
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let mut workout = planned(date(2025, 3, 1));
        assert!(matches!(
            workout.complete(),
            Err(TrackingError::CannotCompletePlannedWorkout { status: PlannedWorkoutStatus::Planned, .. })
        ));
        workout.cancel().unwrap();
        assert_eq!(workout.status(), PlannedWorkoutStatus::Cancelled);
        assert!(!workout.is_overdue_on(date(2030, 1, 1)));
    }

    #[test]
    fn test_program_flag_and_status_strings() {
        let from_program =
            PlannedWorkout::schedule(Uuid::new_v4(), Uuid::new_v4(), date(2025, 5, 5), Some(Uuid::new_v4()));
        assert!(from_program.is_from_program());
        assert_eq!(PlannedWorkoutStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            PlannedWorkoutStatus::parse("abandoned"),
            Some(PlannedWorkoutStatus::Abandoned)
        );
        assert_eq!(PlannedWorkout::restore(from_program.to_record()), from_program);
    }
}
