// ABOUTME: User metric aggregate for body measurements and personal records
// ABOUTME: UserMetric value/timestamp pair with non-negative validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{TrackingError, TrackingResult};

/// Kind of measurement a metric records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMetricType {
    /// Body weight
    Weight,
    /// Body height
    Height,
    /// Best result on an exercise
    PersonalRecord,
}

impl UserMetricType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Height => "height",
            Self::PersonalRecord => "personal_record",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weight" => Some(Self::Weight),
            "height" => Some(Self::Height),
            "personal_record" => Some(Self::PersonalRecord),
            _ => None,
        }
    }
}

/// A dated measurement belonging to a user
///
/// The value and its timestamp form one pair: an update replaces both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetric {
    /// Metric identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Measurement kind
    pub metric_type: UserMetricType,
    value: f64,
    /// Unit label, e.g. `kg` or `cm`
    pub unit: String,
    recorded_at: DateTime<Utc>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl UserMetric {
    /// Record a new measurement
    ///
    /// # Errors
    ///
    /// Returns `NegativeMetricValue` when `value` is negative or NaN
    pub fn record(
        user_id: Uuid,
        metric_type: UserMetricType,
        value: f64,
        unit: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> TrackingResult<Self> {
        validate_value(value)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            metric_type,
            value,
            unit: unit.into(),
            recorded_at,
            notes: None,
        })
    }

    /// Attach notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Rebuild a metric from storage without re-validating
    #[must_use]
    pub const fn restore(
        id: Uuid,
        user_id: Uuid,
        metric_type: UserMetricType,
        value: f64,
        unit: String,
        recorded_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            metric_type,
            value,
            unit,
            recorded_at,
            notes,
        }
    }

    /// Replace the value and its timestamp
    ///
    /// # Errors
    ///
    /// Returns `NegativeMetricValue` when `value` is negative or NaN; the metric is left unchanged
    pub fn update_value(&mut self, value: f64, recorded_at: DateTime<Utc>) -> TrackingResult<()> {
        validate_value(value)?;
        self.value = value;
        self.recorded_at = recorded_at;
        Ok(())
    }

    /// Measured value
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// When the value was measured
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

fn validate_value(value: f64) -> TrackingResult<()> {
    if value < 0.0 || value.is_nan() {
        return Err(TrackingError::NegativeMetricValue {
            field: "value",
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_record_rejects_negative_value() {
        let err = UserMetric::record(Uuid::new_v4(), UserMetricType::Weight, -2.5, "kg", Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            TrackingError::NegativeMetricValue {
                field: "value",
                value: -2.5
            }
        );
    }

    #[test]
    fn test_update_replaces_value_and_timestamp() {
        let earlier = Utc::now() - Duration::days(7);
        let mut metric =
            UserMetric::record(Uuid::new_v4(), UserMetricType::Weight, 82.0, "kg", earlier).unwrap();
        let id = metric.id;

        let now = Utc::now();
        metric.update_value(80.5, now).unwrap();
        assert_eq!(metric.id, id);
        assert!((metric.value() - 80.5).abs() < f64::EPSILON);
        assert_eq!(metric.recorded_at(), now);

        assert!(metric.update_value(-1.0, Utc::now()).is_err());
        assert!((metric.value() - 80.5).abs() < f64::EPSILON);
        assert_eq!(metric.recorded_at(), now);
    }

    #[test]
    fn test_zero_is_allowed_and_type_strings() {
        assert!(UserMetric::record(Uuid::new_v4(), UserMetricType::PersonalRecord, 0.0, "", Utc::now()).is_ok());
        assert_eq!(
            UserMetricType::parse(UserMetricType::PersonalRecord.as_str()),
            Some(UserMetricType::PersonalRecord)
        );
        assert_eq!(UserMetricType::parse("bmi"), None);
    }
}
