// ABOUTME: Unified error handling with standard error codes for the tracking core
// ABOUTME: Re-exports the tracking and database error taxonomies and the boundary AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Domain operations fail with [`TrackingError`], a closed set of typed variants
//! carrying only the structured data of the violation. Storage failures are
//! classified by [`DatabaseError`]. The outer API layer renders either into an
//! [`AppError`], which pairs a stable [`ErrorCode`] with a human-readable message.

/// Storage error classification
pub mod database;

/// Domain error taxonomy for sessions, planned workouts and metrics
pub mod tracking;

pub use database::DatabaseError;
pub use tracking::{ErrorCategory, TrackingError, TrackingResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input failed a domain validation rule
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required value was not supplied
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// A numeric value is outside its permitted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// The referenced resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// A conflicting resource already exists
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,
    /// The resource's lifecycle state does not permit the operation
    #[serde(rename = "INVALID_STATE")]
    InvalidState = 4002,
    /// The caller cancelled the operation before it finished
    #[serde(rename = "OPERATION_CANCELLED")]
    OperationCancelled = 4003,
    /// The resource changed after it was loaded
    #[serde(rename = "CONCURRENT_MODIFICATION")]
    ConcurrentModification = 4004,

    // Configuration (6000-6999)
    /// Configuration error encountered
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unclassified internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Stored data could not be decoded
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A conflicting resource already exists",
            Self::InvalidState => "The resource is not in a state that allows this operation",
            Self::OperationCancelled => "The operation was cancelled",
            Self::ConcurrentModification => "The resource was modified by another request",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Boundary error type: a stable code plus a rendered message
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured data of the violation, `Null` when there is none
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach the structured data of the violation
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<TrackingError> for AppError {
    fn from(error: TrackingError) -> Self {
        let code = error.code();
        let details = error.details();
        let message = error.to_string();
        match error {
            TrackingError::Database(source) => Self::new(code, message).with_source(source),
            _ => Self::new(code, message).with_details(details),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::from(TrackingError::Database(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use uuid::Uuid;

    #[test]
    fn test_config_error_display() {
        let error = AppError::config("DATABASE_URL must not be empty");
        assert_eq!(error.code, ErrorCode::ConfigError);
        assert!(error.details.is_null());
        assert_eq!(
            error.to_string(),
            "Configuration error encountered: DATABASE_URL must not be empty"
        );
    }

    #[test]
    fn test_tracking_error_renders_details() {
        let session_id = Uuid::new_v4();
        let app_error = AppError::from(TrackingError::WorkoutSessionNotFound { session_id });

        assert_eq!(app_error.code, ErrorCode::ResourceNotFound);
        assert_eq!(app_error.details["session_id"], serde_json::json!(session_id));
        assert!(app_error.source().is_none());
    }

    #[test]
    fn test_database_error_keeps_source() {
        let app_error = AppError::from(DatabaseError::ConnectionError("pool closed".into()));

        assert_eq!(app_error.code, ErrorCode::DatabaseError);
        assert!(app_error.source().is_some());
        assert!(app_error.details.is_null());
    }
}
