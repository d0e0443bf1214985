// ABOUTME: Structured error types for storage operations behind the repository traits
// ABOUTME: Classifies sqlx failures so uniqueness violations can become domain conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

use super::ErrorCode;

/// Errors produced by repository implementations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// Row addressed by an update or delete does not exist
    #[error("{entity_type} {entity_id} not found")]
    NotFound {
        /// Table or aggregate name
        entity_type: &'static str,
        /// Identifier that was addressed
        entity_id: String,
    },

    /// Row was saved by someone else after it was loaded
    #[error("{entity_type} {entity_id} was modified since it was loaded")]
    StaleVersion {
        /// Table or aggregate name
        entity_type: &'static str,
        /// Identifier that was addressed
        entity_id: String,
    },

    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Constraint or index name reported by the database
        constraint: String,
    },

    /// Query failed to execute
    #[error("Query failed: {context}")]
    QueryError {
        /// Description of the failure
        context: String,
    },

    /// Connection could not be obtained or was lost
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Stored value could not be decoded into a domain value
    #[error("Stored data is invalid: {0}")]
    SerializationError(String),

    /// Caller cancelled the operation before storage finished
    #[error("Storage operation cancelled")]
    Cancelled,
}

impl DatabaseError {
    /// Whether the failure is a uniqueness violation mentioning `index`
    #[must_use]
    pub fn is_unique_violation_of(&self, index: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint.contains(index))
    }

    /// Error code used when rendering this failure
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::UniqueViolation { .. } => ErrorCode::ResourceAlreadyExists,
            Self::StaleVersion { .. } => ErrorCode::ConcurrentModification,
            Self::SerializationError(_) => ErrorCode::SerializationError,
            Self::Cancelled => ErrorCode::OperationCancelled,
            Self::QueryError { .. } | Self::ConnectionError(_) => ErrorCode::DatabaseError,
        }
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                // SQLite reports the offending columns in the message, not a constraint name
                let constraint = db_error
                    .constraint()
                    .map_or_else(|| db_error.message().to_owned(), ToOwned::to_owned);
                Self::UniqueViolation { constraint }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(error.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::SerializationError(error.to_string())
            }
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_matching() {
        let err = DatabaseError::UniqueViolation {
            constraint: "UNIQUE constraint failed: workout_sessions.user_id".into(),
        };
        assert!(err.is_unique_violation_of("workout_sessions.user_id"));
        assert!(!err.is_unique_violation_of("planned_workouts"));
        assert_eq!(err.code(), ErrorCode::ResourceAlreadyExists);
    }
}
