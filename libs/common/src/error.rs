//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every repository and
//! the service-level error taxonomy returned by the auth and booking managers.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query failure, separating unique violations from the rest
    pub fn from_query(error: SqlxError) -> Self {
        match &error {
            SqlxError::Database(db) if db.is_unique_violation() => {
                DatabaseError::UniqueViolation(db.message().to_string())
            }
            _ => DatabaseError::Query(error),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors surfaced by the auth and booking services to their callers
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed input, or a credential that could not be hashed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource already exists (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials, invalid or expired token, or deactivated user
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// No inventory for the requested dates
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The underlying store failed
    #[error("Storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: DatabaseError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Wrap a store failure with what the service was doing at the time
    pub fn storage(context: impl Into<String>, source: DatabaseError) -> Self {
        ServiceError::Storage {
            context: context.into(),
            source,
        }
    }
}

/// Type alias for Result with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;
