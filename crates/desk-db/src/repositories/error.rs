//! Error handling utilities for repositories

use desk_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// The underlying error is logged here; callers surface only the generic
/// upstream-failure variant.
pub fn map_db_error(e: SqlxError) -> DomainError {
    tracing::error!(error = %e, "Database operation failed");
    DomainError::DatabaseError(e.to_string())
}

/// Create a "thread not found" error
pub fn thread_not_found(id: &str) -> DomainError {
    DomainError::ThreadNotFound(id.to_string())
}
