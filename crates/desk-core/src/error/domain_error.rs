//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Nothing to de-escalate for conversation: {0}")]
    NothingToDeescalate(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Tag must not be empty")]
    EmptyTag,

    #[error("Evidence payload must not be empty")]
    EmptyEvidence,

    #[error("Escalation requires a target user")]
    MissingEscalationTarget,

    #[error("Status transition not allowed: {from} -> {to}")]
    TransitionDenied { from: String, to: String },

    // =========================================================================
    // Auth Errors
    // =========================================================================
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Missing capability: {0}")]
    MissingCapability(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ThreadNotFound(_) => "UNKNOWN_THREAD",
            Self::NothingToDeescalate(_) => "NOTHING_TO_DEESCALATE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidPriority(_) => "INVALID_PRIORITY",
            Self::EmptyTag => "EMPTY_TAG",
            Self::EmptyEvidence => "EMPTY_EVIDENCE",
            Self::MissingEscalationTarget => "MISSING_ESCALATION_TARGET",
            Self::TransitionDenied { .. } => "TRANSITION_DENIED",

            // Auth
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::MissingCapability(_) => "MISSING_CAPABILITY",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ThreadNotFound(_) | Self::NothingToDeescalate(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidStatus(_)
                | Self::InvalidPriority(_)
                | Self::EmptyTag
                | Self::EmptyEvidence
                | Self::MissingEscalationTarget
                | Self::TransitionDenied { .. }
        )
    }

    /// Check if this is a missing-capability error (maps to 403)
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingCapability(_))
    }

    /// Check if this is an unauthenticated-caller error (maps to 401)
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}
