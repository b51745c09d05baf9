//! Error types for publication operations
//!
//! This module defines all error types that can occur while moving
//! reviews and community posts through their lifecycles.

use thiserror::Error;

/// Publication error types.
#[derive(Debug, Clone, Error)]
pub enum PublicationError {
    /// Caller input was invalid, e.g. a missing required field (never
    /// retried)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Review or post does not exist (not retried)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transition violates a lifecycle rule (not retried; requires caller
    /// correction)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Content-store failure, surfaced unchanged (retryable)
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for publication operations.
pub type PublicationResult<T> = Result<T, PublicationError>;

impl PublicationError {
    /// Check if this error is safe to retry per caller policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublicationError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PublicationError::Validation(_) => 400,
            PublicationError::NotFound(_) => 404,
            PublicationError::Precondition(_) => 409,
            PublicationError::Store(_) => 502,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            PublicationError::Validation(_) => "VALIDATION_ERROR",
            PublicationError::NotFound(_) => "NOT_FOUND",
            PublicationError::Precondition(_) => "PRECONDITION_FAILED",
            PublicationError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_errors_retryable() {
        assert!(PublicationError::Store("timeout".into()).is_retryable());
        assert!(!PublicationError::Precondition("archived".into()).is_retryable());
        assert!(!PublicationError::Validation("no title".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PublicationError::Precondition("x".into()).status_code(), 409);
        assert_eq!(PublicationError::NotFound("x".into()).status_code(), 404);
    }
}
