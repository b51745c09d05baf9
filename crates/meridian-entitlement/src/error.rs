//! Error types for entitlement operations
//!
//! This module defines all error types that can occur while resolving
//! entitlements or applying administrative edits to user records.

use thiserror::Error;

/// Entitlement error types.
///
/// These errors cover administrative edits to user records and the
/// directory interactions behind them. The taxonomy matters to callers:
/// only `Store` failures are safe to retry; every other variant requires
/// the caller to correct its input first.
#[derive(Debug, Clone, Error)]
pub enum EntitlementError {
    /// Caller input was invalid (never retried)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// User or grant does not exist (not retried)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation violates an entitlement rule (not retried)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Directory/collaborator failure, surfaced unchanged (retryable)
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for entitlement operations.
pub type EntitlementResult<T> = Result<T, EntitlementError>;

impl EntitlementError {
    /// Check if this error is safe to retry per caller policy.
    ///
    /// Only collaborator-store failures are retryable; input and rule
    /// errors will fail identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EntitlementError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EntitlementError::Validation(_) => 400,
            EntitlementError::NotFound(_) => 404,
            EntitlementError::Precondition(_) => 409,
            EntitlementError::Store(_) => 502,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            EntitlementError::Validation(_) => "VALIDATION_ERROR",
            EntitlementError::NotFound(_) => "NOT_FOUND",
            EntitlementError::Precondition(_) => "PRECONDITION_FAILED",
            EntitlementError::Store(_) => "STORE_ERROR",
        }
    }
}
