//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{TwoFactorError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
///
/// Unexpected failures (store unreachable, encryption failure) map to
/// `Internal`; the detail is logged where it happens and callers surface a
/// single generic failure.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    TwoFactor(#[from] TwoFactorError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// True if this error is the undifferentiated invalid-code rejection
    pub fn is_invalid_code(&self) -> bool {
        matches!(self, DomainError::TwoFactor(TwoFactorError::InvalidCode))
    }

    /// True if this error is a rate-limit refusal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DomainError::TwoFactor(TwoFactorError::RateLimited { .. }))
    }
}
