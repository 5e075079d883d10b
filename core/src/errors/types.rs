//! Domain-specific error types for second-factor operations
//!
//! This module provides error type definitions for verification, enrollment
//! and validation. Messages are deliberately coarse: a caller (or an
//! attacker) must not be able to distinguish a wrong code from an expired or
//! already-consumed one.

use chrono::{DateTime, Utc};
use sf_shared::types::response::ErrorResponse;
use thiserror::Error;

/// Second-factor verification and enrollment errors
#[derive(Error, Debug)]
pub enum TwoFactorError {
    /// Two-factor authentication is not enabled for this account
    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    /// Two-factor authentication is already enabled for this account
    #[error("Two-factor authentication is already enabled")]
    AlreadyEnabled,

    /// No enrollment is awaiting confirmation (never started or expired)
    #[error("No enrollment is pending confirmation")]
    NoPendingEnrollment,

    /// The supplied code did not verify.
    ///
    /// Wrong, expired and already-consumed codes all map here so that the
    /// error is not usable as an oracle.
    #[error("Invalid verification code")]
    InvalidCode,

    /// Too many failed attempts; further attempts are refused until `reset_at`
    #[error("Too many failed attempts")]
    RateLimited {
        reset_at: DateTime<Utc>,
        remaining_attempts: u32,
    },

    /// Password re-check failed during disable/regenerate
    #[error("Re-authentication failed")]
    AuthenticationFailed,

    /// The SMS gateway could not deliver the message
    #[error("Failed to deliver verification message")]
    DeliveryFailed,
}

/// Input validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid phone number format: {phone}")]
    InvalidPhoneFormat { phone: String },

    #[error("Invalid code format")]
    InvalidCodeFormat,

    #[error("Required field: {field}")]
    RequiredField { field: String },
}

impl TwoFactorError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TwoFactorError::NotEnabled => "TWO_FACTOR_NOT_ENABLED",
            TwoFactorError::AlreadyEnabled => "TWO_FACTOR_ALREADY_ENABLED",
            TwoFactorError::NoPendingEnrollment => "NO_PENDING_ENROLLMENT",
            TwoFactorError::InvalidCode => "INVALID_CODE",
            TwoFactorError::RateLimited { .. } => "RATE_LIMITED",
            TwoFactorError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            TwoFactorError::DeliveryFailed => "DELIVERY_FAILED",
        }
    }
}

/// Convert TwoFactorError to ErrorResponse
impl From<TwoFactorError> for ErrorResponse {
    fn from(err: TwoFactorError) -> Self {
        let response = ErrorResponse::new(err.error_code(), err.to_string());
        match err {
            TwoFactorError::RateLimited {
                reset_at,
                remaining_attempts,
            } => response
                .with_detail("reset_at", serde_json::json!(reset_at.to_rfc3339()))
                .with_detail("remaining_attempts", serde_json::json!(remaining_attempts)),
            _ => response,
        }
    }
}

/// Convert ValidationError to ErrorResponse
impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        let error_code = match &err {
            ValidationError::InvalidPhoneFormat { .. } => "INVALID_PHONE_FORMAT",
            ValidationError::InvalidCodeFormat => "INVALID_CODE_FORMAT",
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
        };
        ErrorResponse::new(error_code, err.to_string())
    }
}
