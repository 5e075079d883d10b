//! Error response structure returned to the surrounding application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unified error response structure
///
/// Domain errors are mapped to a stable `error` code for programmatic
/// handling plus a human-readable message. Unexpected internal failures are
/// reported with a generic code and never leak internal detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_with_details() {
        let response = ErrorResponse::new("RATE_LIMITED", "Too many failed attempts")
            .with_detail("remaining_attempts", serde_json::json!(0))
            .with_detail("reset_in_seconds", serde_json::json!(900));

        assert_eq!(response.error, "RATE_LIMITED");
        let details = response.details.unwrap();
        assert_eq!(details["remaining_attempts"], 0);
        assert_eq!(details["reset_in_seconds"], 900);
    }
}
