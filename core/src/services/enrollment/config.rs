//! Configuration for the enrollment service

use crate::domain::entities::pending_enrollment::DEFAULT_PENDING_TTL_MINUTES;

/// Configuration for the enrollment state machine
#[derive(Debug, Clone)]
pub struct EnrollmentConfig {
    /// Minutes a started enrollment stays confirmable
    pub pending_ttl_minutes: i64,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            pending_ttl_minutes: DEFAULT_PENDING_TTL_MINUTES,
        }
    }
}
