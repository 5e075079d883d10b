//! Pending enrollment entity holding a candidate TOTP secret.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default time-to-live for a pending enrollment (10 minutes)
pub const DEFAULT_PENDING_TTL_MINUTES: i64 = 10;

/// A candidate TOTP secret awaiting first verification
///
/// The secret is held server-side between enrollment steps; clients only
/// ever see it once, inside the provisioning artifact returned by `start`.
/// At most one pending enrollment exists per user; starting again
/// supersedes the previous one rather than accumulating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEnrollment {
    /// Identifier of the enrolling user
    pub user_id: Uuid,

    /// Candidate secret in base32, plaintext while pending only
    pub candidate_secret: String,

    /// Timestamp when the enrollment was started
    pub issued_at: DateTime<Utc>,

    /// Timestamp after which the enrollment can no longer be confirmed
    pub expires_at: DateTime<Utc>,
}

impl PendingEnrollment {
    /// Creates a pending enrollment with the default TTL
    pub fn new(user_id: Uuid, candidate_secret: String) -> Self {
        Self::new_with_ttl(user_id, candidate_secret, DEFAULT_PENDING_TTL_MINUTES)
    }

    /// Creates a pending enrollment with a custom TTL in minutes
    pub fn new_with_ttl(user_id: Uuid, candidate_secret: String, ttl_minutes: i64) -> Self {
        let issued_at = Utc::now();
        Self {
            user_id,
            candidate_secret,
            issued_at,
            expires_at: issued_at + Duration::minutes(ttl_minutes),
        }
    }

    /// Checks whether the enrollment has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
