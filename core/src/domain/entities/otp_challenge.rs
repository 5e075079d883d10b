//! OTP challenge entity for the SMS fallback channel.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of an SMS OTP code
pub const OTP_CODE_LENGTH: usize = 6;

/// Default expiration time for OTP challenges (5 minutes)
pub const DEFAULT_CHALLENGE_TTL_MINUTES: i64 = 5;

/// Delivery channel for one-time-password challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    Sms,
}

impl OtpChannel {
    /// Stable identifier used in store keys
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpChannel::Sms => "sms",
        }
    }
}

/// A one-time-password challenge sent over an external channel
///
/// Only the newest challenge per `(user, channel)` exists; creating a new
/// one supersedes the previous. The code itself is stored as a SHA-256 hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Unique identifier of this challenge
    pub id: Uuid,

    /// Identifier of the challenged user
    pub user_id: Uuid,

    /// Channel the code was delivered on
    pub channel: OtpChannel,

    /// SHA-256 hex digest of the code
    pub code_hash: String,

    /// Phone number the code was sent to (E.164)
    pub phone_number: String,

    /// Timestamp when the challenge was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the challenge expires
    pub expires_at: DateTime<Utc>,

    /// Whether the challenge has been consumed
    pub consumed: bool,
}

impl OtpChallenge {
    /// Creates an SMS challenge with the default TTL
    pub fn new_sms(user_id: Uuid, phone_number: String, code_hash: String) -> Self {
        Self::new_sms_with_ttl(user_id, phone_number, code_hash, DEFAULT_CHALLENGE_TTL_MINUTES)
    }

    /// Creates an SMS challenge with a custom TTL in minutes
    pub fn new_sms_with_ttl(
        user_id: Uuid,
        phone_number: String,
        code_hash: String,
        ttl_minutes: i64,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            channel: OtpChannel::Sms,
            code_hash,
            phone_number,
            created_at,
            expires_at: created_at + Duration::minutes(ttl_minutes),
            consumed: false,
        }
    }

    /// Checks whether the challenge has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A challenge is usable when it is neither consumed nor expired
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_challenge_is_usable() {
        let challenge = OtpChallenge::new_sms(
            Uuid::new_v4(),
            "+61412345678".to_string(),
            "digest".to_string(),
        );

        assert!(challenge.is_usable(Utc::now()));
        assert_eq!(challenge.channel, OtpChannel::Sms);
        assert_eq!(
            challenge.expires_at,
            challenge.created_at + Duration::minutes(DEFAULT_CHALLENGE_TTL_MINUTES)
        );
    }

    #[test]
    fn test_expired_challenge_is_not_usable() {
        let challenge = OtpChallenge::new_sms(
            Uuid::new_v4(),
            "+61412345678".to_string(),
            "digest".to_string(),
        );

        let after_expiry = challenge.expires_at + Duration::seconds(1);
        assert!(challenge.is_expired(after_expiry));
        assert!(!challenge.is_usable(after_expiry));
    }

    #[test]
    fn test_consumed_challenge_is_not_usable() {
        let mut challenge = OtpChallenge::new_sms(
            Uuid::new_v4(),
            "+61412345678".to_string(),
            "digest".to_string(),
        );

        challenge.consumed = true;
        assert!(!challenge.is_usable(Utc::now()));
    }
}
