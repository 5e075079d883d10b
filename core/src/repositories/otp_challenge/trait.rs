//! OTP challenge repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::otp_challenge::{OtpChallenge, OtpChannel};
use crate::errors::DomainError;

/// Repository trait for one-time-password challenges
///
/// Only the newest challenge per `(user, channel)` is kept; `put`
/// supersedes any prior challenge for that pair.
#[async_trait]
pub trait OtpChallengeRepository: Send + Sync {
    /// Store a challenge, superseding the previous one for its channel
    async fn put(&self, challenge: OtpChallenge) -> Result<(), DomainError>;

    /// Find the current challenge for a `(user, channel)` pair
    async fn find_current(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
    ) -> Result<Option<OtpChallenge>, DomainError>;

    /// Conditionally mark a challenge as consumed
    ///
    /// The update only applies while the identified challenge is still the
    /// current one and unconsumed.
    ///
    /// # Returns
    /// * `Ok(true)` - This call consumed the challenge
    /// * `Ok(false)` - Already consumed or superseded
    async fn consume(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
        challenge_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Remove the current challenge for a `(user, channel)` pair, if any
    async fn remove(&self, user_id: Uuid, channel: OtpChannel) -> Result<(), DomainError>;
}
