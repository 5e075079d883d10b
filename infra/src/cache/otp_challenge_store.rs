//! Redis-backed OTP challenge store
//!
//! One key per `(user, channel)` holding the newest challenge as JSON, with
//! the challenge TTL mapped onto the key expiry. Writing a new challenge
//! overwrites the previous one, so supersession comes for free.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use sf_core::domain::entities::otp_challenge::{OtpChallenge, OtpChannel};
use sf_core::errors::DomainError;
use sf_core::repositories::otp_challenge::OtpChallengeRepository;

use crate::cache::redis_client::RedisClient;

/// Redis implementation of `OtpChallengeRepository`
pub struct RedisOtpChallengeStore {
    redis_client: Arc<RedisClient>,
}

impl RedisOtpChallengeStore {
    /// Create a new Redis-backed challenge store
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    fn challenge_key(user_id: Uuid, channel: OtpChannel) -> String {
        format!("otp:challenge:{}:{}", user_id, channel.as_str())
    }

    fn serialize(challenge: &OtpChallenge) -> Result<String, DomainError> {
        serde_json::to_string(challenge).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize OTP challenge: {}", e),
        })
    }

    fn deserialize(raw: &str) -> Result<OtpChallenge, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::Internal {
            message: format!("Failed to deserialize OTP challenge: {}", e),
        })
    }
}

#[async_trait]
impl OtpChallengeRepository for RedisOtpChallengeStore {
    async fn put(&self, challenge: OtpChallenge) -> Result<(), DomainError> {
        let key = Self::challenge_key(challenge.user_id, challenge.channel);
        let ttl = (challenge.expires_at - Utc::now()).num_seconds().max(1) as u64;

        self.redis_client
            .set_with_expiry(&key, &Self::serialize(&challenge)?, ttl)
            .await?;
        Ok(())
    }

    async fn find_current(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        let raw = self
            .redis_client
            .get(&Self::challenge_key(user_id, channel))
            .await?;
        raw.map(|raw| Self::deserialize(&raw)).transpose()
    }

    async fn consume(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
        challenge_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = Self::challenge_key(user_id, channel);

        // GETDEL removes the challenge in the same step that reads it, so
        // two concurrent consumers cannot both observe it unconsumed
        let raw = match self.redis_client.get_del(&key).await? {
            Some(raw) => raw,
            None => return Ok(false),
        };

        let challenge = Self::deserialize(&raw)?;
        if challenge.id != challenge_id || challenge.consumed {
            // Superseded between find and consume; the caller sees a failed
            // attempt and the user requests a fresh code
            return Ok(false);
        }

        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, channel: OtpChannel) -> Result<(), DomainError> {
        self.redis_client
            .delete(&Self::challenge_key(user_id, channel))
            .await?;
        Ok(())
    }
}
