//! Mock implementation of OtpChallengeRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::otp_challenge::{OtpChallenge, OtpChannel};
use crate::errors::DomainError;

use super::trait_::OtpChallengeRepository;

/// Mock OTP challenge repository backed by an in-memory map
pub struct MockOtpChallengeRepository {
    challenges: Arc<RwLock<HashMap<(Uuid, OtpChannel), OtpChallenge>>>,
}

impl MockOtpChallengeRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockOtpChallengeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpChallengeRepository for MockOtpChallengeRepository {
    async fn put(&self, challenge: OtpChallenge) -> Result<(), DomainError> {
        let mut challenges = self.challenges.write().await;
        challenges.insert((challenge.user_id, challenge.channel), challenge);
        Ok(())
    }

    async fn find_current(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(&(user_id, channel)).cloned())
    }

    async fn consume(
        &self,
        user_id: Uuid,
        channel: OtpChannel,
        challenge_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        match challenges.get_mut(&(user_id, channel)) {
            Some(challenge) if challenge.id == challenge_id && !challenge.consumed => {
                challenge.consumed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, user_id: Uuid, channel: OtpChannel) -> Result<(), DomainError> {
        let mut challenges = self.challenges.write().await;
        challenges.remove(&(user_id, channel));
        Ok(())
    }
}
