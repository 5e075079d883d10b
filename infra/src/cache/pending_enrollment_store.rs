//! Redis-backed pending enrollment store
//!
//! The candidate secret lives server-side under one key per user, with the
//! enrollment TTL mapped onto the key expiry. `take` uses GETDEL so that
//! two concurrent confirmations cannot both claim the candidate.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use sf_core::domain::entities::pending_enrollment::PendingEnrollment;
use sf_core::errors::DomainError;
use sf_core::repositories::pending_enrollment::PendingEnrollmentRepository;

use crate::cache::redis_client::RedisClient;

/// Redis implementation of `PendingEnrollmentRepository`
pub struct RedisPendingEnrollmentStore {
    redis_client: Arc<RedisClient>,
}

impl RedisPendingEnrollmentStore {
    /// Create a new Redis-backed pending enrollment store
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    fn pending_key(user_id: Uuid) -> String {
        format!("enrollment:pending:{}", user_id)
    }

    fn deserialize(raw: &str) -> Result<PendingEnrollment, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::Internal {
            message: format!("Failed to deserialize pending enrollment: {}", e),
        })
    }
}

#[async_trait]
impl PendingEnrollmentRepository for RedisPendingEnrollmentStore {
    async fn put(&self, enrollment: PendingEnrollment) -> Result<(), DomainError> {
        let key = Self::pending_key(enrollment.user_id);
        let ttl = (enrollment.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let raw = serde_json::to_string(&enrollment).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize pending enrollment: {}", e),
        })?;

        self.redis_client.set_with_expiry(&key, &raw, ttl).await?;
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError> {
        let raw = self.redis_client.get(&Self::pending_key(user_id)).await?;
        raw.map(|raw| Self::deserialize(&raw)).transpose()
    }

    async fn take(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError> {
        let raw = self
            .redis_client
            .get_del(&Self::pending_key(user_id))
            .await?;
        raw.map(|raw| Self::deserialize(&raw)).transpose()
    }

    async fn remove(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.redis_client
            .delete(&Self::pending_key(user_id))
            .await?;
        Ok(())
    }
}
