//! Redis-backed rate limit counter store
//!
//! Key layout per `(user, action)`:
//! - `rate_limit:failures:{user}:{action}`: atomic failure counter, expiry
//!   anchored to the window start
//! - `rate_limit:lock:{user}:{action}`: lockout marker with the cooldown
//!   as its TTL
//!
//! The INCR-based counter makes the increment/lock transition safe under
//! concurrent failures: both racers observe a count at or past the
//! threshold and set the same lock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use sf_core::domain::entities::rate_limit::{RateLimitAction, RateLimitCounter};
use sf_core::errors::DomainError;
use sf_core::services::rate_limit::RateLimitStore;
use sf_shared::config::rate_limit::RateLimitPolicy;

use crate::cache::redis_client::RedisClient;

/// Redis implementation of `RateLimitStore`
pub struct RedisRateLimitStore {
    redis_client: Arc<RedisClient>,
}

impl RedisRateLimitStore {
    /// Create a new Redis-backed rate limit store
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    fn failures_key(user_id: Uuid, action: RateLimitAction) -> String {
        format!("rate_limit:failures:{}:{}", user_id, action.as_str())
    }

    fn lock_key(user_id: Uuid, action: RateLimitAction) -> String {
        format!("rate_limit:lock:{}:{}", user_id, action.as_str())
    }

    /// Reconstruct a counter entity from the Redis keys
    async fn load_counter(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
        now: DateTime<Utc>,
    ) -> Result<Option<RateLimitCounter>, DomainError> {
        let failures_key = Self::failures_key(user_id, action);
        let lock_key = Self::lock_key(user_id, action);

        let count = self
            .redis_client
            .get(&failures_key)
            .await
            .map_err(DomainError::from)?
            .and_then(|v| v.parse::<u32>().ok());

        let lock_ttl = self
            .redis_client
            .ttl(&lock_key)
            .await
            .map_err(DomainError::from)?;

        if count.is_none() && lock_ttl.is_none() {
            return Ok(None);
        }

        // The window start is recovered from the counter key's remaining TTL
        let window_start = match self.redis_client.ttl(&failures_key).await? {
            Some(remaining) => now - Duration::seconds(remaining.max(0)),
            None => now,
        };

        Ok(Some(RateLimitCounter {
            user_id,
            action,
            window_start,
            failure_count: count.unwrap_or(0),
            locked_until: lock_ttl.map(|ttl| now + Duration::seconds(ttl)),
        }))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn fetch(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
    ) -> Result<Option<RateLimitCounter>, DomainError> {
        self.load_counter(user_id, action, Utc::now()).await
    }

    async fn record_failure(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<RateLimitCounter, DomainError> {
        let failures_key = Self::failures_key(user_id, action);
        let lock_key = Self::lock_key(user_id, action);

        // Stale lockout left over from a previous window: clear both keys
        // so this failure starts a fresh window
        if let Some(counter) = self.load_counter(user_id, action, now).await? {
            let lock_expired = counter.locked_until.map_or(false, |until| now >= until);
            if lock_expired {
                self.redis_client.delete(&failures_key).await?;
                self.redis_client.delete(&lock_key).await?;
            }
        }

        let count = self
            .redis_client
            .increment(&failures_key, Some(policy.window_seconds))
            .await
            .map_err(DomainError::from)? as u32;

        let locked_until = if count >= policy.max_failures {
            self.redis_client
                .set_with_expiry(&lock_key, "locked", policy.lockout_seconds)
                .await?;
            tracing::warn!(
                user_id = %user_id,
                action = action.as_str(),
                failure_count = count,
                event = "rate_limit_lockout_stored",
                "Lockout written to shared store"
            );
            Some(now + Duration::seconds(policy.lockout_seconds as i64))
        } else {
            None
        };

        Ok(RateLimitCounter {
            user_id,
            action,
            window_start: now,
            failure_count: count,
            locked_until,
        })
    }

    async fn reset(&self, user_id: Uuid, action: RateLimitAction) -> Result<(), DomainError> {
        self.redis_client
            .delete(&Self::failures_key(user_id, action))
            .await?;
        self.redis_client
            .delete(&Self::lock_key(user_id, action))
            .await?;
        Ok(())
    }
}
