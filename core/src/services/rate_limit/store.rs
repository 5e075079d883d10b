//! Rate limit counter store trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sf_shared::config::rate_limit::RateLimitPolicy;
use uuid::Uuid;

use crate::domain::entities::rate_limit::{RateLimitAction, RateLimitCounter};
use crate::errors::DomainError;

/// Trait for rate limit counter persistence
///
/// `record_failure` must apply the increment and the lockout transition as
/// one atomic step per `(user, action)`: two concurrent failed attempts
/// must not both slip past the threshold.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch the counter for a `(user, action)` pair, if one exists
    async fn fetch(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
    ) -> Result<Option<RateLimitCounter>, DomainError>;

    /// Atomically record a failed attempt and return the resulting counter
    ///
    /// Starts a fresh window when none exists, the previous window has
    /// expired, or an expired lockout is left over. Sets `locked_until` the
    /// moment `failure_count` reaches the policy threshold.
    async fn record_failure(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<RateLimitCounter, DomainError>;

    /// Zero the counter for a `(user, action)` pair
    async fn reset(&self, user_id: Uuid, action: RateLimitAction) -> Result<(), DomainError>;
}
