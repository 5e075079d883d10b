//! In-memory rate limit store
//!
//! Suitable for tests and single-instance deployments. Multi-instance
//! deployments need the shared Redis store from the infrastructure crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sf_shared::config::rate_limit::RateLimitPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::rate_limit::{RateLimitAction, RateLimitCounter};
use crate::errors::DomainError;

use super::store::RateLimitStore;

/// In-memory implementation of `RateLimitStore`
///
/// A single mutex guards the whole map, which makes the
/// increment-and-maybe-lock transition atomic per `(user, action)`.
pub struct InMemoryRateLimitStore {
    counters: Arc<Mutex<HashMap<(Uuid, RateLimitAction), RateLimitCounter>>>,
}

impl InMemoryRateLimitStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn fetch(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
    ) -> Result<Option<RateLimitCounter>, DomainError> {
        let counters = self.counters.lock().await;
        Ok(counters.get(&(user_id, action)).cloned())
    }

    async fn record_failure(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<RateLimitCounter, DomainError> {
        let mut counters = self.counters.lock().await;
        let counter = counters
            .entry((user_id, action))
            .or_insert_with(|| RateLimitCounter::new(user_id, action, now));

        let lockout_expired = counter
            .locked_until
            .map_or(false, |until| now >= until);
        if lockout_expired || counter.window_expired(now, policy.window_seconds) {
            counter.window_start = now;
            counter.failure_count = 0;
            counter.locked_until = None;
        }

        counter.failure_count += 1;
        if counter.failure_count >= policy.max_failures && !counter.is_locked(now) {
            counter.locked_until =
                Some(now + chrono::Duration::seconds(policy.lockout_seconds as i64));
        }

        Ok(counter.clone())
    }

    async fn reset(&self, user_id: Uuid, action: RateLimitAction) -> Result<(), DomainError> {
        let mut counters = self.counters.lock().await;
        counters.remove(&(user_id, action));
        Ok(())
    }
}
