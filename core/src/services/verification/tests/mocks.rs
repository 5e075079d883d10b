//! Mock implementations for orchestrator tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sf_shared::config::rate_limit::RateLimitPolicy;
use uuid::Uuid;

use crate::domain::entities::rate_limit::{RateLimitAction, RateLimitCounter};
use crate::errors::DomainError;
use crate::services::rate_limit::RateLimitStore;

/// Rate limit store whose reads always fail, for fail-closed tests
pub struct FailingRateLimitStore;

#[async_trait]
impl RateLimitStore for FailingRateLimitStore {
    async fn fetch(
        &self,
        _user_id: Uuid,
        _action: RateLimitAction,
    ) -> Result<Option<RateLimitCounter>, DomainError> {
        Err(DomainError::Internal {
            message: "counter store unreachable".to_string(),
        })
    }

    async fn record_failure(
        &self,
        _user_id: Uuid,
        _action: RateLimitAction,
        _policy: &RateLimitPolicy,
        _now: DateTime<Utc>,
    ) -> Result<RateLimitCounter, DomainError> {
        Err(DomainError::Internal {
            message: "counter store unreachable".to_string(),
        })
    }

    async fn reset(&self, _user_id: Uuid, _action: RateLimitAction) -> Result<(), DomainError> {
        Err(DomainError::Internal {
            message: "counter store unreachable".to_string(),
        })
    }
}
