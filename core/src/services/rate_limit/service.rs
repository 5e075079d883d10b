//! Rate limiting service applying per-action policies

use chrono::{DateTime, Utc};
use sf_shared::config::rate_limit::{RateLimitConfig, RateLimitPolicy};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::rate_limit::RateLimitAction;
use crate::errors::{DomainResult, TwoFactorError};

use super::store::RateLimitStore;

/// Outcome of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether a verification attempt is admitted
    pub allowed: bool,
    /// Attempts remaining before the next lockout
    pub remaining_attempts: u32,
    /// When the refusal lifts (present when not allowed)
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitDecision {
    /// Convert a refusal into the domain error carried back to the caller
    pub fn into_error(self, now: DateTime<Utc>) -> TwoFactorError {
        TwoFactorError::RateLimited {
            reset_at: self.reset_at.unwrap_or(now),
            remaining_attempts: self.remaining_attempts,
        }
    }
}

/// Rate limiting service for verification attempts
///
/// Fail-closed by design: when the counter store cannot be read the error
/// propagates and the attempt is denied, rather than silently admitting
/// unlimited attempts.
pub struct RateLimitService<S: RateLimitStore> {
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S: RateLimitStore> RateLimitService<S> {
    /// Create a new rate limiting service
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Policy configured for an action
    pub fn policy(&self, action: RateLimitAction) -> &RateLimitPolicy {
        match action {
            RateLimitAction::Totp => &self.config.totp,
            RateLimitAction::Sms => &self.config.sms,
            RateLimitAction::BackupCode => &self.config.backup_code,
        }
    }

    /// Check whether an attempt for `(user, action)` is admitted right now
    pub async fn check(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
    ) -> DomainResult<RateLimitDecision> {
        let policy = *self.policy(action);
        if !self.config.enabled {
            return Ok(RateLimitDecision {
                allowed: true,
                remaining_attempts: policy.max_failures,
                reset_at: None,
            });
        }

        let counter = self.store.fetch(user_id, action).await?;
        let now = Utc::now();

        let decision = match counter {
            Some(counter) if counter.is_locked(now) => {
                tracing::warn!(
                    user_id = %user_id,
                    action = action.as_str(),
                    event = "rate_limit_locked",
                    "Verification attempt refused during lockout"
                );
                RateLimitDecision {
                    allowed: false,
                    remaining_attempts: 0,
                    reset_at: counter.locked_until,
                }
            }
            Some(counter)
                if counter.locked_until.is_none()
                    && !counter.window_expired(now, policy.window_seconds) =>
            {
                let remaining = policy.max_failures.saturating_sub(counter.failure_count);
                RateLimitDecision {
                    allowed: remaining > 0,
                    remaining_attempts: remaining,
                    reset_at: None,
                }
            }
            // No counter, expired window, or expired lockout: clean slate
            _ => RateLimitDecision {
                allowed: true,
                remaining_attempts: policy.max_failures,
                reset_at: None,
            },
        };

        Ok(decision)
    }

    /// Record a failed verification attempt
    ///
    /// Called only after a failed verification; reaching the policy
    /// threshold starts the lockout.
    pub async fn record_failure(
        &self,
        user_id: Uuid,
        action: RateLimitAction,
    ) -> DomainResult<RateLimitDecision> {
        let policy = *self.policy(action);
        if !self.config.enabled {
            return Ok(RateLimitDecision {
                allowed: true,
                remaining_attempts: policy.max_failures,
                reset_at: None,
            });
        }

        let now = Utc::now();
        let counter = self
            .store
            .record_failure(user_id, action, &policy, now)
            .await?;

        if counter.is_locked(now) {
            tracing::warn!(
                user_id = %user_id,
                action = action.as_str(),
                failure_count = counter.failure_count,
                event = "rate_limit_lockout_started",
                "Failure threshold reached, lockout active"
            );
        }

        Ok(RateLimitDecision {
            allowed: !counter.is_locked(now),
            remaining_attempts: policy.max_failures.saturating_sub(counter.failure_count),
            reset_at: counter.locked_until,
        })
    }

    /// Zero the counter after a successful verification
    pub async fn reset(&self, user_id: Uuid, action: RateLimitAction) -> DomainResult<()> {
        self.store.reset(user_id, action).await
    }
}
