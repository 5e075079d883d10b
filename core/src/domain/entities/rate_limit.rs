//! Rate limit counter entity tracking failed verification attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verification actions with independent failure budgets
///
/// Each action has its own counter and lockout so that abuse of one channel
/// cannot lock a user out of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitAction {
    Totp,
    Sms,
    BackupCode,
}

impl RateLimitAction {
    /// Stable identifier used in store keys and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitAction::Totp => "totp",
            RateLimitAction::Sms => "sms",
            RateLimitAction::BackupCode => "backup_code",
        }
    }
}

/// Failure counter for a `(user, action)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    /// Identifier of the user
    pub user_id: Uuid,

    /// Action this counter guards
    pub action: RateLimitAction,

    /// Start of the current counting window
    pub window_start: DateTime<Utc>,

    /// Failed attempts within the current window
    pub failure_count: u32,

    /// If set, attempts are refused until this instant
    pub locked_until: Option<DateTime<Utc>>,
}

impl RateLimitCounter {
    /// Creates a fresh counter with an empty window starting now
    pub fn new(user_id: Uuid, action: RateLimitAction, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action,
            window_start: now,
            failure_count: 0,
            locked_until: None,
        }
    }

    /// Checks whether an active lockout refuses attempts at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map_or(false, |until| now < until)
    }

    /// Checks whether the counting window has naturally expired
    pub fn window_expired(&self, now: DateTime<Utc>, window_seconds: u64) -> bool {
        now >= self.window_start + chrono::Duration::seconds(window_seconds as i64)
    }
}
