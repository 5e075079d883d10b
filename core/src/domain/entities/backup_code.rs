//! Backup code entity for account recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-use recovery credential
///
/// Only the bcrypt hash is ever stored; the plaintext is returned to the
/// user exactly once, at batch generation. `used = true` is permanent, and a
/// code from a superseded batch is never usable regardless of its flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupCode {
    /// Unique identifier of this code
    pub id: Uuid,

    /// Identifier of the owning user
    pub user_id: Uuid,

    /// Batch this code belongs to; only the newest batch is active
    pub batch_id: Uuid,

    /// bcrypt hash of the normalized plaintext code
    pub code_hash: String,

    /// Whether the code has been consumed
    pub used: bool,

    /// Timestamp when the code was consumed
    pub used_at: Option<DateTime<Utc>>,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,
}

impl BackupCode {
    /// Creates an unused backup code belonging to a batch
    pub fn new(user_id: Uuid, batch_id: Uuid, code_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            batch_id,
            code_hash,
            used: false,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the code as consumed; consumption is permanent
    pub fn mark_used(&mut self, now: DateTime<Utc>) {
        self.used = true;
        self.used_at = Some(now);
    }
}
