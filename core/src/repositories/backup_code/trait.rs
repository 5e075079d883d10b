//! Backup code repository trait.
//!
//! Consumption is the security-critical operation here: `consume` must be a
//! single conditional update (check-unused-and-mark-used) so that two
//! concurrent requests cannot both spend the same code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::backup_code::BackupCode;
use crate::errors::DomainError;

/// Repository trait for backup code persistence
#[async_trait]
pub trait BackupCodeRepository: Send + Sync {
    /// Replace the user's code set with a new batch
    ///
    /// Atomically invalidates every code from prior batches, used or
    /// unused, and persists the new batch.
    async fn replace_batch(
        &self,
        user_id: Uuid,
        codes: Vec<BackupCode>,
    ) -> Result<(), DomainError>;

    /// Fetch the unused codes of the user's active batch
    async fn active_codes(&self, user_id: Uuid) -> Result<Vec<BackupCode>, DomainError>;

    /// Conditionally mark a code as used
    ///
    /// # Returns
    /// * `Ok(true)` - This call consumed the code
    /// * `Ok(false)` - The code was already used (or no longer exists)
    async fn consume(
        &self,
        user_id: Uuid,
        code_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Count the unused codes remaining in the active batch
    async fn count_remaining(&self, user_id: Uuid) -> Result<u32, DomainError>;

    /// Remove every backup code for a user (2FA disable)
    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError>;
}
