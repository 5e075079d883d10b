//! Two-factor profile repository trait.
//!
//! Defines the persistence contract for `TwoFactorProfile` records. The
//! enable/disable transitions are conditional writes: implementations must
//! apply them as a single compare-and-set so that concurrent duplicate
//! submissions cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::two_factor_profile::TwoFactorProfile;
use crate::errors::DomainError;

/// Repository trait for two-factor profile persistence
#[async_trait]
pub trait TwoFactorProfileRepository: Send + Sync {
    /// Find the profile for a user
    ///
    /// # Returns
    /// * `Ok(Some(TwoFactorProfile))` - Profile found
    /// * `Ok(None)` - User has never touched 2FA
    /// * `Err(DomainError)` - Store error
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TwoFactorProfile>, DomainError>;

    /// Promote a secret to active and enable 2FA, creating the profile if
    /// it does not exist yet
    ///
    /// Conditional write: succeeds only while the profile is not already
    /// enabled.
    ///
    /// # Returns
    /// * `Ok(true)` - Profile enabled by this call
    /// * `Ok(false)` - Profile was already enabled; nothing changed
    async fn activate(
        &self,
        user_id: Uuid,
        encrypted_secret: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Destroy the secret and disable 2FA
    ///
    /// # Returns
    /// * `Ok(true)` - Profile disabled by this call
    /// * `Ok(false)` - Profile was not enabled
    async fn deactivate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Record the phone number used for the SMS channel, creating the
    /// profile if needed. Changing the number clears `phone_verified`.
    async fn set_phone(
        &self,
        user_id: Uuid,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Mark the phone number as verified (idempotent)
    async fn mark_phone_verified(&self, user_id: Uuid, now: DateTime<Utc>)
        -> Result<(), DomainError>;

    /// Persist the last accepted TOTP time step for replay protection
    async fn set_last_totp_step(
        &self,
        user_id: Uuid,
        step: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}
