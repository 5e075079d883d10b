//! Collaborator traits for enrollment

use async_trait::async_trait;
use uuid::Uuid;

/// Trait for the external primary-authentication collaborator
///
/// Disable and backup-code regeneration re-check the account password
/// before touching credentials. Password handling itself is entirely
/// outside this subsystem.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// Check a password against the user's primary credentials
    ///
    /// # Returns
    /// * `Ok(true)` - Password is correct
    /// * `Ok(false)` - Password is wrong
    /// * `Err(reason)` - The primary-auth system could not answer
    async fn verify_password(&self, user_id: Uuid, password: &str) -> Result<bool, String>;
}
