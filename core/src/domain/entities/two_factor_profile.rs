//! Two-factor profile entity, one record per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Two-factor authentication profile for a user
///
/// Owned exclusively by the user record; mutated only through the enrollment
/// service and the SMS OTP channel. The TOTP secret is stored encrypted and
/// is present only while 2FA is enabled; a disabled profile never carries
/// a secret outside of a pending enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorProfile {
    /// Identifier of the owning user
    pub user_id: Uuid,

    /// AES-GCM ciphertext of the TOTP secret, present only while enabled
    pub secret: Option<String>,

    /// Whether 2FA is currently enabled
    pub enabled: bool,

    /// Timestamp when 2FA was enabled
    pub enabled_at: Option<DateTime<Utc>>,

    /// Phone number for the SMS fallback channel (E.164)
    pub phone_number: Option<String>,

    /// Whether the phone number has been verified via SMS OTP
    pub phone_verified: bool,

    /// Last accepted TOTP time step, used to refuse replay of the same step
    pub last_totp_step: Option<i64>,

    /// Timestamp when the profile was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl TwoFactorProfile {
    /// Creates a fresh, disabled profile for a user
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            secret: None,
            enabled: false,
            enabled_at: None,
            phone_number: None,
            phone_verified: false,
            last_totp_step: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Promotes an encrypted secret to active and marks the profile enabled
    pub fn activate(&mut self, encrypted_secret: String, now: DateTime<Utc>) {
        self.secret = Some(encrypted_secret);
        self.enabled = true;
        self.enabled_at = Some(now);
        self.updated_at = now;
    }

    /// Destroys the secret and disables 2FA
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.secret = None;
        self.enabled = false;
        self.enabled_at = None;
        self.last_totp_step = None;
        self.updated_at = now;
    }

    /// Records the phone number used for the SMS channel
    pub fn set_phone_number(&mut self, phone: String, now: DateTime<Utc>) {
        if self.phone_number.as_deref() != Some(phone.as_str()) {
            self.phone_verified = false;
        }
        self.phone_number = Some(phone);
        self.updated_at = now;
    }

    /// Marks the phone number as verified (idempotent)
    pub fn mark_phone_verified(&mut self, now: DateTime<Utc>) {
        if !self.phone_verified {
            self.phone_verified = true;
            self.updated_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_disabled_without_secret() {
        let profile = TwoFactorProfile::new(Uuid::new_v4());

        assert!(!profile.enabled);
        assert!(profile.secret.is_none());
        assert!(profile.enabled_at.is_none());
        assert!(!profile.phone_verified);
        assert!(profile.last_totp_step.is_none());
    }

    #[test]
    fn test_activate_sets_secret_and_enabled() {
        let mut profile = TwoFactorProfile::new(Uuid::new_v4());
        let now = Utc::now();

        profile.activate("ciphertext".to_string(), now);

        assert!(profile.enabled);
        assert_eq!(profile.secret.as_deref(), Some("ciphertext"));
        assert_eq!(profile.enabled_at, Some(now));
    }

    #[test]
    fn test_deactivate_destroys_secret() {
        let mut profile = TwoFactorProfile::new(Uuid::new_v4());
        let now = Utc::now();
        profile.activate("ciphertext".to_string(), now);
        profile.last_totp_step = Some(55_000_000);

        profile.deactivate(Utc::now());

        assert!(!profile.enabled);
        assert!(profile.secret.is_none());
        assert!(profile.enabled_at.is_none());
        assert!(profile.last_totp_step.is_none());
    }

    #[test]
    fn test_changing_phone_number_resets_verification() {
        let mut profile = TwoFactorProfile::new(Uuid::new_v4());
        let now = Utc::now();

        profile.set_phone_number("+61412345678".to_string(), now);
        profile.mark_phone_verified(now);
        assert!(profile.phone_verified);

        // Same number again keeps the verified flag
        profile.set_phone_number("+61412345678".to_string(), now);
        assert!(profile.phone_verified);

        // A different number must be re-verified
        profile.set_phone_number("+61498765432".to_string(), now);
        assert!(!profile.phone_verified);
    }
}
