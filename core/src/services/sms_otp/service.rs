//! SMS OTP send and verify flows

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use sf_shared::utils::phone::{is_valid_phone_number, mask_phone_number};

use crate::domain::entities::otp_challenge::{OtpChallenge, OtpChannel, OTP_CODE_LENGTH};
use crate::domain::entities::rate_limit::RateLimitAction;
use crate::errors::{DomainResult, TwoFactorError, ValidationError};
use crate::repositories::otp_challenge::OtpChallengeRepository;
use crate::repositories::profile::TwoFactorProfileRepository;
use crate::services::rate_limit::{RateLimitService, RateLimitStore};

use super::config::SmsOtpConfig;
use super::traits::SmsGateway;

/// Result of sending an OTP over SMS
#[derive(Debug, Clone)]
pub struct SendOtpResult {
    /// Provider-assigned message identifier
    pub message_id: String,
    /// When the challenge expires
    pub expires_at: DateTime<Utc>,
    /// When the user can request another code
    pub next_resend_at: DateTime<Utc>,
}

/// SMS one-time-password channel
///
/// The challenge is persisted before the delivery call is made, and a
/// delivery failure leaves it in place: lifecycle and delivery are
/// decoupled so the channel never burns a code on a flaky gateway.
pub struct SmsOtpChannel<G, O, P, S>
where
    G: SmsGateway,
    O: OtpChallengeRepository,
    P: TwoFactorProfileRepository,
    S: RateLimitStore,
{
    /// Gateway for external SMS delivery
    gateway: Arc<G>,
    /// Challenge persistence
    challenge_repository: Arc<O>,
    /// Profile persistence, for the phone-verified flag
    profile_repository: Arc<P>,
    /// Rate limiter guarding verification attempts
    rate_limiter: Arc<RateLimitService<S>>,
    /// Channel configuration
    config: SmsOtpConfig,
}

impl<G, O, P, S> SmsOtpChannel<G, O, P, S>
where
    G: SmsGateway,
    O: OtpChallengeRepository,
    P: TwoFactorProfileRepository,
    S: RateLimitStore,
{
    /// Create a new SMS OTP channel
    pub fn new(
        gateway: Arc<G>,
        challenge_repository: Arc<O>,
        profile_repository: Arc<P>,
        rate_limiter: Arc<RateLimitService<S>>,
        config: SmsOtpConfig,
    ) -> Self {
        Self {
            gateway,
            challenge_repository,
            profile_repository,
            rate_limiter,
            config,
        }
    }

    /// Send a one-time password to a phone number
    ///
    /// This method:
    /// 1. Validates the phone number format (E.164)
    /// 2. Enforces the resend cooldown against the current challenge
    /// 3. Generates a code, stores its hash as the new challenge
    /// 4. Only then calls the delivery gateway
    pub async fn send(&self, user_id: Uuid, phone_number: &str) -> DomainResult<SendOtpResult> {
        if !is_valid_phone_number(phone_number) {
            return Err(ValidationError::InvalidPhoneFormat {
                phone: mask_phone_number(phone_number),
            }
            .into());
        }

        let now = Utc::now();

        // Resend cooldown: the newest challenge gates how soon a fresh code
        // may be requested
        if let Some(current) = self
            .challenge_repository
            .find_current(user_id, OtpChannel::Sms)
            .await?
        {
            let cooldown_ends =
                current.created_at + Duration::seconds(self.config.resend_cooldown_seconds);
            if !current.consumed && now < cooldown_ends {
                tracing::warn!(
                    user_id = %user_id,
                    phone = %mask_phone_number(phone_number),
                    event = "otp_resend_throttled",
                    "OTP resend requested within cooldown"
                );
                return Err(TwoFactorError::RateLimited {
                    reset_at: cooldown_ends,
                    remaining_attempts: 0,
                }
                .into());
            }
        }

        let code = generate_otp_code();
        let challenge = OtpChallenge::new_sms_with_ttl(
            user_id,
            phone_number.to_string(),
            hash_code(&code),
            self.config.code_ttl_minutes,
        );
        let expires_at = challenge.expires_at;
        let created_at = challenge.created_at;

        // Remember the phone number on the profile; verification flips the
        // verified flag later
        self.profile_repository
            .set_phone(user_id, phone_number, now)
            .await?;

        // Store before delivering. A gateway failure must not roll this
        // back; the challenge stays valid for its TTL.
        self.challenge_repository.put(challenge).await?;

        tracing::info!(
            user_id = %user_id,
            phone = %mask_phone_number(phone_number),
            event = "otp_challenge_created",
            "Stored new SMS OTP challenge"
        );

        let message_id = match self.gateway.send_otp(phone_number, &code).await {
            Ok(message_id) => message_id,
            Err(reason) => {
                tracing::error!(
                    user_id = %user_id,
                    phone = %mask_phone_number(phone_number),
                    reason = %reason,
                    event = "otp_delivery_failed",
                    "SMS gateway failed to deliver OTP"
                );
                return Err(TwoFactorError::DeliveryFailed.into());
            }
        };

        Ok(SendOtpResult {
            message_id,
            expires_at,
            next_resend_at: created_at + Duration::seconds(self.config.resend_cooldown_seconds),
        })
    }

    /// Verify a one-time password
    ///
    /// Checks the rate limit for the `sms` action, compares the candidate
    /// against the newest unexpired unconsumed challenge in constant time,
    /// consumes it on success and marks the profile's phone number verified
    /// (idempotent thereafter).
    pub async fn verify(&self, user_id: Uuid, candidate: &str) -> DomainResult<()> {
        let decision = self.rate_limiter.check(user_id, RateLimitAction::Sms).await?;
        let now = Utc::now();
        if !decision.allowed {
            return Err(decision.into_error(now).into());
        }

        if candidate.len() != OTP_CODE_LENGTH || !candidate.chars().all(|c| c.is_ascii_digit()) {
            return self.fail(user_id, "invalid_format").await;
        }

        let challenge = match self
            .challenge_repository
            .find_current(user_id, OtpChannel::Sms)
            .await?
        {
            Some(challenge) if challenge.is_usable(now) => challenge,
            // Missing, expired and consumed all look identical to callers
            _ => return self.fail(user_id, "no_usable_challenge").await,
        };

        let candidate_hash = hash_code(candidate);
        if !constant_time_eq(candidate_hash.as_bytes(), challenge.code_hash.as_bytes()) {
            return self.fail(user_id, "code_mismatch").await;
        }

        let consumed = self
            .challenge_repository
            .consume(user_id, OtpChannel::Sms, challenge.id, now)
            .await?;
        if !consumed {
            // Lost a race against a concurrent submission of the same code
            return self.fail(user_id, "already_consumed").await;
        }

        self.rate_limiter.reset(user_id, RateLimitAction::Sms).await?;
        self.profile_repository
            .mark_phone_verified(user_id, now)
            .await?;

        tracing::info!(
            user_id = %user_id,
            event = "otp_verified",
            "SMS OTP verified and consumed"
        );

        Ok(())
    }

    /// Record a failed attempt and return the undifferentiated rejection
    async fn fail(&self, user_id: Uuid, reason: &'static str) -> DomainResult<()> {
        tracing::warn!(
            user_id = %user_id,
            reason = reason,
            event = "otp_verification_failed",
            "SMS OTP verification failed"
        );
        self.rate_limiter
            .record_failure(user_id, RateLimitAction::Sms)
            .await?;
        Err(TwoFactorError::InvalidCode.into())
    }
}

/// Generate a random fixed-length numeric code using the OS CSPRNG
fn generate_otp_code() -> String {
    let mut rng = OsRng;
    let mut bytes = [0u8; 4];
    rng.fill_bytes(&mut bytes);
    let num = u32::from_le_bytes(bytes);
    // Modulo bias is negligible at this range
    format!("{:06}", num % 1_000_000)
}

/// Hash an OTP code with SHA-256 for storage
fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
