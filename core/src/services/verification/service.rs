//! Verification orchestrator implementation

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::rate_limit::RateLimitAction;
use crate::errors::{DomainError, DomainResult, TwoFactorError};
use crate::repositories::backup_code::BackupCodeRepository;
use crate::repositories::profile::TwoFactorProfileRepository;
use crate::services::backup_code::BackupCodeVault;
use crate::services::encryption::SecretCipher;
use crate::services::rate_limit::{RateLimitService, RateLimitStore};
use crate::services::totp::TotpEngine;

use super::types::{TwoFactorStatus, VerificationMethod, VerifyOutcome};

/// Orchestrator dispatching verification requests
///
/// The flow for every request: rate-limit gate first (no verification work
/// happens while locked out), then dispatch, then counter bookkeeping.
/// Failure responses are deliberately uniform: wrong, expired and
/// already-used all come back as the same `InvalidCode`.
pub struct VerificationOrchestrator<P, B, S>
where
    P: TwoFactorProfileRepository,
    B: BackupCodeRepository,
    S: RateLimitStore,
{
    /// Profile persistence
    profile_repository: Arc<P>,
    /// Backup code lifecycle
    vault: Arc<BackupCodeVault<B>>,
    /// TOTP verification
    totp_engine: Arc<TotpEngine>,
    /// Rate limiter
    rate_limiter: Arc<RateLimitService<S>>,
    /// Cipher for secrets at rest
    cipher: Arc<SecretCipher>,
}

impl<P, B, S> VerificationOrchestrator<P, B, S>
where
    P: TwoFactorProfileRepository,
    B: BackupCodeRepository,
    S: RateLimitStore,
{
    /// Create a new orchestrator
    pub fn new(
        profile_repository: Arc<P>,
        vault: Arc<BackupCodeVault<B>>,
        totp_engine: Arc<TotpEngine>,
        rate_limiter: Arc<RateLimitService<S>>,
        cipher: Arc<SecretCipher>,
    ) -> Self {
        Self {
            profile_repository,
            vault,
            totp_engine,
            rate_limiter,
            cipher,
        }
    }

    /// Verify a second-factor token
    ///
    /// This method:
    /// 1. Resolves the action class (`backup_code` or `totp`)
    /// 2. Checks the rate limit; refuses immediately while locked out
    /// 3. Dispatches to the backup code vault or the TOTP engine
    /// 4. On failure, increments the action counter and returns the
    ///    undifferentiated `InvalidCode`
    /// 5. On success, resets the counter and reports which method verified
    pub async fn verify(
        &self,
        user_id: Uuid,
        token: &str,
        is_backup_code: bool,
    ) -> DomainResult<VerifyOutcome> {
        let action = if is_backup_code {
            RateLimitAction::BackupCode
        } else {
            RateLimitAction::Totp
        };

        let decision = self.rate_limiter.check(user_id, action).await?;
        let now = Utc::now();
        if !decision.allowed {
            return Err(decision.into_error(now).into());
        }

        let profile = self
            .profile_repository
            .find_by_user(user_id)
            .await?
            .filter(|p| p.enabled)
            .ok_or(TwoFactorError::NotEnabled)?;

        let outcome = if is_backup_code {
            let consumed = self.vault.verify_and_consume(user_id, token).await?;
            if consumed {
                let remaining = self.vault.remaining(user_id).await?;
                Some(VerifyOutcome {
                    method: VerificationMethod::BackupCode,
                    backup_codes_remaining: Some(remaining),
                })
            } else {
                None
            }
        } else {
            self.verify_totp(&profile, token).await?
        };

        match outcome {
            Some(outcome) => {
                self.rate_limiter.reset(user_id, action).await?;
                tracing::info!(
                    user_id = %user_id,
                    action = action.as_str(),
                    event = "second_factor_verified",
                    "Second factor verified"
                );
                Ok(outcome)
            }
            None => {
                tracing::warn!(
                    user_id = %user_id,
                    action = action.as_str(),
                    event = "second_factor_rejected",
                    "Second factor verification failed"
                );
                self.rate_limiter.record_failure(user_id, action).await?;
                Err(TwoFactorError::InvalidCode.into())
            }
        }
    }

    /// Report the second-factor state for a user
    pub async fn status(&self, user_id: Uuid) -> DomainResult<TwoFactorStatus> {
        let profile = self.profile_repository.find_by_user(user_id).await?;
        let backup_codes_remaining = self.vault.remaining(user_id).await?;

        Ok(match profile {
            Some(profile) => TwoFactorStatus {
                enabled: profile.enabled,
                phone_verified: profile.phone_verified,
                backup_codes_remaining,
            },
            None => TwoFactorStatus {
                enabled: false,
                phone_verified: false,
                backup_codes_remaining,
            },
        })
    }

    /// TOTP dispatch: decrypt the stored secret, verify within the drift
    /// window, and refuse a replay of the last accepted time step
    async fn verify_totp(
        &self,
        profile: &crate::domain::entities::two_factor_profile::TwoFactorProfile,
        token: &str,
    ) -> DomainResult<Option<VerifyOutcome>> {
        let encrypted = profile.secret.as_deref().ok_or_else(|| {
            // Enabled without a secret is corrupt state, not a bad code
            tracing::error!(
                user_id = %profile.user_id,
                event = "profile_secret_missing",
                "Enabled profile has no stored secret"
            );
            DomainError::Internal {
                message: "Two-factor profile is corrupt".to_string(),
            }
        })?;

        let secret = self.cipher.decrypt(encrypted)?;
        let now = Utc::now();

        let matched_step = self.totp_engine.verify_with_step(&secret, token, now)?;
        let step = match matched_step {
            Some(step) => step,
            None => return Ok(None),
        };

        // Replay protection: a code from an already-accepted step is a
        // normal failure, indistinguishable from a wrong code
        if profile.last_totp_step == Some(step) {
            tracing::warn!(
                user_id = %profile.user_id,
                event = "totp_replay_refused",
                "TOTP code for an already-accepted step refused"
            );
            return Ok(None);
        }

        self.profile_repository
            .set_last_totp_step(profile.user_id, step, now)
            .await?;

        Ok(Some(VerifyOutcome {
            method: VerificationMethod::Totp,
            backup_codes_remaining: None,
        }))
    }
}
