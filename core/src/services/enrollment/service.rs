//! Enrollment state machine implementation

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::pending_enrollment::PendingEnrollment;
use crate::domain::entities::rate_limit::RateLimitAction;
use crate::errors::{DomainError, DomainResult, TwoFactorError};
use crate::repositories::backup_code::BackupCodeRepository;
use crate::repositories::pending_enrollment::PendingEnrollmentRepository;
use crate::repositories::profile::TwoFactorProfileRepository;
use crate::services::backup_code::BackupCodeVault;
use crate::services::encryption::SecretCipher;
use crate::services::rate_limit::{RateLimitService, RateLimitStore};
use crate::services::totp::{ChallengeRenderer, TotpEngine};

use super::config::EnrollmentConfig;
use super::traits::PasswordVerifier;
use super::types::{ConfirmEnrollmentResult, StartEnrollmentResult};

/// Service governing the 2FA enrollment state machine
pub struct EnrollmentService<P, N, B, S, V, C>
where
    P: TwoFactorProfileRepository,
    N: PendingEnrollmentRepository,
    B: BackupCodeRepository,
    S: RateLimitStore,
    V: PasswordVerifier,
    C: ChallengeRenderer,
{
    /// Profile persistence
    profile_repository: Arc<P>,
    /// Server-held pending enrollments
    pending_repository: Arc<N>,
    /// Backup code lifecycle
    vault: Arc<BackupCodeVault<B>>,
    /// TOTP secret issuance and verification
    totp_engine: Arc<TotpEngine>,
    /// Rate limiter for confirmation attempts
    rate_limiter: Arc<RateLimitService<S>>,
    /// External primary-auth collaborator
    password_verifier: Arc<V>,
    /// External QR renderer collaborator
    renderer: Arc<C>,
    /// Cipher for secrets at rest
    cipher: Arc<SecretCipher>,
    /// Service configuration
    config: EnrollmentConfig,
}

impl<P, N, B, S, V, C> EnrollmentService<P, N, B, S, V, C>
where
    P: TwoFactorProfileRepository,
    N: PendingEnrollmentRepository,
    B: BackupCodeRepository,
    S: RateLimitStore,
    V: PasswordVerifier,
    C: ChallengeRenderer,
{
    /// Create a new enrollment service
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile_repository: Arc<P>,
        pending_repository: Arc<N>,
        vault: Arc<BackupCodeVault<B>>,
        totp_engine: Arc<TotpEngine>,
        rate_limiter: Arc<RateLimitService<S>>,
        password_verifier: Arc<V>,
        renderer: Arc<C>,
        cipher: Arc<SecretCipher>,
        config: EnrollmentConfig,
    ) -> Self {
        Self {
            profile_repository,
            pending_repository,
            vault,
            totp_engine,
            rate_limiter,
            password_verifier,
            renderer,
            cipher,
            config,
        }
    }

    /// Start enrollment: mint a candidate secret and provisioning artifact
    ///
    /// Valid only while 2FA is not enabled. Re-invoking supersedes any
    /// existing pending enrollment; candidates never accumulate.
    pub async fn start(
        &self,
        user_id: Uuid,
        account_label: &str,
    ) -> DomainResult<StartEnrollmentResult> {
        self.ensure_not_enabled(user_id).await?;

        let generated = self.totp_engine.generate_secret(account_label)?;
        let challenge_image =
            self.renderer
                .render(&generated.provisioning_uri)
                .map_err(|reason| {
                    tracing::error!(
                        user_id = %user_id,
                        reason = %reason,
                        event = "challenge_render_failed",
                        "QR renderer failed"
                    );
                    DomainError::Internal {
                        message: "Failed to render enrollment challenge".to_string(),
                    }
                })?;

        self.pending_repository
            .put(PendingEnrollment::new_with_ttl(
                user_id,
                generated.secret.clone(),
                self.config.pending_ttl_minutes,
            ))
            .await?;

        tracing::info!(
            user_id = %user_id,
            event = "enrollment_started",
            "Issued pending enrollment secret"
        );

        Ok(StartEnrollmentResult {
            secret: generated.secret,
            provisioning_uri: generated.provisioning_uri,
            challenge_image,
        })
    }

    /// Confirm enrollment with the first TOTP code
    ///
    /// On success, atomically claims the pending secret, promotes it
    /// (encrypted) to the active profile secret, issues the first backup
    /// code batch and resets the `totp` counter. On failure the counter is
    /// incremented and the enrollment stays pending.
    pub async fn confirm(&self, user_id: Uuid, code: &str) -> DomainResult<ConfirmEnrollmentResult> {
        self.ensure_not_enabled(user_id).await?;

        let now = Utc::now();
        let pending = match self.pending_repository.find(user_id).await? {
            Some(pending) if !pending.is_expired(now) => pending,
            Some(_) => {
                // Expired candidates are dead; clean up eagerly
                self.pending_repository.remove(user_id).await?;
                return Err(TwoFactorError::NoPendingEnrollment.into());
            }
            None => return Err(TwoFactorError::NoPendingEnrollment.into()),
        };

        let decision = self.rate_limiter.check(user_id, RateLimitAction::Totp).await?;
        if !decision.allowed {
            return Err(decision.into_error(now).into());
        }

        let verified = self
            .totp_engine
            .verify(&pending.candidate_secret, code, now)?;
        if !verified {
            tracing::warn!(
                user_id = %user_id,
                event = "enrollment_confirm_failed",
                "Enrollment confirmation code did not verify"
            );
            self.rate_limiter
                .record_failure(user_id, RateLimitAction::Totp)
                .await?;
            return Err(TwoFactorError::InvalidCode.into());
        }

        // Claim the pending record; a concurrent confirm gets None here
        let claimed = self
            .pending_repository
            .take(user_id)
            .await?
            .ok_or(TwoFactorError::NoPendingEnrollment)?;

        let encrypted = self.cipher.encrypt(&claimed.candidate_secret)?;
        let activated = self
            .profile_repository
            .activate(user_id, &encrypted, now)
            .await?;
        if !activated {
            return Err(TwoFactorError::AlreadyEnabled.into());
        }

        let backup_codes = self.vault.generate_batch(user_id).await?;
        self.rate_limiter.reset(user_id, RateLimitAction::Totp).await?;

        tracing::info!(
            user_id = %user_id,
            event = "enrollment_confirmed",
            "Two-factor authentication enabled"
        );

        Ok(ConfirmEnrollmentResult { backup_codes })
    }

    /// Disable 2FA after password re-authentication
    ///
    /// Destroys the secret, any pending enrollment and every backup code.
    pub async fn disable(&self, user_id: Uuid, password: &str) -> DomainResult<()> {
        self.ensure_enabled(user_id).await?;
        self.reauthenticate(user_id, password).await?;

        let now = Utc::now();
        let deactivated = self.profile_repository.deactivate(user_id, now).await?;
        if !deactivated {
            return Err(TwoFactorError::NotEnabled.into());
        }

        // Orphaned credentials are unreachable once the profile is disabled;
        // remove them anyway
        self.vault.clear(user_id).await?;
        self.pending_repository.remove(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            event = "two_factor_disabled",
            "Two-factor authentication disabled, credentials destroyed"
        );

        Ok(())
    }

    /// Regenerate backup codes after password re-authentication
    ///
    /// Equivalent to a fresh batch generation: all prior codes, used or
    /// unused, are invalidated.
    pub async fn regenerate_backup_codes(
        &self,
        user_id: Uuid,
        password: &str,
    ) -> DomainResult<Vec<String>> {
        self.ensure_enabled(user_id).await?;
        self.reauthenticate(user_id, password).await?;

        self.vault.generate_batch(user_id).await
    }

    /// Shared re-authentication step for disable and regenerate
    async fn reauthenticate(&self, user_id: Uuid, password: &str) -> DomainResult<()> {
        let valid = self
            .password_verifier
            .verify_password(user_id, password)
            .await
            .map_err(|reason| {
                tracing::error!(
                    user_id = %user_id,
                    reason = %reason,
                    event = "reauthentication_error",
                    "Primary-auth collaborator failed"
                );
                DomainError::Internal {
                    message: "Re-authentication unavailable".to_string(),
                }
            })?;

        if !valid {
            tracing::warn!(
                user_id = %user_id,
                event = "reauthentication_rejected",
                "Password re-check failed"
            );
            return Err(TwoFactorError::AuthenticationFailed.into());
        }

        Ok(())
    }

    async fn ensure_not_enabled(&self, user_id: Uuid) -> DomainResult<()> {
        match self.profile_repository.find_by_user(user_id).await? {
            Some(profile) if profile.enabled => Err(TwoFactorError::AlreadyEnabled.into()),
            _ => Ok(()),
        }
    }

    async fn ensure_enabled(&self, user_id: Uuid) -> DomainResult<()> {
        match self.profile_repository.find_by_user(user_id).await? {
            Some(profile) if profile.enabled => Ok(()),
            _ => Err(TwoFactorError::NotEnabled.into()),
        }
    }
}
