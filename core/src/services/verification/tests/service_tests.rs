//! Unit tests for the verification orchestrator

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use sf_shared::config::rate_limit::RateLimitConfig;

use crate::errors::{DomainError, TwoFactorError};
use crate::repositories::backup_code::MockBackupCodeRepository;
use crate::repositories::profile::{MockProfileRepository, TwoFactorProfileRepository};
use crate::services::backup_code::{BackupCodeConfig, BackupCodeVault};
use crate::services::encryption::SecretCipher;
use crate::services::rate_limit::{InMemoryRateLimitStore, RateLimitService, RateLimitStore};
use crate::services::totp::TotpEngine;
use crate::services::verification::{VerificationMethod, VerificationOrchestrator};

use super::mocks::FailingRateLimitStore;

struct Fixture<S: RateLimitStore> {
    orchestrator: VerificationOrchestrator<MockProfileRepository, MockBackupCodeRepository, S>,
    profiles: Arc<MockProfileRepository>,
    vault: Arc<BackupCodeVault<MockBackupCodeRepository>>,
    engine: Arc<TotpEngine>,
    cipher: Arc<SecretCipher>,
}

fn fixture_with_store<S: RateLimitStore>(store: S) -> Fixture<S> {
    let profiles = Arc::new(MockProfileRepository::new());
    let vault = Arc::new(BackupCodeVault::new(
        Arc::new(MockBackupCodeRepository::new()),
        BackupCodeConfig::fast_for_tests(),
    ));
    let engine = Arc::new(TotpEngine::new());
    let cipher = Arc::new(SecretCipher::new(&[9u8; 32]));
    let orchestrator = VerificationOrchestrator::new(
        profiles.clone(),
        vault.clone(),
        engine.clone(),
        Arc::new(RateLimitService::new(
            Arc::new(store),
            RateLimitConfig::default(),
        )),
        cipher.clone(),
    );
    Fixture {
        orchestrator,
        profiles,
        vault,
        engine,
        cipher,
    }
}

fn fixture() -> Fixture<InMemoryRateLimitStore> {
    fixture_with_store(InMemoryRateLimitStore::new())
}

/// Set up an enabled user; returns the plaintext TOTP secret and backup codes
async fn enable_user<S: RateLimitStore>(f: &Fixture<S>, user_id: Uuid) -> (String, Vec<String>) {
    let secret = f.engine.generate_secret("user@example.com").unwrap().secret;
    let encrypted = f.cipher.encrypt(&secret).unwrap();
    assert!(f
        .profiles
        .activate(user_id, &encrypted, Utc::now())
        .await
        .unwrap());
    let codes = f.vault.generate_batch(user_id).await.unwrap();
    (secret, codes)
}

#[tokio::test]
async fn test_totp_verification_succeeds() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (secret, _) = enable_user(&f, user_id).await;

    let code = f.engine.code_at(&secret, Utc::now()).unwrap();
    let outcome = f.orchestrator.verify(user_id, &code, false).await.unwrap();

    assert_eq!(outcome.method, VerificationMethod::Totp);
    assert!(outcome.backup_codes_remaining.is_none());
}

#[tokio::test]
async fn test_totp_replay_of_same_step_is_refused() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (secret, _) = enable_user(&f, user_id).await;

    let code = f.engine.code_at(&secret, Utc::now()).unwrap();
    f.orchestrator.verify(user_id, &code, false).await.unwrap();

    let replay = f.orchestrator.verify(user_id, &code, false).await;
    assert!(replay.unwrap_err().is_invalid_code());
}

#[tokio::test]
async fn test_backup_code_verification_reports_remaining() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (_, codes) = enable_user(&f, user_id).await;

    let outcome = f
        .orchestrator
        .verify(user_id, &codes[2], true)
        .await
        .unwrap();

    assert_eq!(outcome.method, VerificationMethod::BackupCode);
    assert_eq!(outcome.backup_codes_remaining, Some(9));
}

#[tokio::test]
async fn test_backup_code_is_single_use() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (_, codes) = enable_user(&f, user_id).await;

    f.orchestrator.verify(user_id, &codes[2], true).await.unwrap();

    let retry = f.orchestrator.verify(user_id, &codes[2], true).await;
    assert!(retry.unwrap_err().is_invalid_code());
}

#[tokio::test]
async fn test_verify_without_enrollment_is_rejected() {
    let f = fixture();
    let user_id = Uuid::new_v4();

    let result = f.orchestrator.verify(user_id, "123456", false).await;
    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::NotEnabled))
    ));
}

#[tokio::test]
async fn test_failed_attempts_lock_the_backup_action() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (_, codes) = enable_user(&f, user_id).await;

    // Backup policy admits 3 failures
    for _ in 0..3 {
        let result = f.orchestrator.verify(user_id, "WRONG-WRONG", true).await;
        assert!(result.unwrap_err().is_invalid_code());
    }

    // Locked out now, even for a valid code; the lockout carries reset data
    let result = f.orchestrator.verify(user_id, &codes[0], true).await;
    match result.unwrap_err() {
        DomainError::TwoFactor(TwoFactorError::RateLimited {
            reset_at,
            remaining_attempts,
        }) => {
            assert!(reset_at > Utc::now());
            assert_eq!(remaining_attempts, 0);
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_resets_the_failure_counter() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (secret, _) = enable_user(&f, user_id).await;

    // Burn most of the TOTP budget with failures
    for _ in 0..9 {
        let result = f.orchestrator.verify(user_id, "000000", false).await;
        // Accept the one-in-a-million case where 000000 is the real code
        if result.is_ok() {
            return;
        }
    }

    let code = f.engine.code_at(&secret, Utc::now()).unwrap();
    f.orchestrator.verify(user_id, &code, false).await.unwrap();

    // Counter is back to zero: nine more failures are admitted again
    for _ in 0..9 {
        let result = f.orchestrator.verify(user_id, "000001", false).await;
        if let Err(err) = result {
            assert!(err.is_invalid_code());
        }
    }
}

#[tokio::test]
async fn test_rate_limiter_failure_denies_verification() {
    let f = fixture_with_store(FailingRateLimitStore);
    let user_id = Uuid::new_v4();
    let (secret, _) = enable_user(&f, user_id).await;

    // Fail-closed: a valid code is denied when the counter store is down
    let code = f.engine.code_at(&secret, Utc::now()).unwrap();
    let result = f.orchestrator.verify(user_id, &code, false).await;
    assert!(matches!(result, Err(DomainError::Internal { .. })));
}

#[tokio::test]
async fn test_status_for_unknown_user() {
    let f = fixture();

    let status = f.orchestrator.status(Uuid::new_v4()).await.unwrap();

    assert!(!status.enabled);
    assert!(!status.phone_verified);
    assert_eq!(status.backup_codes_remaining, 0);
}

#[tokio::test]
async fn test_status_for_enabled_user() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let (_, codes) = enable_user(&f, user_id).await;
    f.orchestrator.verify(user_id, &codes[0], true).await.unwrap();

    let status = f.orchestrator.status(user_id).await.unwrap();

    assert!(status.enabled);
    assert_eq!(status.backup_codes_remaining, 9);
}
