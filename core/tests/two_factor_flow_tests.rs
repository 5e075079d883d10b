//! Integration tests exercising the full second-factor flow through the
//! public API: enrollment, verification, recovery and the SMS fallback.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use sf_core::errors::{DomainError, TwoFactorError};
use sf_core::repositories::{
    MockBackupCodeRepository, MockOtpChallengeRepository, MockPendingEnrollmentRepository,
    MockProfileRepository,
};
use sf_core::services::{
    BackupCodeConfig, BackupCodeVault, ChallengeRenderer, EnrollmentConfig, EnrollmentService,
    InMemoryRateLimitStore, PasswordVerifier, RateLimitService, SecretCipher, SmsGateway,
    SmsOtpChannel, SmsOtpConfig, TotpEngine, VerificationMethod, VerificationOrchestrator,
};
use sf_shared::config::rate_limit::RateLimitConfig;

const PASSWORD: &str = "hunter2hunter2";

struct StaticPasswordVerifier;

#[async_trait]
impl PasswordVerifier for StaticPasswordVerifier {
    async fn verify_password(&self, _user_id: Uuid, password: &str) -> Result<bool, String> {
        Ok(password == PASSWORD)
    }
}

struct NullRenderer;

impl ChallengeRenderer for NullRenderer {
    fn render(&self, _provisioning_uri: &str) -> Result<String, String> {
        Ok("data:image/png;base64,QQ==".to_string())
    }
}

struct RecordingGateway {
    last: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send_otp(&self, _phone_number: &str, code: &str) -> Result<String, String> {
        *self.last.lock().unwrap() = Some(code.to_string());
        Ok("msg-1".to_string())
    }
}

struct Subsystem {
    enrollment: EnrollmentService<
        MockProfileRepository,
        MockPendingEnrollmentRepository,
        MockBackupCodeRepository,
        InMemoryRateLimitStore,
        StaticPasswordVerifier,
        NullRenderer,
    >,
    orchestrator: VerificationOrchestrator<
        MockProfileRepository,
        MockBackupCodeRepository,
        InMemoryRateLimitStore,
    >,
    sms: SmsOtpChannel<
        RecordingGateway,
        MockOtpChallengeRepository,
        MockProfileRepository,
        InMemoryRateLimitStore,
    >,
    gateway: Arc<RecordingGateway>,
    engine: Arc<TotpEngine>,
}

/// Wire the whole subsystem against in-memory backends, the way the
/// surrounding application composes it
fn subsystem() -> Subsystem {
    let profiles = Arc::new(MockProfileRepository::new());
    let vault = Arc::new(BackupCodeVault::new(
        Arc::new(MockBackupCodeRepository::new()),
        BackupCodeConfig::fast_for_tests(),
    ));
    let engine = Arc::new(TotpEngine::new());
    let cipher = Arc::new(SecretCipher::new(&[3u8; 32]));
    let rate_limiter = Arc::new(RateLimitService::new(
        Arc::new(InMemoryRateLimitStore::new()),
        RateLimitConfig::default(),
    ));
    let gateway = Arc::new(RecordingGateway {
        last: std::sync::Mutex::new(None),
    });

    let enrollment = EnrollmentService::new(
        profiles.clone(),
        Arc::new(MockPendingEnrollmentRepository::new()),
        vault.clone(),
        engine.clone(),
        rate_limiter.clone(),
        Arc::new(StaticPasswordVerifier),
        Arc::new(NullRenderer),
        cipher.clone(),
        EnrollmentConfig::default(),
    );
    let orchestrator = VerificationOrchestrator::new(
        profiles.clone(),
        vault.clone(),
        engine.clone(),
        rate_limiter.clone(),
        cipher,
    );
    let sms = SmsOtpChannel::new(
        gateway.clone(),
        Arc::new(MockOtpChallengeRepository::new()),
        profiles,
        rate_limiter,
        SmsOtpConfig::default(),
    );

    Subsystem {
        enrollment,
        orchestrator,
        sms,
        gateway,
        engine,
    }
}

#[tokio::test]
async fn test_enroll_verify_and_recover() {
    let s = subsystem();
    let user_id = Uuid::new_v4();

    // Enroll: start returns a secret, confirm with its current code
    let started = s.enrollment.start(user_id, "user@example.com").await.unwrap();
    let code = s.engine.code_at(&started.secret, Utc::now()).unwrap();
    let confirmed = s.enrollment.confirm(user_id, &code).await.unwrap();
    assert_eq!(confirmed.backup_codes.len(), 10);

    let status = s.orchestrator.status(user_id).await.unwrap();
    assert!(status.enabled);
    assert_eq!(status.backup_codes_remaining, 10);

    // A fresh TOTP code verifies, but the same step only once; a backup
    // code covers the replay-refused retry
    let login_code = s.engine.code_at(&started.secret, Utc::now()).unwrap();
    let outcome = s
        .orchestrator
        .verify(user_id, &login_code, false)
        .await
        .unwrap();
    assert_eq!(outcome.method, VerificationMethod::Totp);

    let recovery = s
        .orchestrator
        .verify(user_id, &confirmed.backup_codes[4], true)
        .await
        .unwrap();
    assert_eq!(recovery.method, VerificationMethod::BackupCode);
    assert_eq!(recovery.backup_codes_remaining, Some(9));

    // Consuming the same backup code again fails
    let retry = s
        .orchestrator
        .verify(user_id, &confirmed.backup_codes[4], true)
        .await;
    assert!(retry.unwrap_err().is_invalid_code());
}

#[tokio::test]
async fn test_disable_destroys_all_credentials() {
    let s = subsystem();
    let user_id = Uuid::new_v4();

    let started = s.enrollment.start(user_id, "user@example.com").await.unwrap();
    let code = s.engine.code_at(&started.secret, Utc::now()).unwrap();
    let confirmed = s.enrollment.confirm(user_id, &code).await.unwrap();

    // Wrong password leaves everything in place
    let denied = s.enrollment.disable(user_id, "nope").await;
    assert!(matches!(
        denied,
        Err(DomainError::TwoFactor(TwoFactorError::AuthenticationFailed))
    ));
    assert!(s.orchestrator.status(user_id).await.unwrap().enabled);

    s.enrollment.disable(user_id, PASSWORD).await.unwrap();

    let status = s.orchestrator.status(user_id).await.unwrap();
    assert!(!status.enabled);
    assert_eq!(status.backup_codes_remaining, 0);

    // Verification of any kind is now refused as not-enabled
    let result = s
        .orchestrator
        .verify(user_id, &confirmed.backup_codes[0], true)
        .await;
    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::NotEnabled))
    ));
}

#[tokio::test]
async fn test_sms_fallback_marks_phone_verified() {
    let s = subsystem();
    let user_id = Uuid::new_v4();

    s.sms.send(user_id, "+61412345678").await.unwrap();
    let code = s.gateway.last.lock().unwrap().clone().unwrap();
    s.sms.verify(user_id, &code).await.unwrap();

    let status = s.orchestrator.status(user_id).await.unwrap();
    assert!(status.phone_verified);
}

#[tokio::test]
async fn test_backup_lockout_does_not_block_totp() {
    let s = subsystem();
    let user_id = Uuid::new_v4();

    let started = s.enrollment.start(user_id, "user@example.com").await.unwrap();
    let code = s.engine.code_at(&started.secret, Utc::now()).unwrap();
    s.enrollment.confirm(user_id, &code).await.unwrap();

    // Exhaust the backup-code budget
    for _ in 0..3 {
        let _ = s.orchestrator.verify(user_id, "XXXXX-XXXXX", true).await;
    }
    let locked = s.orchestrator.verify(user_id, "XXXXX-XXXXX", true).await;
    assert!(locked.unwrap_err().is_rate_limited());

    // The TOTP bucket is unaffected
    let fresh_code = s.engine.code_at(&started.secret, Utc::now()).unwrap();
    let result = s.orchestrator.verify(user_id, &fresh_code, false).await;
    // The confirm step consumed this step already if the clock did not
    // advance; either a success or a replay refusal proves the bucket is
    // open, a RateLimited here would fail the match
    match result {
        Ok(outcome) => assert_eq!(outcome.method, VerificationMethod::Totp),
        Err(err) => assert!(err.is_invalid_code()),
    }
}
