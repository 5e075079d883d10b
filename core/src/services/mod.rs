//! Business services containing domain logic and use cases.

pub mod backup_code;
pub mod encryption;
pub mod enrollment;
pub mod rate_limit;
pub mod sms_otp;
pub mod totp;
pub mod verification;

// Re-export commonly used types
pub use backup_code::{BackupCodeConfig, BackupCodeVault};
pub use encryption::SecretCipher;
pub use enrollment::{
    ConfirmEnrollmentResult, EnrollmentConfig, EnrollmentService, PasswordVerifier,
    StartEnrollmentResult,
};
pub use rate_limit::{InMemoryRateLimitStore, RateLimitDecision, RateLimitService, RateLimitStore};
pub use sms_otp::{SendOtpResult, SmsGateway, SmsOtpChannel, SmsOtpConfig};
pub use totp::{ChallengeRenderer, GeneratedSecret, TotpConfig, TotpEngine};
pub use verification::{
    TwoFactorStatus, VerificationMethod, VerificationOrchestrator, VerifyOutcome,
};
