//! Types for verification results

/// Which second factor satisfied the verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMethod {
    Totp,
    BackupCode,
}

/// Successful verification outcome
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    /// The method that verified
    pub method: VerificationMethod,
    /// Unused backup codes left after a backup-code consumption, so the
    /// caller can warn the user when the count runs low
    pub backup_codes_remaining: Option<u32>,
}

/// Snapshot of a user's second-factor state
#[derive(Debug, Clone)]
pub struct TwoFactorStatus {
    /// Whether 2FA is enabled
    pub enabled: bool,
    /// Whether the SMS fallback number is verified
    pub phone_verified: bool,
    /// Unused backup codes in the active batch
    pub backup_codes_remaining: u32,
}
