//! Configuration for the SMS OTP channel

use crate::domain::entities::otp_challenge::DEFAULT_CHALLENGE_TTL_MINUTES;

/// Configuration for the SMS OTP channel
#[derive(Debug, Clone)]
pub struct SmsOtpConfig {
    /// Number of minutes before a challenge expires
    pub code_ttl_minutes: i64,
    /// Minimum seconds between send requests for the same user
    pub resend_cooldown_seconds: i64,
}

impl Default for SmsOtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: DEFAULT_CHALLENGE_TTL_MINUTES,
            resend_cooldown_seconds: 60,
        }
    }
}
