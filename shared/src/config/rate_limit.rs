//! Rate limiting configuration module
//!
//! Every second-factor verification action has its own failure budget and
//! lockout window. Backup codes get the strictest policy (each valid code is
//! precious and a failed guess is cheap), SMS a moderate one (delivery has
//! real cost), TOTP the most lenient (tolerate user typos).

use serde::{Deserialize, Serialize};

/// Failure threshold and lockout window for a single verification action
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RateLimitPolicy {
    /// Failed attempts allowed within the window before locking out
    pub max_failures: u32,

    /// Length of the counting window in seconds
    pub window_seconds: u64,

    /// Lockout duration in seconds once the threshold is reached
    pub lockout_seconds: u64,
}

impl RateLimitPolicy {
    /// Create a new policy
    pub fn new(max_failures: u32, window_seconds: u64, lockout_seconds: u64) -> Self {
        Self {
            max_failures,
            window_seconds,
            lockout_seconds,
        }
    }
}

/// Rate limiting configuration for all verification actions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// TOTP verification attempts
    pub totp: RateLimitPolicy,

    /// SMS OTP verification attempts
    pub sms: RateLimitPolicy,

    /// Backup code verification attempts
    pub backup_code: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            // Most lenient: typos against an authenticator app are common
            totp: RateLimitPolicy::new(10, 900, 300),
            // Moderate: SMS has delivery cost and abuse potential
            sms: RateLimitPolicy::new(5, 900, 900),
            // Strictest: a backup code is a full bypass credential
            backup_code: RateLimitPolicy::new(3, 900, 3600),
        }
    }
}

impl RateLimitConfig {
    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            enabled: true,
            totp: RateLimitPolicy::new(100, 900, 60),
            sms: RateLimitPolicy::new(50, 900, 60),
            backup_code: RateLimitPolicy::new(30, 900, 60),
        }
    }

    /// Create a production configuration (default limits)
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orders_policies_by_strictness() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert!(config.backup_code.max_failures < config.sms.max_failures);
        assert!(config.sms.max_failures < config.totp.max_failures);
        assert!(config.backup_code.lockout_seconds >= config.sms.lockout_seconds);
    }

    #[test]
    fn test_development_is_more_lenient() {
        let dev = RateLimitConfig::development();
        let prod = RateLimitConfig::production();
        assert!(dev.totp.max_failures > prod.totp.max_failures);
        assert!(dev.backup_code.lockout_seconds < prod.backup_code.lockout_seconds);
    }
}
