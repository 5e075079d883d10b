//! TOTP secret issuance and time-window verification

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::errors::{DomainError, DomainResult};

use super::config::TotpConfig;

/// A freshly generated TOTP secret with its provisioning URI
///
/// The caller persists the secret as a pending enrollment; the engine keeps
/// no state of its own.
#[derive(Debug, Clone)]
pub struct GeneratedSecret {
    /// Base32-encoded secret (160 bits)
    pub secret: String,
    /// `otpauth://` provisioning URI for authenticator apps
    pub provisioning_uri: String,
}

/// Engine for TOTP generation and verification
pub struct TotpEngine {
    config: TotpConfig,
}

impl TotpEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self {
            config: TotpConfig::default(),
        }
    }

    /// Create a new engine with custom configuration
    pub fn with_config(config: TotpConfig) -> Self {
        Self { config }
    }

    /// Generate a new secret and provisioning URI for an account
    ///
    /// Pure generation; nothing is persisted here. The secret is
    /// cryptographically random and well above the 128-bit floor.
    pub fn generate_secret(&self, account_label: &str) -> DomainResult<GeneratedSecret> {
        let secret = Secret::generate_secret();
        let encoded = secret.to_encoded().to_string();

        let totp = self.build_totp(&encoded, account_label.to_string())?;

        Ok(GeneratedSecret {
            secret: encoded,
            provisioning_uri: totp.get_url(),
        })
    }

    /// Verify a candidate code, returning the matched time step
    ///
    /// Computes the expected code for the current step and the adjacent
    /// steps within the configured skew, comparing each in constant time.
    /// Wrong-length or non-numeric input is rejected before any computation.
    ///
    /// # Returns
    /// * `Ok(Some(step))` - Code matched at the returned time step
    /// * `Ok(None)` - No match within the window
    /// * `Err(DomainError)` - Malformed stored secret (corrupt storage);
    ///   deliberately not reported as an invalid code
    pub fn verify_with_step(
        &self,
        secret_base32: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<i64>> {
        if candidate.len() != self.config.digits
            || !candidate.chars().all(|c| c.is_ascii_digit())
        {
            return Ok(None);
        }

        let totp = self.build_totp(secret_base32, String::new())?;

        let timestamp = now.timestamp();
        if timestamp < 0 {
            return Ok(None);
        }

        let step_seconds = self.config.step_seconds as i64;
        let current_step = timestamp / step_seconds;
        let skew = self.config.skew as i64;

        for delta in -skew..=skew {
            let step = current_step + delta;
            if step < 0 {
                continue;
            }
            let expected = totp.generate(step as u64 * self.config.step_seconds);
            if constant_time_eq(expected.as_bytes(), candidate.as_bytes()) {
                return Ok(Some(step));
            }
        }

        Ok(None)
    }

    /// Verify a candidate code against a secret
    pub fn verify(
        &self,
        secret_base32: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        Ok(self.verify_with_step(secret_base32, candidate, now)?.is_some())
    }

    /// Generate the code for a secret at a point in time
    ///
    /// Support for enrollment tests and operator tooling.
    pub fn code_at(&self, secret_base32: &str, at: DateTime<Utc>) -> DomainResult<String> {
        let totp = self.build_totp(secret_base32, String::new())?;
        Ok(totp.generate(at.timestamp().max(0) as u64))
    }

    /// Build a TOTP instance for a stored secret
    ///
    /// A secret that fails to parse means corrupt storage, surfaced as an
    /// internal error.
    fn build_totp(&self, secret_base32: &str, account_label: String) -> DomainResult<TOTP> {
        let secret_bytes = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .map_err(|e| {
                tracing::error!(error = %e, event = "totp_secret_malformed", "Stored TOTP secret failed to decode");
                DomainError::Internal {
                    message: "Malformed TOTP secret".to_string(),
                }
            })?;

        TOTP::new(
            Algorithm::SHA1,
            self.config.digits,
            self.config.skew,
            self.config.step_seconds,
            secret_bytes,
            Some(self.config.issuer.clone()),
            account_label,
        )
        .map_err(|e| {
            tracing::error!(error = %e, event = "totp_engine_error", "Failed to construct TOTP instance");
            DomainError::Internal {
                message: "Malformed TOTP secret".to_string(),
            }
        })
    }
}

impl Default for TotpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap()
    }

    // Arbitrary fixed instant, mid-step
    const NOW: i64 = 1_700_000_015;

    #[test]
    fn test_generate_secret_format() {
        let engine = TotpEngine::new();
        let generated = engine.generate_secret("user@example.com").unwrap();

        // Base32 secret, long enough for 160 bits
        assert!(generated.secret.len() >= 26);
        assert!(generated
            .secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '='));
        assert!(generated.provisioning_uri.starts_with("otpauth://totp/"));
        assert!(generated.provisioning_uri.contains("SecondFactor"));
    }

    #[test]
    fn test_secrets_are_unique() {
        let engine = TotpEngine::new();
        let a = engine.generate_secret("a@example.com").unwrap();
        let b = engine.generate_secret("b@example.com").unwrap();
        assert_ne!(a.secret, b.secret);
    }

    #[test]
    fn test_verify_current_step() {
        let engine = TotpEngine::new();
        let secret = engine.generate_secret("user@example.com").unwrap().secret;

        let code = engine.code_at(&secret, at(NOW)).unwrap();
        assert!(engine.verify(&secret, &code, at(NOW)).unwrap());
    }

    #[test]
    fn test_verify_tolerates_one_step_of_drift() {
        let engine = TotpEngine::new();
        let secret = engine.generate_secret("user@example.com").unwrap().secret;

        let previous = engine.code_at(&secret, at(NOW - 30)).unwrap();
        let next = engine.code_at(&secret, at(NOW + 30)).unwrap();

        assert!(engine.verify(&secret, &previous, at(NOW)).unwrap());
        assert!(engine.verify(&secret, &next, at(NOW)).unwrap());
    }

    #[test]
    fn test_verify_rejects_two_steps_of_drift() {
        let engine = TotpEngine::new();
        let secret = engine.generate_secret("user@example.com").unwrap().secret;

        let stale = engine.code_at(&secret, at(NOW - 60)).unwrap();
        let future = engine.code_at(&secret, at(NOW + 60)).unwrap();

        // Codes two steps out verify at their own time but not at NOW
        assert!(engine.verify(&secret, &stale, at(NOW - 60)).unwrap());
        assert!(engine.verify(&secret, &future, at(NOW + 60)).unwrap());
        assert!(!engine.verify(&secret, &stale, at(NOW)).unwrap());
        assert!(!engine.verify(&secret, &future, at(NOW)).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_input_without_computation() {
        let engine = TotpEngine::new();
        let secret = engine.generate_secret("user@example.com").unwrap().secret;

        assert!(!engine.verify(&secret, "12345", at(NOW)).unwrap()); // Too short
        assert!(!engine.verify(&secret, "1234567", at(NOW)).unwrap()); // Too long
        assert!(!engine.verify(&secret, "12345a", at(NOW)).unwrap()); // Non-numeric
        assert!(!engine.verify(&secret, "", at(NOW)).unwrap());
    }

    #[test]
    fn test_malformed_secret_is_internal_error_not_invalid_code() {
        let engine = TotpEngine::new();

        let result = engine.verify("not base32 at all!!!", "123456", at(NOW));
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[test]
    fn test_matched_step_is_reported() {
        let engine = TotpEngine::new();
        let secret = engine.generate_secret("user@example.com").unwrap().secret;

        let code = engine.code_at(&secret, at(NOW)).unwrap();
        let step = engine
            .verify_with_step(&secret, &code, at(NOW))
            .unwrap()
            .unwrap();
        assert_eq!(step, NOW / 30);
    }
}
