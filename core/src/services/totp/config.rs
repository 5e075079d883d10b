//! Configuration for the TOTP engine

/// Configuration for TOTP generation and verification
#[derive(Debug, Clone)]
pub struct TotpConfig {
    /// Issuer name (shown in authenticator apps)
    pub issuer: String,
    /// Number of digits in a code
    pub digits: usize,
    /// Time step in seconds
    pub step_seconds: u64,
    /// Accepted drift in steps on either side of now
    pub skew: u8,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            issuer: "SecondFactor".to_string(),
            digits: 6,
            step_seconds: 30,
            skew: 1,
        }
    }
}
