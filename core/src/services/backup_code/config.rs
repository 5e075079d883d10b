//! Configuration for the backup code vault

/// Configuration for backup code generation
#[derive(Debug, Clone)]
pub struct BackupCodeConfig {
    /// Number of codes per batch
    pub batch_size: usize,
    /// Length of a code, excluding the display separator
    pub code_length: usize,
    /// bcrypt cost factor; lower it in tests only
    pub bcrypt_cost: u32,
}

impl Default for BackupCodeConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            code_length: 10,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BackupCodeConfig {
    /// Configuration with minimum hashing cost, for fast tests
    pub fn fast_for_tests() -> Self {
        Self {
            bcrypt_cost: 4,
            ..Default::default()
        }
    }
}
