//! Backup code generation and one-time consumption

use chrono::Utc;
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::backup_code::BackupCode;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::backup_code::BackupCodeRepository;

use super::config::BackupCodeConfig;

/// Alphabet for backup codes, with ambiguous characters (0/O, 1/I/L)
/// removed so codes survive being read aloud or written down
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Vault managing the lifecycle of recovery codes
///
/// Plaintext codes exist only in the return value of `generate_batch`; from
/// then on the vault holds bcrypt hashes and can answer yes/no, never
/// reproduce a code.
pub struct BackupCodeVault<R: BackupCodeRepository> {
    repository: Arc<R>,
    config: BackupCodeConfig,
}

impl<R: BackupCodeRepository> BackupCodeVault<R> {
    /// Create a new vault
    pub fn new(repository: Arc<R>, config: BackupCodeConfig) -> Self {
        Self { repository, config }
    }

    /// Generate a fresh batch of codes, invalidating any prior batch
    ///
    /// Every code from earlier batches, used or unused, becomes
    /// unusable the moment the new batch is persisted. The returned
    /// plaintext codes are never retrievable again.
    pub async fn generate_batch(&self, user_id: Uuid) -> DomainResult<Vec<String>> {
        let batch_id = Uuid::new_v4();
        let mut plaintext_codes = Vec::with_capacity(self.config.batch_size);
        let mut entities = Vec::with_capacity(self.config.batch_size);

        for _ in 0..self.config.batch_size {
            let code = self.generate_code();
            let hash = bcrypt::hash(normalize_code(&code), self.config.bcrypt_cost)
                .map_err(|e| {
                    tracing::error!(error = %e, event = "backup_code_hash_failed", "bcrypt hashing failed");
                    DomainError::Internal {
                        message: "Failed to hash backup code".to_string(),
                    }
                })?;
            entities.push(BackupCode::new(user_id, batch_id, hash));
            plaintext_codes.push(code);
        }

        self.repository.replace_batch(user_id, entities).await?;

        tracing::info!(
            user_id = %user_id,
            batch_id = %batch_id,
            count = plaintext_codes.len(),
            event = "backup_codes_generated",
            "Generated new backup code batch"
        );

        Ok(plaintext_codes)
    }

    /// Verify a candidate code and consume it on match
    ///
    /// The consumption itself is a conditional repository update, so two
    /// concurrent submissions of the same code race for a single win.
    pub async fn verify_and_consume(&self, user_id: Uuid, candidate: &str) -> DomainResult<bool> {
        let normalized = normalize_code(candidate);
        if normalized.len() != self.config.code_length {
            return Ok(false);
        }

        let active = self.repository.active_codes(user_id).await?;
        for code in &active {
            let matches = bcrypt::verify(&normalized, &code.code_hash).map_err(|e| {
                tracing::error!(error = %e, event = "backup_code_verify_failed", "bcrypt verification failed");
                DomainError::Internal {
                    message: "Failed to verify backup code".to_string(),
                }
            })?;

            if matches {
                let consumed = self
                    .repository
                    .consume(user_id, code.id, Utc::now())
                    .await?;
                if consumed {
                    tracing::info!(
                        user_id = %user_id,
                        event = "backup_code_consumed",
                        "Backup code verified and consumed"
                    );
                }
                // A lost race means the code was spent concurrently;
                // report failure rather than re-admitting it
                return Ok(consumed);
            }
        }

        Ok(false)
    }

    /// Count the unused codes remaining in the active batch
    pub async fn remaining(&self, user_id: Uuid) -> DomainResult<u32> {
        self.repository.count_remaining(user_id).await
    }

    /// Remove every code for a user (2FA disable)
    pub async fn clear(&self, user_id: Uuid) -> DomainResult<()> {
        self.repository.clear(user_id).await
    }

    /// Generate one code, formatted in two groups for readability
    fn generate_code(&self) -> String {
        let mut rng = OsRng;
        let raw: String = (0..self.config.code_length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();

        let half = raw.len() / 2;
        format!("{}-{}", &raw[..half], &raw[half..])
    }
}

/// Normalize user input: uppercase, separators and whitespace stripped
fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
