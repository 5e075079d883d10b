//! TOTP secret encryption using AES-256-GCM

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::errors::{DomainError, DomainResult};

/// Size of the AES-256 key in bytes
const KEY_SIZE: usize = 32;

/// Size of the GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Cipher for TOTP secrets at rest
///
/// Secrets are stored as `base64(nonce || ciphertext)` with a fresh random
/// nonce per encryption. Decryption failures indicate corrupt storage or a
/// wrong key and surface as internal errors, never as an invalid-code
/// rejection, which would leak state to an attacker.
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Create a cipher from a raw 32-byte key
    pub fn new(key_bytes: &[u8; KEY_SIZE]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Create a cipher from a base64-encoded 32-byte key
    pub fn from_base64(encoded_key: &str) -> DomainResult<Self> {
        let bytes = BASE64.decode(encoded_key).map_err(|_| DomainError::Internal {
            message: "Encryption key is not valid base64".to_string(),
        })?;

        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| DomainError::Internal {
            message: format!("Encryption key must be {} bytes", KEY_SIZE),
        })?;

        Ok(Self::new(&key))
    }

    /// Encrypt a plaintext secret
    pub fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| DomainError::Internal {
                message: "Secret encryption failed".to_string(),
            })?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(payload))
    }

    /// Decrypt an encrypted secret
    pub fn decrypt(&self, encoded: &str) -> DomainResult<String> {
        let payload = BASE64.decode(encoded).map_err(|_| DomainError::Internal {
            message: "Stored secret is not valid base64".to_string(),
        })?;

        if payload.len() <= NONCE_SIZE {
            return Err(DomainError::Internal {
                message: "Stored secret is truncated".to_string(),
            });
        }

        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| DomainError::Internal {
                message: "Secret decryption failed".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|_| DomainError::Internal {
            message: "Decrypted secret is not valid UTF-8".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> SecretCipher {
        SecretCipher::new(&[7u8; KEY_SIZE])
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = test_cipher();
        let secret = "JBSWY3DPEHPK3PXP";

        let encrypted = cipher.encrypt(secret).unwrap();
        assert_ne!(encrypted, secret);

        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, secret);
    }

    #[test]
    fn test_encryption_uses_fresh_nonces() {
        let cipher = test_cipher();
        let a = cipher.encrypt("JBSWY3DPEHPK3PXP").unwrap();
        let b = cipher.encrypt("JBSWY3DPEHPK3PXP").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("JBSWY3DPEHPK3PXP").unwrap();

        let mut bytes = BASE64.decode(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = BASE64.encode(bytes);

        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let encrypted = test_cipher().encrypt("JBSWY3DPEHPK3PXP").unwrap();
        let other = SecretCipher::new(&[8u8; KEY_SIZE]);
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_from_base64_rejects_wrong_key_size() {
        let short_key = BASE64.encode([1u8; 16]);
        assert!(SecretCipher::from_base64(&short_key).is_err());
        assert!(SecretCipher::from_base64("not-base64!!!").is_err());
    }
}
