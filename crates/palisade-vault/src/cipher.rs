//! Record sealing using ChaCha20-Poly1305 AEAD.
//!
//! A [`SealedRecord`] couples a ciphertext with its nonce and an expiry
//! timestamp. The expiry travels with the record so a credential outlives
//! neither its window nor its integrity: opening checks the Poly1305 tag,
//! and expiry is checked by the store before opening is attempted.
//!
//! # Security Properties
//!
//! - **Confidentiality**: `ChaCha20` stream cipher
//! - **Authenticity**: `Poly1305` MAC
//! - **Nonce**: 96-bit random nonce per sealing
//! - **Key**: 256-bit derived from the master secret

use crate::error::{Result, VaultError};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    ChaCha20Poly1305, Nonce,
};
use palisade_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Length of the nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_LENGTH: usize = 12;

/// An encrypted credential value with its nonce and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedRecord {
    /// Random nonce used for this sealing
    nonce: [u8; NONCE_LENGTH],
    /// Ciphertext + authentication tag (16 bytes)
    ciphertext: Vec<u8>,
    /// Wall-clock instant after which the record is dead
    expires_at: Timestamp,
}

impl SealedRecord {
    /// Seal a plaintext value, valid for `ttl` from now.
    ///
    /// # Errors
    /// Returns `VaultError::Encryption` if encryption fails.
    pub fn seal(plaintext: &str, key: &[u8; 32], ttl: Duration) -> Result<Self> {
        // Generate random nonce
        let nonce_bytes = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let nonce_array: [u8; NONCE_LENGTH] = nonce_bytes
            .as_slice()
            .try_into()
            .expect("nonce has correct length");

        // Create cipher
        let cipher = ChaCha20Poly1305::new(key.into());

        // Encrypt
        let ciphertext = cipher
            .encrypt(&nonce_bytes, plaintext.as_bytes())
            .map_err(|e| VaultError::Encryption(format!("encryption failed: {e}")))?;

        Ok(Self {
            nonce: nonce_array,
            ciphertext,
            expires_at: Timestamp::after(ttl),
        })
    }

    /// Open the record, returning the plaintext value.
    ///
    /// # Errors
    /// Returns `VaultError::Decryption` if:
    /// - The key is incorrect
    /// - The ciphertext or nonce has been tampered with
    /// - The plaintext is not valid UTF-8
    pub fn open(&self, key: &[u8; 32]) -> Result<String> {
        // Create cipher
        let cipher = ChaCha20Poly1305::new(key.into());

        // Decrypt
        let nonce = Nonce::from_slice(&self.nonce);
        let plaintext = cipher
            .decrypt(nonce, self.ciphertext.as_ref())
            .map_err(|e| VaultError::Decryption(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| VaultError::Decryption(format!("plaintext is not valid UTF-8: {e}")))
    }

    /// Whether the record's validity window has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_past()
    }

    /// The instant after which the record is dead.
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Get the nonce as a byte slice.
    #[must_use]
    pub fn nonce(&self) -> &[u8; NONCE_LENGTH] {
        &self.nonce
    }

    /// Get the ciphertext as a byte slice.
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        [0x42; 32] // Fixed key for testing
    }

    const TTL: Duration = Duration::from_secs(3600);

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key();
        let original = "session-token-abc123";

        let sealed = SealedRecord::seal(original, &key, TTL).expect("seal");
        let opened = sealed.open(&key).expect("open");

        assert_eq!(opened, original);
    }

    #[test]
    fn test_different_nonces() {
        let key = test_key();
        let value = "token";

        let sealed1 = SealedRecord::seal(value, &key, TTL).expect("seal 1");
        let sealed2 = SealedRecord::seal(value, &key, TTL).expect("seal 2");

        // Same plaintext should produce different ciphertexts due to different nonces
        assert_ne!(sealed1.nonce(), sealed2.nonce());
        assert_ne!(sealed1.ciphertext(), sealed2.ciphertext());

        // Both should open correctly
        assert_eq!(sealed1.open(&key).expect("open 1"), value);
        assert_eq!(sealed2.open(&key).expect("open 2"), value);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = [0x42; 32];
        let key2 = [0x43; 32];

        let sealed = SealedRecord::seal("secret", &key1, TTL).expect("seal");
        let result = sealed.open(&key2);

        assert!(result.is_err());
        match result {
            Err(VaultError::Decryption(_)) => {}
            _ => panic!("expected Decryption error"),
        }
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key();

        let mut sealed = SealedRecord::seal("secret", &key, TTL).expect("seal");

        // Tamper with the ciphertext
        if let Some(byte) = sealed.ciphertext.first_mut() {
            *byte ^= 0xFF;
        }

        let result = sealed.open(&key);

        assert!(result.is_err());
        match result {
            Err(VaultError::Decryption(_)) => {}
            _ => panic!("expected Decryption error"),
        }
    }

    #[test]
    fn test_tampered_nonce_fails() {
        let key = test_key();

        let mut sealed = SealedRecord::seal("secret", &key, TTL).expect("seal");

        // Tamper with the nonce
        sealed.nonce[0] ^= 0xFF;

        let result = sealed.open(&key);

        assert!(result.is_err());
        match result {
            Err(VaultError::Decryption(_)) => {}
            _ => panic!("expected Decryption error"),
        }
    }

    #[test]
    fn test_expiry() {
        let key = test_key();

        let fresh = SealedRecord::seal("token", &key, TTL).expect("seal");
        assert!(!fresh.is_expired());

        let dead = SealedRecord::seal("token", &key, Duration::ZERO).expect("seal");
        std::thread::sleep(Duration::from_millis(5));
        assert!(dead.is_expired());

        // Expiry does not damage the ciphertext itself
        assert_eq!(dead.open(&key).expect("open"), "token");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let key = test_key();
        let value = "session-token-abc123";

        let sealed = SealedRecord::seal(value, &key, TTL).expect("seal");

        // Serialize to JSON
        let json = serde_json::to_string(&sealed).expect("serialize");

        // Deserialize from JSON
        let deserialized: SealedRecord = serde_json::from_str(&json).expect("deserialize");

        // Should still open correctly
        let opened = deserialized.open(&key).expect("open");
        assert_eq!(opened, value);
    }

    #[test]
    fn test_empty_string() {
        let key = test_key();

        let sealed = SealedRecord::seal("", &key, TTL).expect("seal");
        assert_eq!(sealed.open(&key).expect("open"), "");
    }

    #[test]
    fn test_unicode() {
        let key = test_key();
        let value = "Hello 世界 🌍";

        let sealed = SealedRecord::seal(value, &key, TTL).expect("seal");
        assert_eq!(sealed.open(&key).expect("open"), value);
    }
}
