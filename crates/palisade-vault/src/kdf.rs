//! Key Derivation Function (KDF) using Argon2id.
//!
//! Derives the credential-encryption key from the injected master secret.
//!
//! # Security Parameters
//!
//! - Algorithm: Argon2id (hybrid mode)
//! - Memory cost: 19 MB (19,456 KB)
//! - Time cost: 2 iterations
//! - Parallelism: 1 thread
//! - Output: 32 bytes (256 bits)
//!
//! These parameters follow the OWASP baseline for server-side key
//! derivation. Derivation runs once per store open, not per request.

use crate::error::{Result, VaultError};
use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

/// Length of the derived key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// Length of the salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Argon2id memory cost in KB (19 MB).
const MEMORY_COST_KB: u32 = 19_456;

/// Argon2id time cost (iterations).
const TIME_COST: u32 = 2;

/// Argon2id parallelism (threads).
const PARALLELISM: u32 = 1;

/// Generate a random salt for key derivation.
///
/// Returns a cryptographically secure random 32-byte salt.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit encryption key from the master secret using Argon2id.
///
/// # Arguments
/// * `secret` - The injected master secret bytes
/// * `salt` - A 32-byte salt (generated once and persisted alongside records)
///
/// # Returns
/// A zeroizing wrapper around the derived 32-byte key.
///
/// # Errors
/// Returns `VaultError::KeyDerivation` if the derivation fails.
pub fn derive_key(secret: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    // Validate salt length
    if salt.len() != SALT_LENGTH {
        return Err(VaultError::KeyDerivation(format!(
            "invalid salt length: expected {SALT_LENGTH} bytes, got {}",
            salt.len()
        )));
    }

    // Build Argon2id parameters
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KB)
        .t_cost(TIME_COST)
        .p_cost(PARALLELISM)
        .output_len(KEY_LENGTH)
        .build()
        .map_err(|e| VaultError::KeyDerivation(format!("failed to build parameters: {e}")))?;

    // Create Argon2 instance
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    // Derive key
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    argon2
        .hash_password_into(secret, salt, key.as_mut())
        .map_err(|e| VaultError::KeyDerivation(format!("key derivation failed: {e}")))?;

    Ok(key)
}
