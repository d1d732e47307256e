//! Error types for the credential store.

use thiserror::Error;

/// Errors that can occur during credential store operations.
///
/// Decryption and expiry faults do not appear on the read path's error
/// surface: [`crate::CredentialStore::get`] converts them into an absent
/// record. `Decryption` only crosses crate boundaries in internal plumbing
/// and tests.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Failed to derive key from the master secret.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption operation failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption operation failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Invalid record format or corrupted data.
    #[error("invalid record data: {0}")]
    InvalidData(String),

    /// Underlying storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] palisade_storage::StorageError),
}

/// Result type for credential store operations.
pub type Result<T> = std::result::Result<T, VaultError>;
