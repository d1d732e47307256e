//! Palisade Vault - Encrypted Credential Storage
//!
//! Stores short-lived credentials (session tokens, session identifiers,
//! anti-forgery tokens) sealed with ChaCha20-Poly1305 under a key derived
//! from the injected master secret via Argon2id.
//!
//! # Security Model
//!
//! - Master secret → Argon2id (19 MB memory) → 256-bit key
//! - ChaCha20-Poly1305 AEAD for every stored value
//! - Each record carries its own nonce and expiry
//! - A record that is missing, expired, or fails authentication reads as
//!   absent; the read path never reports a cryptographic fault to callers
//! - Unreadable records are removed on sight so they cannot be replayed
//! - Plaintext values are never logged
//!
//! # Example
//!
//! ```ignore
//! use palisade_vault::CredentialStore;
//!
//! let store = CredentialStore::open(&secret, backend).await?;
//! store.put("auth_token", "tok-123", Duration::from_secs(3600)).await?;
//!
//! // Some(..) while fresh and untampered, None afterwards
//! let token = store.get("auth_token").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cipher;
pub mod error;
pub mod kdf;

pub use cipher::SealedRecord;
pub use error::{Result, VaultError};

use palisade_core::config::MasterSecret;
use palisade_storage::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

/// Backend key under which the KDF salt is persisted.
///
/// Reserved: callers must not use this key for records.
const SALT_KEY: &str = "__credential_store_salt__";

/// Encrypted credential storage over a [`KeyValueStore`] backend.
///
/// The encryption key is derived once at open and zeroized on drop.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    key: Zeroizing<[u8; kdf::KEY_LENGTH]>,
}

impl CredentialStore {
    /// Open the store, deriving the encryption key from `secret`.
    ///
    /// The KDF salt is loaded from the backend, or generated and persisted
    /// on first open. A salt that fails to decode is replaced with a fresh
    /// one; records sealed under the old salt then read as absent.
    ///
    /// # Errors
    /// Returns error if the backend is unreachable or key derivation fails.
    pub async fn open(secret: &MasterSecret, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let salt = Self::load_or_create_salt(store.as_ref()).await?;
        let key = kdf::derive_key(secret.expose(), &salt)?;

        tracing::info!("Credential store opened");
        Ok(Self { store, key })
    }

    async fn load_or_create_salt(
        store: &dyn KeyValueStore,
    ) -> Result<[u8; kdf::SALT_LENGTH]> {
        if let Some(encoded) = store.get(SALT_KEY).await? {
            match hex::decode(&encoded) {
                Ok(bytes) if bytes.len() == kdf::SALT_LENGTH => {
                    let mut salt = [0u8; kdf::SALT_LENGTH];
                    salt.copy_from_slice(&bytes);
                    return Ok(salt);
                }
                _ => {
                    tracing::warn!(
                        "Stored KDF salt is unreadable, regenerating; existing records are now invalid"
                    );
                }
            }
        }

        let salt = kdf::generate_salt();
        store.set(SALT_KEY, &hex::encode(salt)).await?;
        tracing::debug!("Generated new KDF salt");
        Ok(salt)
    }

    /// Seal `value` under `record_key`, valid for `ttl` from now.
    ///
    /// Replaces any previous record under the same key.
    ///
    /// # Errors
    /// Returns error if encryption fails or the backend is unreachable.
    pub async fn put(&self, record_key: &str, value: &str, ttl: Duration) -> Result<()> {
        let record = SealedRecord::seal(value, &self.key, ttl)?;
        let encoded = serde_json::to_string(&record)
            .map_err(|e| VaultError::InvalidData(format!("record serialization failed: {e}")))?;

        self.store.set(record_key, &encoded).await?;
        tracing::debug!("Sealed record stored under '{record_key}'");
        Ok(())
    }

    /// Fetch and open the record under `record_key`.
    ///
    /// Returns `Ok(None)` when the record is missing, expired, tampered
    /// with, sealed under a different key, or otherwise unreadable. Any
    /// such record is removed from the backend before returning. The only
    /// error this method surfaces is a backend read failure.
    pub async fn get(&self, record_key: &str) -> Result<Option<String>> {
        let Some(encoded) = self.store.get(record_key).await? else {
            return Ok(None);
        };

        let record: SealedRecord = match serde_json::from_str(&encoded) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Record under '{record_key}' is malformed, discarding: {e}");
                self.discard(record_key).await;
                return Ok(None);
            }
        };

        if record.is_expired() {
            tracing::debug!("Record under '{record_key}' expired, discarding");
            self.discard(record_key).await;
            return Ok(None);
        }

        match record.open(&self.key) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    "Record under '{record_key}' failed integrity check, discarding: {e}"
                );
                self.discard(record_key).await;
                Ok(None)
            }
        }
    }

    /// Remove the record under `record_key`.
    ///
    /// Removing an absent record is not an error.
    pub async fn remove(&self, record_key: &str) -> Result<()> {
        self.store.remove(record_key).await?;
        Ok(())
    }

    // Best-effort removal on the read path; a failure here must not turn a
    // degraded read into an error.
    async fn discard(&self, record_key: &str) {
        if let Err(e) = self.store.remove(record_key).await {
            tracing::warn!("Failed to discard record under '{record_key}': {e}");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
