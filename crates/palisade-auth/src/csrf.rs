//! Anti-forgery (CSRF) token management.
//!
//! Tokens are random 256-bit values persisted through the credential store
//! under a caller-chosen record key, so a token issued against one record
//! key can never validate against another. Comparison is constant-time.

use crate::error::Result;
use palisade_vault::CredentialStore;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Number of random bytes in a token (hex-encoded for transport).
const TOKEN_BYTES: usize = 32;

/// Issues and validates per-session anti-forgery tokens.
#[derive(Debug)]
pub struct AntiForgeryTokenManager {
    credentials: Arc<CredentialStore>,
    record_key: String,
    ttl: Duration,
}

impl AntiForgeryTokenManager {
    /// Create a manager persisting its token under `record_key`.
    #[must_use]
    pub fn new(
        credentials: Arc<CredentialStore>,
        record_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            record_key: record_key.into(),
            ttl,
        }
    }

    /// Return the stored token, minting and persisting a fresh one if the
    /// stored token is missing or expired.
    pub async fn get_or_create(&self) -> Result<String> {
        if let Some(token) = self.credentials.get(&self.record_key).await? {
            return Ok(token);
        }

        let token = generate_token();
        self.credentials
            .put(&self.record_key, &token, self.ttl)
            .await?;
        debug!("Minted new anti-forgery token");
        Ok(token)
    }

    /// Whether `candidate` matches the stored token.
    ///
    /// Always false when no token is stored. The comparison does not
    /// short-circuit on content.
    pub async fn validate(&self, candidate: &str) -> Result<bool> {
        match self.credentials.get(&self.record_key).await? {
            Some(expected) => Ok(expected.as_bytes().ct_eq(candidate.as_bytes()).into()),
            None => Ok(false),
        }
    }

    /// Discard the stored token and mint a fresh one.
    pub async fn rotate(&self) -> Result<String> {
        self.credentials.remove(&self.record_key).await?;
        self.get_or_create().await
    }

    /// Discard the stored token without replacement (called on logout).
    pub async fn discard(&self) -> Result<()> {
        self.credentials.remove(&self.record_key).await?;
        Ok(())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
