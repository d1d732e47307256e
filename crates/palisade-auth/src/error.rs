//! Error types for the authentication layer.

use std::time::Duration;
use thiserror::Error;

/// Authentication errors.
///
/// These are the typed results callers render UI from. Integrity faults on
/// persisted records never appear here; the credential store degrades them
/// to an absent record and the session falls back to re-authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Too many failed attempts, locked out.
    #[error("too many failed attempts, locked for {0:?}")]
    RateLimited(Duration),

    /// Identity provider rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Input rejected locally before any remote call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    RemoteUnavailable(String),

    /// Operation requires an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Credential storage failed at the I/O level.
    #[error("storage error: {0}")]
    Storage(#[from] palisade_vault::VaultError),
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid credentials");

        let err = AuthError::Validation("identifier must be a valid email address".to_string());
        assert!(err.to_string().contains("valid email address"));
    }

    #[test]
    fn test_rate_limited_carries_remaining_time() {
        let err = AuthError::RateLimited(Duration::from_secs(540));
        assert!(err.to_string().contains("540"));
    }

    #[test]
    fn test_vault_error_conversion() {
        let vault_err = palisade_vault::VaultError::Encryption("boom".to_string());
        let err: AuthError = vault_err.into();
        assert!(matches!(err, AuthError::Storage(_)));
    }
}
