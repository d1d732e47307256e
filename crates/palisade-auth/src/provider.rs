//! Identity provider abstraction.
//!
//! The session controller talks to the account backend exclusively through
//! the [`IdentityProvider`] trait, so tests can swap in scripted providers
//! and deployments can point at different backends without touching session
//! logic. [`HttpIdentityProvider`] is the production implementation.

use async_trait::async_trait;
use palisade_core::types::{EmailAddress, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout applied to every provider request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by identity providers.
///
/// A required second factor is not an error; it is reported on the grant.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The backend rejected the presented credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend could not be reached or answered abnormally.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Account data returned alongside a successful authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    /// Stable account identifier.
    pub id: UserId,
    /// Permission strings granted to the account.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Outcome of a successful credential check.
#[derive(Debug, Clone)]
pub struct ProviderGrant {
    /// Opaque bearer token for subsequent backend calls.
    pub session_token: String,
    /// The authenticated account.
    pub user: ProviderUser,
    /// Whether the backend requires a second factor before the grant is
    /// usable. The controller treats such grants as incomplete logins.
    pub second_factor_required: bool,
}

/// Backend that can verify credentials and revoke issued tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `email`/`password` against the account backend.
    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<ProviderGrant, ProviderError>;

    /// Revoke a previously issued session token.
    ///
    /// Implementations treat an already-revoked token as success.
    async fn invalidate(&self, session_token: &str) -> Result<(), ProviderError>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    second_factor_required: bool,
    user: ProviderUser,
}

/// Identity provider backed by an HTTP account service.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    /// Create a provider targeting `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<ProviderGrant, ProviderError> {
        let url = format!("{}/auth/login", self.base_url);
        let request = LoginRequest {
            email: email.normalized(),
            password,
        };

        debug!("Submitting credential check to identity backend");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "login endpoint returned {status}"
            )));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("malformed login response: {e}")))?;

        Ok(ProviderGrant {
            session_token: body.token,
            user: body.user,
            second_factor_required: body.second_factor_required,
        })
    }

    async fn invalidate(&self, session_token: &str) -> Result<(), ProviderError> {
        let url = format!("{}/auth/logout", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        // An already-expired token is indistinguishable from a revoked one.
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            warn!(%status, "Remote logout returned an unexpected status");
            Err(ProviderError::Unavailable(format!(
                "logout endpoint returned {status}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serialization() {
        let request = LoginRequest {
            email: "shopper@example.com",
            password: "hunter2hunter2",
        };

        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(json["email"], "shopper@example.com");
        assert_eq!(json["password"], "hunter2hunter2");
    }

    #[test]
    fn test_login_response_deserialization() {
        let json = r#"{
            "token": "tok-123",
            "second_factor_required": false,
            "user": {
                "id": "user-42",
                "permissions": ["cart:write", "orders:read"]
            }
        }"#;

        let response: LoginResponse = serde_json::from_str(json).expect("deserialize response");
        assert_eq!(response.token, "tok-123");
        assert!(!response.second_factor_required);
        assert_eq!(response.user.id.as_str(), "user-42");
        assert_eq!(response.user.permissions.len(), 2);
    }

    #[test]
    fn test_login_response_defaults() {
        // Older backends omit the second-factor flag and permissions.
        let json = r#"{
            "token": "tok-456",
            "user": { "id": "user-7" }
        }"#;

        let response: LoginResponse = serde_json::from_str(json).expect("deserialize response");
        assert!(!response.second_factor_required);
        assert!(response.user.permissions.is_empty());
    }

    #[test]
    fn test_login_response_rejects_blank_user_id() {
        // A backend answering with an empty account ID is a malformed
        // response, not a usable grant.
        let json = r#"{
            "token": "tok-789",
            "user": { "id": "" }
        }"#;

        assert!(serde_json::from_str::<LoginResponse>(json).is_err());
    }

    #[test]
    fn test_provider_construction() {
        let provider =
            HttpIdentityProvider::new("https://accounts.example.com").expect("build provider");
        assert_eq!(provider.base_url, "https://accounts.example.com");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ProviderError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
        let unavailable = ProviderError::Unavailable("connection refused".to_string());
        assert!(unavailable.to_string().contains("connection refused"));
    }
}
