//! Shared types used across the Palisade security library.
//!
//! This module defines common newtypes that provide type safety
//! and clear domain modeling.

use crate::error::PalisadeError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Newtype for session identifiers.
///
/// Session IDs are random UUIDs (v4) minted at login time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Create a new random `SessionId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a `SessionId` from its string form.
    ///
    /// # Errors
    /// Returns error if the input is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, PalisadeError> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| PalisadeError::Validation(format!("invalid session ID: {e}")))
    }

    /// Get the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for user identifiers.
///
/// User IDs are opaque strings assigned by the identity provider; they are
/// validated only for being non-empty. Deserialization routes through
/// [`UserId::new`], so a blank ID in a provider response is rejected at the
/// parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new `UserId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, PalisadeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PalisadeError::Validation(
                "user ID must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = PalisadeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
});

/// Newtype for login identifiers with email-shape validation.
///
/// Identifiers are checked before any remote call is made; a malformed
/// identifier never reaches the identity provider. The stored form is
/// trimmed and lowercased so rate limiting treats `User@Example.com` and
/// `user@example.com ` as the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    /// Returns error if the input is not email-shaped.
    pub fn parse(input: &str) -> Result<Self, PalisadeError> {
        let normalized = input.trim().to_lowercase();

        if EMAIL_REGEX.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(PalisadeError::Validation(
                "identifier must be a valid email address".to_string(),
            ))
        }
    }

    /// Get the normalized (trimmed, lowercased) address.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Provides serialization/deserialization and utility methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp `duration` from now, saturating at the maximum
    /// representable instant.
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        Self(
            Utc::now()
                .checked_add_signed(delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whether this timestamp lies in the past.
    #[must_use]
    pub fn is_past(&self) -> bool {
        self.0 <= Utc::now()
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, PalisadeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| PalisadeError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
