//! Session data model and controller states.

use palisade_core::types::{SessionId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An authenticated storefront session.
///
/// Owned exclusively by the session controller; mutated only through
/// login, logout, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Locally minted session identifier.
    pub session_id: SessionId,
    /// The authenticated user, as reported by the identity provider.
    pub user_id: UserId,
    /// When the session was established.
    pub issued_at: Timestamp,
    /// When the session stops being valid regardless of activity.
    pub expires_at: Timestamp,
    /// Permission names granted to this session.
    pub permissions: HashSet<String>,
}

impl Session {
    /// Whether the session's lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_past()
    }

    /// Whether the session carries the named permission.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Externally observable controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No session; login is permitted.
    Anonymous,
    /// A login call is in flight against the identity provider.
    Authenticating,
    /// A session is established and authoritative.
    Authenticated,
    /// The last login was rejected by the attempt limiter; login is
    /// permitted again once the lockout window elapses.
    LockedOut,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::LockedOut => "locked_out",
        };
        write!(f, "{name}")
    }
}
