//! Palisade Authentication Layer
//!
//! Handles storefront authentication: login against an identity provider,
//! session lifecycle, rate limiting, inactivity timeout, and anti-forgery
//! tokens. Persisted session material goes through `palisade-vault`, so
//! nothing authentication-related is stored in the clear.
//!
//! # Components
//!
//! 1. **Session controller**: single entry point; owns all session state
//! 2. **Attempt limiter**: 5 failed logins → 15 minute lockout (configurable)
//! 3. **Activity tracker**: one debounced timer ends idle sessions
//! 4. **Anti-forgery tokens**: per-session, rotated on login, constant-time
//!    comparison
//!
//! # Session Management
//!
//! - Logout after configurable inactivity (default: 30 minutes)
//! - Periodic refresh re-validates and extends persisted records
//! - Provider bearer tokens zeroized from memory on logout
//!
//! # Security Model
//!
//! Tampered, expired, or missing persisted records never produce errors at
//! this layer; they read as an absent session and the user re-authenticates.
//! The rate limiter keys on the normalized login identifier, and rejected
//! attempts do not extend the lockout window.

pub mod activity;
pub mod controller;
pub mod csrf;
pub mod error;
pub mod limiter;
pub mod password;
pub mod provider;
pub mod session;

pub use activity::{ActivityTracker, SessionEvent};
pub use controller::{LoginOutcome, SessionController};
pub use csrf::AntiForgeryTokenManager;
pub use error::{AuthError, Result};
pub use limiter::LoginAttemptLimiter;
pub use password::{evaluate as evaluate_password, PasswordAssessment};
pub use provider::{
    HttpIdentityProvider, IdentityProvider, ProviderError, ProviderGrant, ProviderUser,
};
pub use session::{Session, SessionState};
