//! Palisade Core - Foundation crate for the Palisade storefront security library.
//!
//! This crate provides shared types, error handling, and configuration
//! management that all other Palisade crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths, plus the required
//!   master secret
//! - [`types`] - Shared newtypes (`SessionId`, `UserId`, `EmailAddress`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use palisade_core::{EmailAddress, MasterSecret, SecurityConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (defaults when no file exists)
//! let config = SecurityConfig::default();
//! assert_eq!(config.login.max_attempts, 5);
//!
//! // The encryption secret is always injected, never defaulted
//! let secret = MasterSecret::new("storefront-deploy-secret")?;
//!
//! let email = EmailAddress::parse("shopper@example.com")?;
//! assert_eq!(email.normalized(), "shopper@example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{LoginConfig, MasterSecret, SecurityConfig, SessionConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, PalisadeError, Result};
pub use types::{EmailAddress, SessionId, Timestamp, UserId};
