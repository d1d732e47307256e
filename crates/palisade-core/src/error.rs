//! Core error types for the Palisade security library.
//!
//! This module defines the central error type used across all subsystems.
//! Each subsystem error is represented as a variant for clear error propagation.

use thiserror::Error;

/// Central error type for all Palisade operations.
///
/// Each variant represents an error from a specific subsystem, allowing
/// for clear error propagation and handling across crate boundaries.
#[derive(Error, Debug)]
pub enum PalisadeError {
    /// Configuration errors (file loading, parsing, missing secret)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential store errors (encryption, decryption, key derivation)
    #[error("credential store error: {0}")]
    Credentials(String),

    /// Persistence errors (key-value store access)
    #[error("storage error: {0}")]
    Storage(String),

    /// Authentication errors (login, session, rate limiting)
    #[error("auth error: {0}")]
    Auth(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found (may be first run)
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The master encryption secret was not provided.
    ///
    /// There is deliberately no default or fallback secret; construction
    /// of the credential store fails until one is injected.
    #[error("master secret is missing or empty (set it explicitly; there is no default)")]
    MissingSecret,
}

/// Result type alias using `PalisadeError`.
pub type Result<T> = std::result::Result<T, PalisadeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
