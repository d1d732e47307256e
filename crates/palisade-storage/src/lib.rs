//! Palisade Persistence Layer
//!
//! Provides the key-value storage abstraction used by the credential store,
//! with `SQLite` and in-memory backends.
//!
//! # Architecture
//!
//! - **Abstraction**: Consumers depend on the [`KeyValueStore`] trait, never
//!   on a concrete backend
//! - **SQLite backend**: A single `kv` table accessed through `SQLx` with
//!   connection pooling
//! - **In-memory backend**: A `HashMap` behind an async lock, used in tests
//!   and ephemeral deployments
//!
//! # Example
//!
//! ```ignore
//! use palisade_storage::{KeyValueStore, SqliteStore};
//!
//! let store = SqliteStore::open("palisade.db").await?;
//! store.set("greeting", "hello").await?;
//! let value = store.get("greeting").await?;
//! ```
//!
//! # Design Principles
//!
//! - Values are opaque strings; encryption happens at the application layer
//!   (palisade-vault), not here
//! - A missing key is `Ok(None)`, never an error
//! - `remove` is idempotent: removing an absent key succeeds
//! - The backing store may be cleared externally at any time; callers must
//!   treat every read as potentially absent

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod memory;
pub mod sqlite;

// Re-export commonly used types
pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// Abstraction over key-value persistence.
///
/// Implementations must be safe to share across tasks. All values are
/// opaque strings; interpretation (and encryption) is the caller's concern.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`.
    ///
    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
