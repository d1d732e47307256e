//! In-memory key-value store.
//!
//! Backs tests and ephemeral deployments. Also the reference model for how
//! a backend behaves when an operator wipes it out from under the library:
//! [`MemoryStore::clear`] drops everything, and consumers must keep working.

use crate::error::Result;
use crate::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A `HashMap`-backed store behind an async lock.
///
/// Cloning is cheap and all clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, simulating external clearing of the backend.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("alpha", "1").await.expect("set value");

        let value = store.get("alpha").await.expect("get value");
        assert_eq!(value, Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        let value = store.get("missing").await.expect("get value");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("alpha", "1").await.expect("set value");
        store.set("alpha", "2").await.expect("set value");

        let value = store.get("alpha").await.expect("get value");
        assert_eq!(value, Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = MemoryStore::new();
        store.set("alpha", "1").await.expect("set value");

        store.remove("alpha").await.expect("remove value");
        store.remove("alpha").await.expect("remove absent value");

        assert_eq!(store.get("alpha").await.expect("get value"), None);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let store = MemoryStore::new();
        store.set("alpha", "1").await.expect("set value");
        store.set("beta", "2").await.expect("set value");
        assert_eq!(store.len().await, 2);

        store.clear().await;

        assert!(store.is_empty().await);
        assert_eq!(store.get("alpha").await.expect("get value"), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.set("alpha", "1").await.expect("set value");

        let value = clone.get("alpha").await.expect("get value");
        assert_eq!(value, Some("1".to_string()));
    }
}
