//! `SQLite`-backed key-value store.
//!
//! A single `kv` table accessed through an `SQLx` connection pool. Values
//! arrive already sealed by the caller, so the table itself is plaintext.

use crate::error::{Result, StorageError};
use crate::KeyValueStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Key-value store backed by a `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    /// Returns `StorageError` if the database cannot be opened or the
    /// schema cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            StorageError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StorageError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::Open(format!("failed to initialize pool: {e}")))?;

        Self::init_schema(&pool).await?;
        tracing::info!("Key-value store opened at {}", path_str);

        Ok(Self { pool })
    }

    /// Open an in-memory store.
    ///
    /// In-memory databases are per-connection, so the pool is capped at a
    /// single connection.
    pub async fn open_in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| StorageError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::Open(format!("failed to initialize pool: {e}")))?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Key-value store closed");
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r"
            SELECT value
            FROM kv
            WHERE key = ?
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query(
            r"
            DELETE FROM kv
            WHERE key = ?
            ",
        )
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
