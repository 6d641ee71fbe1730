//! Key-value storage capability the document store is built on.
//!
//! A backend only knows whole string values under string keys. It has no
//! notion of owners or records; `set` must replace the value in one step so
//! readers never observe a partial write.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Atomic replace failed: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Injected persistence capability. Carried by the store as `Arc<dyn StorageBackend>`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing was ever written under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key` atomically.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Short backend label for logs.
    fn name(&self) -> &'static str;
}

/// Process-local backend. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
