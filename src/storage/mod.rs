/// Key-Value Storage System
///
/// Persists identity handles and credential records as string values.
/// Supports multiple backend implementations (file, memory, SQLite, Redis).

pub mod file;
pub mod memory;
pub mod redis;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use sqlite::SqliteStore;

use crate::{config::StoreConfig, error::CredsResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Key-value storage backend trait
///
/// Values are opaque strings; callers handle any encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> CredsResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> CredsResult<()>;
}

/// Open the backend selected by configuration
pub async fn open_store(config: &StoreConfig) -> CredsResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config {
        StoreConfig::File { path } => Arc::new(FileStore::new(path.clone())),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path).await?),
        StoreConfig::Redis { url, key_prefix } => {
            Arc::new(RedisStore::connect(url, key_prefix.clone()).await?)
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::File {
            path: dir.path().join("creds.json"),
        };

        let store = open_store(&config).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_open_sqlite_store() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::Sqlite {
            path: dir.path().join("creds.sqlite"),
        };

        let store = open_store(&config).await.unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(&StoreConfig::Memory).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
