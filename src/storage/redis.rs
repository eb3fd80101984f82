/// Redis-backed key-value store
///
/// Lets several hosts share one identity per pool, e.g. a fleet of
/// workers that should present as a single anonymous user.
use crate::{error::CredsResult, storage::KeyValueStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info, warn};

/// Redis storage backend
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connect to Redis at `url`; every key is stored under `key_prefix`
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> CredsResult<Self> {
        info!("Connecting to Redis at {}", url);

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            key_prefix: key_prefix.into(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        prefixed_key(&self.key_prefix, key)
    }
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CredsResult<Option<String>> {
        let redis_key = self.build_key(key);
        debug!("Redis GET: {}", redis_key);

        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(&redis_key).await.map_err(|e| {
            warn!("Redis GET failed for {}: {}", redis_key, e);
            e
        })?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CredsResult<()> {
        let redis_key = self.build_key(key);
        debug!("Redis SET: {}", redis_key);

        // No expiry: identity handles are kept indefinitely and credential
        // records are validated by their own expiration on read
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(&redis_key, value).await.map_err(|e| {
            warn!("Redis SET failed for {}: {}", redis_key, e);
            e
        })?;

        Ok(())
    }
}
