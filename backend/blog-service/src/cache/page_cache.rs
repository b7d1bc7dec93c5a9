use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, warn};

use super::PageCache;
use crate::error::{AppError, Result};

const KEY_PREFIX: &str = "blog:page:v1:";
const SCAN_BATCH: usize = 100;

/// Page cache stored in Redis under a common key prefix
#[derive(Clone)]
pub struct RedisPageCache {
    redis: ConnectionManager,
}

impl RedisPageCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Connect and build a connection manager for `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(manager))
    }

    fn cache_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

#[async_trait::async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        conn.get::<_, Option<String>>(Self::cache_key(key))
            .await
            .map_err(|e| {
                warn!("Redis read error for page cache: {}", e);
                AppError::Cache(e.to_string())
            })
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(Self::cache_key(key), body, ttl.as_secs().max(1))
            .await
            .map_err(|e| {
                warn!("Failed to write page cache: {}", e);
                AppError::Cache(e.to_string())
            })?;

        debug!("Page cache WRITE {} with TTL {:?}", key, ttl);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        let pattern = format!("{}*", KEY_PREFIX);
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                conn.del::<_, ()>(keys).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Page cache CLEAR removed {} keys", removed);
        Ok(())
    }
}
