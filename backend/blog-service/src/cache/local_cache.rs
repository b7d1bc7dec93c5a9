use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::PageCache;
use crate::error::Result;

/// In-process page cache with per-entry expiry
#[derive(Default)]
pub struct LocalPageCache {
    entries: DashMap<String, (String, Instant)>,
}

impl LocalPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl PageCache for LocalPageCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1 > Instant::now() => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };

        // The shard guard is released above; removing while holding it deadlocks
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), (body.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_entries() {
        let cache = LocalPageCache::new();
        cache.set("k", "body", Duration::from_secs(20)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("body"));
        assert!(cache.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let cache = LocalPageCache::new();
        cache.set("k", "body", Duration::ZERO).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let cache = LocalPageCache::new();
        cache.set("a", "1", Duration::from_secs(20)).await.unwrap();
        cache.set("b", "2", Duration::from_secs(20)).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.len(), 0);
    }
}
