/// Public listing cache
///
/// This module provides:
/// - `PageCache`, a minimal key/value interface with per-entry TTL
/// - `RedisPageCache` for deployments with Redis
/// - `LocalPageCache`, an in-process fallback
///
/// Only the public post listing is cached. Its entries are rendered JSON
/// bodies keyed by resolved page number.
pub mod local_cache;
pub mod page_cache;

pub use local_cache::LocalPageCache;
pub use page_cache::RedisPageCache;

use std::time::Duration;

use crate::error::Result;

#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// Cached body for `key`, if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> Result<()>;

    /// Drop every cached page
    async fn clear(&self) -> Result<()>;
}

/// Cache key of a resolved public listing page
pub fn index_page_key(page: usize) -> String {
    format!("index:page:{}", page)
}

/// Page number a raw `?page=` asks for, used to look up the cache before
/// the listing size is known. Malformed or non-positive input asks for 1.
///
/// Only lookups use this; entries are written under the page the listing
/// actually resolved to, so out-of-range numbers never get their own entry.
pub fn requested_page(raw_page: Option<&str>) -> usize {
    raw_page
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}
