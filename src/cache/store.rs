//! Cache storage backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::time::Instant;

use crate::types::Content;
use crate::{GatewayError, Result};

/// Default maximum number of entries held by [`MemoryCacheStore`].
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Outcome of a cache read.
#[derive(Debug)]
pub enum CacheLookup {
    Found(Content),
    NotFound,
    /// The store could not answer. Callers treat this as a miss.
    Error(GatewayError),
}

/// Key/value store with per-entry expiry.
///
/// An entry read after its TTL has elapsed must be reported as
/// [`CacheLookup::NotFound`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> CacheLookup;

    async fn put(&self, key: &str, value: Content, ttl: Duration) -> Result<()>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;

    /// Whether the store is currently usable.
    fn is_connected(&self) -> bool {
        true
    }

    /// Release the underlying connection. Later calls may fail.
    async fn close(&self) {}
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Content,
    expires_at: Instant,
}

/// In-memory store backed by a bounded moka cache.
///
/// Expiry is tracked per entry against the tokio clock; moka only bounds
/// the number of entries.
pub struct MemoryCacheStore {
    entries: Cache<String, CacheEntry>,
    closed: AtomicBool,
}

impl MemoryCacheStore {
    /// Create a store with the default capacity (10,000 entries).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store with a custom capacity.
    pub fn with_max_entries(max: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max).build(),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(GatewayError::Cache("memory cache is closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheLookup {
        if let Err(e) = self.ensure_open() {
            return CacheLookup::Error(e);
        }
        match self.entries.get(key).await {
            Some(entry) if Instant::now() < entry.expires_at => CacheLookup::Found(entry.value),
            Some(_) => {
                self.entries.invalidate(key).await;
                CacheLookup::NotFound
            }
            None => CacheLookup::NotFound,
        }
    }

    async fn put(&self, key: &str, value: Content, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        self.entries.invalidate_all();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentCategory;
    use serde_json::json;

    fn content(name: &str) -> Content {
        Content::generated(ContentCategory::Npc, json!({ "name": name }))
    }

    #[tokio::test(start_paused = true)]
    async fn miss_then_hit() {
        let store = MemoryCacheStore::new();
        assert!(matches!(store.get("npc:a").await, CacheLookup::NotFound));

        store.put("npc:a", content("Mira"), Duration::from_secs(10)).await.unwrap();
        match store.get("npc:a").await {
            CacheLookup::Found(c) => assert_eq!(c, content("Mira")),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let store = MemoryCacheStore::new();
        store.put("k", content("Mira"), Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(matches!(store.get("k").await, CacheLookup::Found(_)));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(matches!(store.get("k").await, CacheLookup::NotFound));
    }

    #[tokio::test]
    async fn closed_store_reports_errors() {
        let store = MemoryCacheStore::new();
        store.close().await;
        assert!(!store.is_connected());
        assert!(matches!(store.get("k").await, CacheLookup::Error(_)));
        assert!(store.put("k", content("x"), Duration::from_secs(1)).await.is_err());
    }
}
