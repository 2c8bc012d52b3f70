//! Response cache in front of the generation backend.
//!
//! [`ResponseCache`] caches validated backend content keyed on
//! [`GenerationRequest::cache_key`]. It sits in the
//! [`Gateway`](crate::Gateway) pipeline after admission control: a hit
//! skips the backend call entirely.
//!
//! # Error handling
//!
//! The underlying [`CacheStore`] reports three outcomes. `Error` is logged,
//! counted under [`CACHE_ERRORS_TOTAL`](crate::telemetry::CACHE_ERRORS_TOTAL)
//! and then treated exactly like `NotFound`; failed writes are logged and
//! dropped. Callers of this type never see a cache error.
//!
//! # No single-flight
//!
//! Concurrent requests for the same key issued before either completes both
//! miss and both reach the backend. The second write simply overwrites the
//! first.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{CacheLookup, CacheStore};
use crate::telemetry;
use crate::types::{Content, GenerationRequest};

/// Request-level cache over a [`CacheStore`].
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResponseCache {
    /// Wrap a store, caching entries for `ttl`.
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Look up cached content for a request.
    ///
    /// Returns `None` on a miss or when the store fails.
    pub async fn get(&self, request: &GenerationRequest) -> Option<Content> {
        let key = request.cache_key();
        let category = request.category().as_str();
        match self.store.get(&key).await {
            CacheLookup::Found(content) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "category" => category)
                    .increment(1);
                debug!(cache_key = %key, "cache hit");
                Some(content)
            }
            CacheLookup::NotFound => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category)
                    .increment(1);
                None
            }
            CacheLookup::Error(e) => {
                metrics::counter!(telemetry::CACHE_ERRORS_TOTAL, "operation" => "get")
                    .increment(1);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category)
                    .increment(1);
                warn!(store = self.store.name(), cache_key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store content for a request with the configured TTL.
    pub async fn put(&self, request: &GenerationRequest, content: &Content) {
        let key = request.cache_key();
        if let Err(e) = self.store.put(&key, content.clone(), self.ttl).await {
            metrics::counter!(telemetry::CACHE_ERRORS_TOTAL, "operation" => "put").increment(1);
            warn!(store = self.store.name(), cache_key = %key, error = %e, "cache write failed");
        }
    }

    /// Remove every cached entry. Failures are logged.
    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(store = self.store.name(), error = %e, "cache clear failed");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    /// Close the underlying store.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
