//! Tests for [`ResponseCache`] over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use loregate::cache::{MemoryCacheStore, ResponseCache};
use loregate::{CacheStore, Content, ContentCategory, GenerationRequest};

fn npc(location: &str) -> GenerationRequest {
    GenerationRequest::new(ContentCategory::Npc).param("location", location)
}

fn content(name: &str) -> Content {
    Content::generated(ContentCategory::Npc, json!({ "name": name }))
}

#[tokio::test(start_paused = true)]
async fn put_then_get_by_request() {
    let cache = ResponseCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60));

    assert!(cache.get(&npc("Docks")).await.is_none());
    cache.put(&npc("Docks"), &content("Brann")).await;

    assert_eq!(cache.get(&npc("Docks")).await, Some(content("Brann")));
    assert!(cache.get(&npc("Harbor")).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn parameter_order_does_not_change_the_key() {
    let cache = ResponseCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60));
    let a = GenerationRequest::new(ContentCategory::Npc)
        .param("location", "Docks")
        .param("type", "guard");
    let b = GenerationRequest::new(ContentCategory::Npc)
        .param("type", "guard")
        .param("location", "Docks");

    cache.put(&a, &content("Brann")).await;
    assert_eq!(cache.get(&b).await, Some(content("Brann")));
}

#[tokio::test(start_paused = true)]
async fn entries_expire_with_configured_ttl() {
    let cache = ResponseCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(1));
    cache.put(&npc("Docks"), &content("Brann")).await;

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get(&npc("Docks")).await.is_none());
}

#[tokio::test]
async fn closed_store_reads_as_miss() {
    let store = Arc::new(MemoryCacheStore::new());
    let cache = ResponseCache::new(store.clone(), Duration::from_secs(60));
    cache.put(&npc("Docks"), &content("Brann")).await;

    cache.close().await;
    assert!(!cache.is_connected());
    assert!(!store.is_connected());
    assert!(cache.get(&npc("Docks")).await.is_none());

    // Writes to a closed store are dropped without surfacing an error
    cache.put(&npc("Harbor"), &content("Mira")).await;
}

#[tokio::test]
async fn clear_removes_entries() {
    let cache = ResponseCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60));
    cache.put(&npc("Docks"), &content("Brann")).await;
    cache.clear().await;
    assert!(cache.get(&npc("Docks")).await.is_none());
}
