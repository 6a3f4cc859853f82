//! Contract Test: Cache Policy Strategies
//!
//! Verifies the per-strategy behavior of the fetch gateway:
//! - Static-first fetches once, then serves from the long-lived partition
//! - Stale-while-revalidate answers from cache while refreshing behind it
//! - Network-first caches assets and falls back to cache/placeholder
//! - Bypass hosts and non-GET requests are never cached

mod common;

use common::*;
use std::sync::Arc;
use skiff_core::cache::MemoryCacheStore;
use skiff_core::config::GatewayConfig;
use skiff_core::policy::FetchGateway;
use skiff_core::traits::{CacheStore, Method, Response};

fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        bypass_hosts: vec!["backend.example".to_string()],
        ..GatewayConfig::new("v1")
    }
}

fn gateway(
    network: Arc<ScriptedNetwork>,
    cache: Arc<MemoryCacheStore>,
) -> FetchGateway {
    let (gateway, _events) = FetchGateway::new(network, cache, gateway_config()).unwrap();
    gateway
}

#[tokio::test]
async fn static_first_fetches_once_then_serves_from_cache() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/css/base.css", "body { margin: 0 }");

    let gateway = gateway(network.clone(), cache.clone());
    let req = get("https://app.example/css/base.css");

    let first = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(network.fetch_count(), 1);
    assert_eq!(cache.len("static-v1").await, 1);

    // The repeat is answered from the partition with zero network calls.
    let second = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(network.fetch_count(), 1);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn static_first_does_not_store_non_ok_responses() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    // No scripted body: the network answers 404.

    let gateway = gateway(network.clone(), cache.clone());
    let req = get("https://app.example/css/missing.css");

    let resp = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(cache.len("static-v1").await, 0);

    // Nothing cached, so the next request hits the network again.
    gateway.handle(&req).await.unwrap();
    assert_eq!(network.fetch_count(), 2);
}

#[tokio::test]
async fn stale_while_revalidate_serves_stale_and_refreshes() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let req = get("https://app.example/translations/en.json");

    // A stale copy sits in the dynamic partition; the network has fresher data.
    cache
        .put("dynamic-v1", &req, &Response::ok(b"{\"hello\":\"old\"}".to_vec()))
        .await
        .unwrap();
    network.set_body("https://app.example/translations/en.json", "{\"hello\":\"new\"}");

    let gateway = gateway(network.clone(), cache.clone());
    let served = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(served.body, b"{\"hello\":\"old\"}".to_vec());

    // Exactly one background fetch lands in the dynamic partition.
    settle().await;
    assert_eq!(network.fetch_count(), 1);
    let refreshed = cache.match_in("dynamic-v1", &req).await.unwrap().unwrap();
    assert_eq!(refreshed.body, b"{\"hello\":\"new\"}".to_vec());
}

#[tokio::test]
async fn stale_while_revalidate_awaits_network_on_cold_cache() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/translations/en.json", "{\"hello\":\"hi\"}");

    let gateway = gateway(network.clone(), cache.clone());
    let req = get("https://app.example/translations/en.json");

    let served = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(served.body, b"{\"hello\":\"hi\"}".to_vec());
    assert_eq!(network.fetch_count(), 1);
    assert_eq!(cache.len("dynamic-v1").await, 1);
}

#[tokio::test]
async fn stale_while_revalidate_cold_cache_offline_is_an_error() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_offline(true);

    let gateway = gateway(network, cache);
    let req = get("https://app.example/translations/en.json");

    assert!(gateway.handle(&req).await.is_err());
}

#[tokio::test]
async fn network_first_caches_asset_responses_only() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/media/photo.png", "png-bytes");
    network.set_body("https://app.example/dashboard", "<html>");

    let gateway = gateway(network.clone(), cache.clone());

    gateway
        .handle(&get("https://app.example/media/photo.png"))
        .await
        .unwrap();
    assert_eq!(cache.len("dynamic-v1").await, 1);

    // Non-asset paths pass through without being stored.
    gateway
        .handle(&get("https://app.example/dashboard"))
        .await
        .unwrap();
    assert_eq!(cache.len("dynamic-v1").await, 1);
}

#[tokio::test]
async fn network_first_falls_back_to_cache_when_offline() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let req = get("https://app.example/media/photo.png");

    cache
        .put("dynamic-v1", &req, &Response::ok(b"png-bytes".to_vec()))
        .await
        .unwrap();
    network.set_offline(true);

    let gateway = gateway(network.clone(), cache);
    let served = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(served.body, b"png-bytes".to_vec());
}

#[tokio::test]
async fn offline_html_request_gets_the_placeholder() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());

    let placeholder_req = get("https://app.example/offline.html");
    cache
        .put("static-v1", &placeholder_req, &Response::ok(b"<h1>offline</h1>".to_vec()))
        .await
        .unwrap();
    network.set_offline(true);

    let gateway = gateway(network, cache);
    let req = get("https://app.example/dashboard").with_accept("text/html");

    let served = gateway.handle(&req).await.unwrap().unwrap();
    assert_eq!(served.body, b"<h1>offline</h1>".to_vec());
}

#[tokio::test]
async fn offline_non_html_request_resolves_absent() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_offline(true);

    let gateway = gateway(network, cache);
    let req = get("https://app.example/data.bin");

    let outcome = gateway.handle(&req).await.unwrap();
    assert!(outcome.is_none(), "absence is an explicit outcome, not an error");
}

#[tokio::test]
async fn non_get_requests_bypass_all_policy() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/css/base.css", "ignored");

    let gateway = gateway(network.clone(), cache.clone());
    let mut req = get("https://app.example/css/base.css");
    req.method = Method::Post;

    gateway.handle(&req).await.unwrap();
    assert_eq!(network.fetch_count(), 1);
    assert!(cache.is_empty().await, "non-GET must never touch the cache");
}

#[tokio::test]
async fn bypass_hosts_always_hit_the_network_and_skip_caching() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://backend.example/css/base.css", "api-data");

    let gateway = gateway(network.clone(), cache.clone());
    let req = get("https://backend.example/css/base.css");

    gateway.handle(&req).await.unwrap();
    gateway.handle(&req).await.unwrap();
    assert_eq!(network.fetch_count(), 2);
    assert!(cache.is_empty().await);

    // Offline bypass requests propagate the transport failure unchanged.
    network.set_offline(true);
    assert!(gateway.handle(&req).await.is_err());
}

#[tokio::test]
async fn request_identity_separates_urls() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/css/a.css", "a");
    network.set_body("https://app.example/css/b.css", "b");

    let gateway = gateway(network.clone(), cache.clone());
    gateway.handle(&get("https://app.example/css/a.css")).await.unwrap();
    gateway.handle(&get("https://app.example/css/b.css")).await.unwrap();

    assert_eq!(cache.len("static-v1").await, 2);
    let served = gateway
        .handle(&get("https://app.example/css/a.css"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(served.body, b"a".to_vec());
}
