//! Contract Test: Gateway Lifecycle & Control Messages
//!
//! Verifies install/activate semantics and the control-message interface:
//! - Install precaches the configured assets, tolerating individual failures
//! - Activation deletes exactly the prior-version partitions
//! - WipeCaches removes everything and broadcasts completion
//! - ActivateNow forces a waiting activation immediately

mod common;

use common::*;
use std::sync::Arc;
use skiff_core::cache::MemoryCacheStore;
use skiff_core::config::GatewayConfig;
use skiff_core::policy::{ControlMessage, FetchGateway, GatewayEvent};
use skiff_core::traits::{CacheStore, Response};

#[tokio::test]
async fn install_precaches_assets_and_tolerates_failures() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/css/base.css", "css");
    network.set_body("https://app.example/js/app.js", "js");
    // https://app.example/css/gone.css is unscripted and will 404.

    let config = GatewayConfig {
        precache_assets: vec![
            "https://app.example/css/base.css".to_string(),
            "https://app.example/css/gone.css".to_string(),
            "https://app.example/js/app.js".to_string(),
        ],
        ..GatewayConfig::new("v1")
    };
    let (gateway, mut events) = FetchGateway::new(network.clone(), cache.clone(), config).unwrap();

    gateway.install().await.unwrap();

    assert_eq!(network.fetch_count(), 3);
    assert_eq!(cache.len("static-v1").await, 2);
    assert_eq!(
        events.try_recv().unwrap(),
        GatewayEvent::Installed { cached: 2, failed: 1 }
    );
}

#[tokio::test]
async fn install_opens_both_partitions() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let (gateway, _events) =
        FetchGateway::new(network, cache.clone(), GatewayConfig::new("v1")).unwrap();

    gateway.install().await.unwrap();

    let mut names = cache.list_partitions().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["dynamic-v1", "static-v1"]);
}

#[tokio::test]
async fn activation_deletes_exactly_the_prior_version_partitions() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());

    // Two prior-version partitions and one current one.
    cache.open("static-v0.9").await.unwrap();
    cache.open("dynamic-v0.9").await.unwrap();
    cache.open("static-v1").await.unwrap();
    cache
        .put(
            "static-v1",
            &get("https://app.example/css/base.css"),
            &Response::ok(b"css".to_vec()),
        )
        .await
        .unwrap();

    let (gateway, mut events) =
        FetchGateway::new(network, cache.clone(), GatewayConfig::new("v1")).unwrap();
    gateway.activate().await.unwrap();

    let names = cache.list_partitions().await.unwrap();
    assert_eq!(names, vec!["static-v1".to_string()]);
    // Current-version contents survive activation untouched.
    assert_eq!(cache.len("static-v1").await, 1);

    match events.try_recv().unwrap() {
        GatewayEvent::Activated { mut removed } => {
            removed.sort();
            assert_eq!(removed, vec!["dynamic-v0.9".to_string(), "static-v0.9".to_string()]);
        }
        other => panic!("expected Activated event, got {:?}", other),
    }
}

#[tokio::test]
async fn activation_is_idempotent() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    cache.open("static-v0.9").await.unwrap();

    let (gateway, mut events) =
        FetchGateway::new(network, cache.clone(), GatewayConfig::new("v1")).unwrap();

    gateway.activate().await.unwrap();
    gateway.activate().await.unwrap();

    let _ = events.try_recv().unwrap();
    match events.try_recv().unwrap() {
        GatewayEvent::Activated { removed } => assert!(removed.is_empty()),
        other => panic!("expected Activated event, got {:?}", other),
    }
}

#[tokio::test]
async fn wipe_message_clears_everything_and_notifies() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    cache.open("static-v1").await.unwrap();
    cache.open("dynamic-v1").await.unwrap();
    cache.open("static-v0.9").await.unwrap();

    let (gateway, mut events) =
        FetchGateway::new(network, cache.clone(), GatewayConfig::new("v1")).unwrap();

    gateway
        .handle_message(ControlMessage::WipeCaches)
        .await
        .unwrap();

    assert!(cache.list_partitions().await.unwrap().is_empty());
    // The completion notification is what clients wait on before reloading.
    assert_eq!(
        events.try_recv().unwrap(),
        GatewayEvent::CachesWiped { removed: 3 }
    );
}

#[tokio::test]
async fn activate_now_message_forces_activation() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    cache.open("static-v0.9").await.unwrap();

    let (gateway, mut events) =
        FetchGateway::new(network, cache.clone(), GatewayConfig::new("v1")).unwrap();

    gateway
        .handle_message(ControlMessage::ActivateNow)
        .await
        .unwrap();

    assert!(cache.list_partitions().await.unwrap().is_empty());
    match events.try_recv().unwrap() {
        GatewayEvent::Activated { removed } => {
            assert_eq!(removed, vec!["static-v0.9".to_string()]);
        }
        other => panic!("expected Activated event, got {:?}", other),
    }
}

#[tokio::test]
async fn install_then_activate_is_the_standard_upgrade_path() {
    let network = ScriptedNetwork::new();
    let cache = Arc::new(MemoryCacheStore::new());
    network.set_body("https://app.example/css/base.css", "css-v2");

    // Leftovers from the previous release.
    cache.open("static-v1").await.unwrap();
    cache.open("dynamic-v1").await.unwrap();

    let config = GatewayConfig {
        precache_assets: vec!["https://app.example/css/base.css".to_string()],
        ..GatewayConfig::new("v2")
    };
    let (gateway, _events) = FetchGateway::new(network, cache.clone(), config).unwrap();

    gateway.install().await.unwrap();
    gateway.activate().await.unwrap();

    let mut names = cache.list_partitions().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["dynamic-v2", "static-v2"]);
    assert_eq!(cache.len("static-v2").await, 1);
}
