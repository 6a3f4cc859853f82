//! Minimal embedding example for skiff-core
//!
//! This example demonstrates wiring the three subsystems into a custom
//! application: paging a collection through the registry, subscribing to
//! live changes, and routing resource requests through the fetch gateway.
//! All collaborators are in-process so the example runs offline.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use skiff_core::cache::MemoryCacheStore;
use skiff_core::config::{GatewayConfig, SkiffConfig};
use skiff_core::paginator::PaginatorRegistry;
use skiff_core::policy::FetchGateway;
use skiff_core::store::MemoryCollection;
use skiff_core::subscriptions::{Mode, SubscriptionManager};
use skiff_core::traits::{ChangeCallback, Network, Request, Response};
use skiff_core::Result;

/// Canned network for embedded usage: every known URL answers 200
struct EmbeddedNetwork;

#[async_trait]
impl Network for EmbeddedNetwork {
    async fn fetch(&self, req: &Request) -> Result<Response> {
        match req.path() {
            "/css/base.css" => Ok(Response::ok(b"body { margin: 0 }".to_vec())
                .with_content_type("text/css")),
            "/translations/en.json" => Ok(Response::ok(b"{\"hello\":\"hello\"}".to_vec())
                .with_content_type("application/json")),
            _ => Ok(Response::with_status(404, Vec::new())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = SkiffConfig {
        gateway: GatewayConfig {
            precache_assets: vec!["https://app.example/css/base.css".to_string()],
            ..GatewayConfig::new("v1.0.0")
        },
        ..SkiffConfig::new()
    };
    config.validate()?;

    // An ordered collection of 45 chat messages.
    let messages = Arc::new(MemoryCollection::from_entries(
        (1..=45).map(|i| (format!("msg-{:03}", i), json!({ "text": format!("message {}", i) }))),
    ));

    // ── Pagination ────────────────────────────────────────────────────
    let registry = PaginatorRegistry::new();
    let paginator = registry
        .get("messages", messages.clone(), config.pagination.default_page_size)
        .await;

    let page = paginator.load_next_page().await?;
    println!("page 1: {} entries, newest {}", page.len(), page.last().unwrap().key);
    let page = paginator.load_next_page().await?;
    println!("page 2: {} entries", page.len());
    let page = paginator.load_next_page().await?;
    println!("page 3: {} entries, has_more = {}", page.len(), paginator.state().await.has_more);
    println!("total count: {}", paginator.total_count().await?);

    // ── Subscriptions ─────────────────────────────────────────────────
    let subscriptions = SubscriptionManager::new();
    let callback: ChangeCallback = Arc::new(|snapshot| {
        let size = snapshot.value.map(|v| v.as_object().map_or(0, |o| o.len()));
        println!("live update: collection now has {:?} entries", size);
    });
    subscriptions
        .activate("messages", messages.clone(), callback, Mode::Realtime)
        .await?;

    messages.insert("msg-046", json!({ "text": "a new arrival" }));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    subscriptions.deactivate_all().await;

    // ── Fetch gateway ─────────────────────────────────────────────────
    let cache = Arc::new(MemoryCacheStore::new());
    let (gateway, _events) = FetchGateway::new(Arc::new(EmbeddedNetwork), cache, config.gateway)?;

    gateway.install().await?;
    gateway.activate().await?;

    let css = Request::get(Url::parse("https://app.example/css/base.css")?);
    let served = gateway.handle(&css).await?.expect("precached asset");
    println!("css served: {} bytes (from static partition)", served.body.len());

    let locale = Request::get(Url::parse("https://app.example/translations/en.json")?);
    let served = gateway.handle(&locale).await?.expect("locale data");
    println!("locale served: {} bytes", served.body.len());

    Ok(())
}
