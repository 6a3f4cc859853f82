//! Test doubles and common utilities for contract tests
//!
//! These doubles count calls so tests can assert how often the layer
//! actually touched the store or the network, not just what it returned.

#![allow(dead_code)]

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_stream::Stream;
use url::Url;

use skiff_core::error::Result;
use skiff_core::store::MemoryCollection;
use skiff_core::traits::{
    ChangeCallback, Collection, Entry, Network, RangeQuery, Request, Response, Snapshot,
};
use skiff_core::Error;

/// A Collection wrapper that counts calls and can be switched to failing
pub struct CountingCollection {
    inner: MemoryCollection,
    range_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    count_calls: AtomicUsize,
    watch_calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingCollection {
    pub fn new(inner: MemoryCollection) -> Arc<Self> {
        Arc::new(Self {
            inner,
            range_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    /// Build a collection seeded with `n` entries `k001..k<n>`
    pub fn seeded(n: u32) -> Arc<Self> {
        let inner = MemoryCollection::from_entries(
            (1..=n).map(|i| (format!("k{:03}", i), serde_json::json!(i))),
        );
        Self::new(inner)
    }

    /// Make every store operation fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    /// The wrapped collection, for mutating test data
    pub fn inner(&self) -> &MemoryCollection {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::store("scripted failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Collection for CountingCollection {
    async fn get_range(&self, query: &RangeQuery) -> Result<Vec<Entry>> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get_range(query).await
    }

    async fn fetch(&self) -> Result<Snapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.fetch().await
    }

    async fn count(&self) -> Result<usize> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.count().await
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = Snapshot> + Send + 'static>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.watch()
    }
}

/// A Network double serving scripted responses by URL
pub struct ScriptedNetwork {
    responses: Mutex<HashMap<String, Response>>,
    fetch_count: AtomicUsize,
    fetched_urls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            fetch_count: AtomicUsize::new(0),
            fetched_urls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        })
    }

    /// Script the response for a URL
    pub fn set_response(&self, url: &str, resp: Response) {
        self.responses.lock().unwrap().insert(url.to_string(), resp);
    }

    /// Script a 200 response with a body for a URL
    pub fn set_body(&self, url: &str, body: &str) {
        self.set_response(url, Response::ok(body.as_bytes().to_vec()));
    }

    /// Simulate losing (or regaining) connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, req: &Request) -> Result<Response> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetched_urls
            .lock()
            .unwrap()
            .push(req.url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::network("offline"));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(req.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::with_status(404, Vec::new())))
    }
}

/// A callback that records every snapshot it receives
pub fn recording_callback() -> (ChangeCallback, Arc<Mutex<Vec<Snapshot>>>) {
    let received: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let callback: ChangeCallback = Arc::new(move |snapshot| {
        sink.lock().unwrap().push(snapshot);
    });
    (callback, received)
}

/// Build a GET request for a URL literal
pub fn get(url: &str) -> Request {
    Request::get(Url::parse(url).expect("test URL parses"))
}

/// Keys of a page, for compact assertions
pub fn keys(page: &[Entry]) -> Vec<String> {
    page.iter().map(|e| e.key.clone()).collect()
}

/// Give spawned forwarding tasks a moment to run
pub async fn settle() {
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
}
