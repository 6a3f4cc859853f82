// # skiff-http
//
// HTTP-backed implementations of the skiff core traits.
//
// ## Purpose
//
// - [`RestCollection`]: a `Collection` over a REST ordered-KV endpoint
//   that answers `GET <base>?limitToLast=N&endBefore=K...` with a JSON
//   object of key → value pairs
// - [`HttpNetwork`]: the `Network` transport behind the fetch gateway
//
// ## Watch Semantics
//
// REST endpoints have no push channel, so `RestCollection::watch()` polls
// at a configurable interval and emits a snapshot only when the payload
// actually changed. Where the remote store offers a real notification
// stream, prefer a `Collection` implementation that uses it; polling is
// the fallback.
//
// ## Intentionally Omitted
//
// - NO retry or backoff (owned by the caller / core layer)
// - NO caching (owned by the fetch gateway and its partitions)
// - NO pagination bookkeeping (owned by the core paginator)
//
// One call here is one HTTP round trip.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace, warn};
use url::Url;

use skiff_core::traits::{Collection, Entry, Method, Network, RangeQuery, Request, Response, Snapshot};
use skiff_core::{Error, Result};

/// Default HTTP timeout for endpoint requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default polling interval for `watch()`
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Append range query bounds as URL query parameters
fn apply_query(url: &mut Url, query: &RangeQuery) {
    let mut pairs = url.query_pairs_mut();
    if let Some(n) = query.limit_to_first {
        pairs.append_pair("limitToFirst", &n.to_string());
    }
    if let Some(n) = query.limit_to_last {
        pairs.append_pair("limitToLast", &n.to_string());
    }
    if let Some(key) = &query.start_after {
        pairs.append_pair("startAfter", key);
    }
    if let Some(key) = &query.end_before {
        pairs.append_pair("endBefore", key);
    }
}

/// Parse an endpoint payload into ascending entries
///
/// The endpoint answers with a JSON object (or `null` when empty); the
/// BTreeMap restores ascending key order regardless of payload order.
fn parse_entries(payload: Value) -> Result<Vec<Entry>> {
    match payload {
        Value::Null => Ok(Vec::new()),
        Value::Object(object) => {
            let ordered: BTreeMap<String, Value> = object.into_iter().collect();
            Ok(ordered
                .into_iter()
                .map(|(key, value)| Entry::new(key, value))
                .collect())
        }
        other => Err(Error::store(format!(
            "endpoint returned {} where an object was expected",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A `Collection` over one REST ordered-KV endpoint
pub struct RestCollection {
    /// Endpoint URL of the collection
    base: Url,

    /// Polling interval for `watch()`
    poll_interval: Duration,

    /// HTTP client for endpoint requests
    client: reqwest::Client,
}

impl RestCollection {
    /// Create a collection client for an endpoint URL
    pub fn new(base: Url) -> Self {
        Self::with_interval(base, DEFAULT_POLL_INTERVAL)
    }

    /// Create a collection client with a custom polling interval
    pub fn with_interval(base: Url, poll_interval: Duration) -> Self {
        Self {
            base,
            poll_interval,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// GET the endpoint with optional range bounds
    async fn get_payload(&self, query: Option<&RangeQuery>) -> Result<Value> {
        let mut url = self.base.clone();
        if let Some(query) = query {
            apply_query(&mut url, query);
        }

        trace!(url = %url, "endpoint request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::network(format!("endpoint request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::store(format!(
                "endpoint returned status {} for {}",
                status, url
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::store(format!("endpoint payload is not JSON: {}", e)))
    }
}

#[async_trait]
impl Collection for RestCollection {
    async fn get_range(&self, query: &RangeQuery) -> Result<Vec<Entry>> {
        let payload = self.get_payload(Some(query)).await?;
        parse_entries(payload)
    }

    async fn fetch(&self) -> Result<Snapshot> {
        let payload = self.get_payload(None).await?;
        Ok(match payload {
            Value::Null => Snapshot::empty(),
            value => Snapshot::new(value),
        })
    }

    async fn count(&self) -> Result<usize> {
        // No count endpoint in the generic contract: one full fetch,
        // counted locally. Callers cache this via the paginator.
        let payload = self.get_payload(None).await?;
        Ok(parse_entries(payload)?.len())
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = Snapshot> + Send + 'static>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let collection = RestCollection {
            base: self.base.clone(),
            poll_interval: self.poll_interval,
            client: self.client.clone(),
        };

        tokio::spawn(async move {
            let mut last: Option<Snapshot> = None;
            loop {
                match collection.fetch().await {
                    Ok(snapshot) => {
                        let changed = last.as_ref() != Some(&snapshot);
                        if changed {
                            last = Some(snapshot.clone());
                            if tx.send(snapshot).is_err() {
                                // Receiver dropped: subscription cancelled.
                                break;
                            }
                        } else if tx.is_closed() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "poll failed, keeping last snapshot");
                        if tx.is_closed() {
                            break;
                        }
                    }
                }
                tokio::time::sleep(collection.poll_interval).await;
            }
            debug!("watch poll loop stopped");
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

impl std::fmt::Debug for RestCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestCollection")
            .field("base", &self.base.as_str())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

/// A `Network` transport over reqwest
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Create a transport with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a transport with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

fn reqwest_method(method: &Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Other(name) => {
            reqwest::Method::from_bytes(name.as_bytes()).unwrap_or(reqwest::Method::GET)
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, req: &Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(reqwest_method(&req.method), req.url.as_str());
        if let Some(accept) = &req.accept {
            builder = builder.header(reqwest::header::ACCEPT, accept);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::network(format!("fetch failed: {}", e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(format!("body read failed: {}", e)))?
            .to_vec();

        let mut snapshot = Response::with_status(status, body);
        if let Some(content_type) = content_type {
            snapshot = snapshot.with_content_type(content_type);
        }
        Ok(snapshot)
    }
}

impl std::fmt::Debug for HttpNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNetwork").finish_non_exhaustive()
    }
}
