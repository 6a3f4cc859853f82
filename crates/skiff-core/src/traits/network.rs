// # Network Trait
//
// Defines the outbound transport consumed by the fetch gateway.
//
// The gateway never talks to the network directly; it hands a [`Request`]
// to a `Network` implementation and gets a [`Response`] snapshot back.
// Transport failures (DNS, connect, timeout) are `Err`; an HTTP-level
// failure is a successful fetch of a non-2xx `Response` and is `Ok`.
//
// ## Implementations
//
// - reqwest-backed: `skiff-http` crate
// - Scripted doubles: contract tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Other(String),
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Other(m) => write!(f, "{}", m),
        }
    }
}

/// An outbound resource request
///
/// Requests are identified by method + URL; two requests with the same
/// identity hit the same cache slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Full request URL
    pub url: Url,
    /// The `Accept` header value, if any
    pub accept: Option<String>,
}

impl Request {
    /// Create a GET request for a URL
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            accept: None,
        }
    }

    /// Set the `Accept` header value
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// The cache identity of this request (method + URL)
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// The request host, or an empty string for host-less URLs
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// The request path
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Whether the caller accepts an HTML response
    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("text/html"))
    }
}

/// A stored response snapshot
///
/// This is the unit the cache partitions hold: status, content type, body
/// bytes and the time the body was fetched. Cloning is a plain memory copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// The `Content-Type` header value, if any
    pub content_type: Option<String>,
    /// Response body bytes
    pub body: Vec<u8>,
    /// When the body was fetched from the network
    pub fetched_at: DateTime<Utc>,
}

impl Response {
    /// Create a 200 response with a body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: None,
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Create a response with an explicit status
    pub fn with_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the `Content-Type` header value
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for outbound transport implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// They perform exactly one network round trip per call: no retries, no
/// caching, no fallbacks. All of that is owned by the fetch gateway.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a resource from the network
    ///
    /// # Returns
    ///
    /// - `Ok(Response)`: the fetched response (any status, including non-2xx)
    /// - `Err(Error)`: if the transport failed before a response arrived
    async fn fetch(&self, req: &Request) -> Result<Response, crate::Error>;
}
