//! Fetch gateway: cache policy at the network boundary
//!
//! The [`FetchGateway`] intercepts every outbound GET request, classifies
//! it against an ordered rule table, and applies one of four strategies:
//!
//! ```text
//! ┌─────────────┐        ┌──────────────┐        ┌─────────────┐
//! │   Request   │───────▶│ FetchGateway │───────▶│   Network   │
//! └─────────────┘        └──────────────┘        └─────────────┘
//!                               │
//!                 ┌─────────────┼─────────────┐
//!                 ▼             ▼             ▼
//!          ┌───────────┐ ┌───────────┐ ┌───────────┐
//!          │  static   │ │  dynamic  │ │  Events   │
//!          │ partition │ │ partition │ │ (notify)  │
//!          └───────────┘ └───────────┘ └───────────┘
//! ```
//!
//! - **Bypass** — backend/API hosts go straight to network, never cached
//! - **Static-first** — long-lived partition wins; misses fill it
//! - **Stale-while-revalidate** — cached copy answers immediately, a
//!   detached task refreshes the short-lived partition
//! - **Network-first** — default; cache and offline placeholder on failure
//!
//! Page-load failures must never take the interception layer down: every
//! cache operation on these paths is guarded, and the worst outcome of a
//! broken cache is a pass-through to network or a logged no-op.

pub mod rules;

pub use rules::{RoutePredicate, RouteRule, RuleSet, Strategy};

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::traits::{CacheStore, Method, Network, Request, Response};

/// Events emitted by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// Install finished: precache results
    Installed {
        /// Assets stored into the static partition
        cached: usize,
        /// Assets that failed to precache (logged, not fatal)
        failed: usize,
    },

    /// Activation finished: prior-version partitions removed
    Activated {
        /// Names of the deleted partitions
        removed: Vec<String>,
    },

    /// All partitions wiped on request; broadcast to clients as completion
    CachesWiped {
        /// Number of partitions deleted
        removed: usize,
    },

    /// A request was answered from a cache partition
    ServedFromCache {
        /// The request URL
        url: String,
        /// The partition that answered
        partition: String,
    },

    /// A request fell back to the offline placeholder
    OfflineFallback {
        /// The request URL
        url: String,
    },
}

/// Externally triggerable control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Force a waiting update live: run activation now
    ActivateNow,
    /// Delete every cache partition and broadcast completion
    WipeCaches,
}

/// Cache policy controller at the request-interception boundary
///
/// ## Lifecycle
///
/// 1. Create with [`FetchGateway::new`]
/// 2. [`install`](Self::install) pre-populates the static partition
/// 3. [`activate`](Self::activate) discards prior-version partitions
/// 4. [`handle`](Self::handle) serves requests until shutdown
///
/// The gateway is cheap to share (`Arc` it); all methods take `&self`.
pub struct FetchGateway {
    network: Arc<dyn Network>,
    cache: Arc<dyn CacheStore>,
    rules: RuleSet,
    config: GatewayConfig,
    event_tx: mpsc::Sender<GatewayEvent>,
}

impl FetchGateway {
    /// Create a gateway
    ///
    /// # Returns
    ///
    /// A tuple of (gateway, event receiver); the receiver yields
    /// [`GatewayEvent`]s for monitoring and client notification.
    pub fn new(
        network: Arc<dyn Network>,
        cache: Arc<dyn CacheStore>,
        config: GatewayConfig,
    ) -> Result<(Self, mpsc::Receiver<GatewayEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);
        let rules = RuleSet::from_config(&config);

        let gateway = Self {
            network,
            cache,
            rules,
            config,
            event_tx: tx,
        };

        Ok((gateway, rx))
    }

    /// The active classification table
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Handle one outbound request
    ///
    /// Non-GET requests bypass all policy and go straight to the network.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Response))`: a network or cached response (any status)
    /// - `Ok(None)`: offline with no cached copy and no applicable
    ///   placeholder — the explicit absent outcome the caller must handle
    /// - `Err(Error)`: a failure the policy does not recover (bypass
    ///   transport errors, cache-miss network failures under
    ///   static-first/stale-while-revalidate)
    pub async fn handle(&self, req: &Request) -> Result<Option<Response>> {
        if req.method != Method::Get {
            return self.network.fetch(req).await.map(Some);
        }

        match self.rules.classify(req) {
            Strategy::Bypass => self.network.fetch(req).await.map(Some),
            Strategy::StaticFirst => self.static_first(req).await.map(Some),
            Strategy::StaleWhileRevalidate => {
                self.stale_while_revalidate(req).await.map(Some)
            }
            Strategy::NetworkFirst => self.network_first(req).await,
        }
    }

    /// Static-first: long-lived partition, filled on miss
    async fn static_first(&self, req: &Request) -> Result<Response> {
        let partition = self.config.static_partition();

        match self.cache.match_in(&partition, req).await {
            Ok(Some(cached)) => {
                debug!(url = %req.url, "served from static cache");
                self.emit_event(GatewayEvent::ServedFromCache {
                    url: req.url.to_string(),
                    partition,
                });
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(url = %req.url, error = %e, "static cache lookup failed, going to network");
            }
        }

        let resp = self.network.fetch(req).await?;
        if resp.is_ok() {
            if let Err(e) = self.cache.put(&partition, req, &resp).await {
                warn!(url = %req.url, error = %e, "failed to store static response");
            }
        }
        Ok(resp)
    }

    /// Stale-while-revalidate: cached copy now, refresh in the background
    async fn stale_while_revalidate(&self, req: &Request) -> Result<Response> {
        let cached = match self.cache.match_any(req).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(url = %req.url, error = %e, "cache lookup failed, going to network");
                None
            }
        };

        if let Some(cached) = cached {
            // Answer from cache immediately; the refresh is detached on
            // purpose and may complete long after this response returned.
            self.spawn_refresh(req.clone());
            self.emit_event(GatewayEvent::ServedFromCache {
                url: req.url.to_string(),
                partition: self.config.dynamic_partition(),
            });
            return Ok(cached);
        }

        // Nothing cached: the caller waits on the network, and a network
        // failure is theirs to see.
        let resp = self.network.fetch(req).await?;
        if resp.is_ok() {
            let partition = self.config.dynamic_partition();
            if let Err(e) = self.cache.put(&partition, req, &resp).await {
                warn!(url = %req.url, error = %e, "failed to store locale response");
            }
        }
        Ok(resp)
    }

    /// Detached refresh of the short-lived partition
    fn spawn_refresh(&self, req: Request) {
        let network = Arc::clone(&self.network);
        let cache = Arc::clone(&self.cache);
        let partition = self.config.dynamic_partition();

        tokio::spawn(async move {
            match network.fetch(&req).await {
                Ok(resp) if resp.is_ok() => {
                    if let Err(e) = cache.put(&partition, &req, &resp).await {
                        warn!(url = %req.url, error = %e, "background refresh store failed");
                    } else {
                        debug!(url = %req.url, "background refresh complete");
                    }
                }
                Ok(resp) => {
                    debug!(url = %req.url, status = resp.status, "background refresh got non-OK response");
                }
                Err(e) => {
                    debug!(url = %req.url, error = %e, "background refresh failed");
                }
            }
        });
    }

    /// Network-first: default strategy with layered fallbacks
    async fn network_first(&self, req: &Request) -> Result<Option<Response>> {
        match self.network.fetch(req).await {
            Ok(resp) => {
                if resp.is_ok() && self.is_cacheable_asset(req) {
                    let partition = self.config.dynamic_partition();
                    if let Err(e) = self.cache.put(&partition, req, &resp).await {
                        warn!(url = %req.url, error = %e, "failed to store asset response");
                    }
                }
                Ok(Some(resp))
            }
            Err(e) => {
                debug!(url = %req.url, error = %e, "network failed, trying cache");

                match self.cache.match_any(req).await {
                    Ok(Some(cached)) => {
                        info!(url = %req.url, "served from cache (offline)");
                        self.emit_event(GatewayEvent::ServedFromCache {
                            url: req.url.to_string(),
                            partition: "any".to_string(),
                        });
                        return Ok(Some(cached));
                    }
                    Ok(None) => {}
                    Err(cache_err) => {
                        warn!(url = %req.url, error = %cache_err, "offline cache lookup failed");
                    }
                }

                if req.accepts_html() {
                    if let Some(placeholder) = self.offline_placeholder(req).await {
                        self.emit_event(GatewayEvent::OfflineFallback {
                            url: req.url.to_string(),
                        });
                        return Ok(Some(placeholder));
                    }
                }

                Ok(None)
            }
        }
    }

    /// Look up the offline placeholder page for a request's origin
    async fn offline_placeholder(&self, req: &Request) -> Option<Response> {
        let offline_url = match req.url.join(&self.config.offline_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "offline placeholder URL does not resolve");
                return None;
            }
        };
        let offline_req = Request::get(offline_url);
        match self.cache.match_any(&offline_req).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "offline placeholder lookup failed");
                None
            }
        }
    }

    /// Whether a network-first response should be kept in the dynamic partition
    fn is_cacheable_asset(&self, req: &Request) -> bool {
        let path = req.path();
        self.config
            .asset_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }

    /// Pre-populate the static partition with the configured asset list
    ///
    /// Individual asset failures are logged and skipped; install succeeds
    /// with whatever assets made it.
    pub async fn install(&self) -> Result<()> {
        info!(version = %self.config.version, "installing");

        let static_partition = self.config.static_partition();
        self.cache.open(&static_partition).await?;
        self.cache.open(&self.config.dynamic_partition()).await?;

        let mut cached = 0usize;
        let mut failed = 0usize;
        for asset in &self.config.precache_assets {
            match self.precache_asset(&static_partition, asset).await {
                Ok(()) => cached += 1,
                Err(e) => {
                    failed += 1;
                    warn!(asset = %asset, error = %e, "failed to precache asset");
                }
            }
        }

        info!(cached, failed, "install complete");
        self.emit_event(GatewayEvent::Installed { cached, failed });
        Ok(())
    }

    /// Fetch one asset and store it into the static partition
    async fn precache_asset(&self, partition: &str, asset: &str) -> Result<()> {
        let url = Url::parse(asset)
            .map_err(|e| Error::config(format!("precache asset {} is not a URL: {}", asset, e)))?;
        let req = Request::get(url);
        let resp = self.network.fetch(&req).await?;
        if !resp.is_ok() {
            return Err(Error::network(format!(
                "precache fetch returned status {}",
                resp.status
            )));
        }
        self.cache.put(partition, &req, &resp).await
    }

    /// Discard every partition from a prior version
    ///
    /// Deletes each partition whose name is neither the static nor the
    /// dynamic partition of the current version. Idempotent.
    pub async fn activate(&self) -> Result<()> {
        let keep = [
            self.config.static_partition(),
            self.config.dynamic_partition(),
        ];

        let names = self.cache.list_partitions().await?;
        let mut removed = Vec::new();
        for name in names {
            if keep.contains(&name) {
                continue;
            }
            match self.cache.delete_partition(&name).await {
                Ok(_) => {
                    info!(partition = %name, "deleted stale cache partition");
                    removed.push(name);
                }
                Err(e) => {
                    warn!(partition = %name, error = %e, "failed to delete stale partition");
                }
            }
        }

        info!(version = %self.config.version, removed = removed.len(), "activated");
        self.emit_event(GatewayEvent::Activated { removed });
        Ok(())
    }

    /// Handle an external control command
    pub async fn handle_message(&self, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::ActivateNow => {
                info!("forced activation requested");
                self.activate().await
            }
            ControlMessage::WipeCaches => {
                let names = self.cache.list_partitions().await?;
                let mut removed = 0usize;
                for name in names {
                    match self.cache.delete_partition(&name).await {
                        Ok(true) => removed += 1,
                        Ok(false) => {}
                        Err(e) => {
                            warn!(partition = %name, error = %e, "failed to wipe partition");
                        }
                    }
                }
                info!(removed, "cache partitions wiped");
                self.emit_event(GatewayEvent::CachesWiped { removed });
                Ok(())
            }
        }
    }

    /// Emit a gateway event
    fn emit_event(&self, event: GatewayEvent) {
        // Events are advisory; when nobody drains the receiver the channel
        // fills and newer events are dropped with a warning.
        if self.event_tx.try_send(event).is_err() {
            warn!("gateway event channel full, dropping event");
        }
    }
}

impl std::fmt::Debug for FetchGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchGateway")
            .field("version", &self.config.version)
            .finish_non_exhaustive()
    }
}
