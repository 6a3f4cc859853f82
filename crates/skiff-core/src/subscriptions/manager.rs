//! Subscription manager
//!
//! Tracks active realtime subscriptions and a one-shot static-fetch cache,
//! both keyed by logical name. The manager is an explicit context object:
//! the composing application owns one and shares it, there is no global
//! instance.
//!
//! ## State machine per name
//!
//! `INACTIVE → ACTIVE` on [`activate`](SubscriptionManager::activate) with
//! [`Mode::Realtime`]; `ACTIVE → INACTIVE` on
//! [`deactivate`](SubscriptionManager::deactivate). Activating an already
//! active name is a rejected no-op (warned, not an error), which is what
//! guarantees the at-most-one-subscription-per-name invariant. One-shot
//! activations never enter the state machine at all.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::subscriptions::SubscriptionHandle;
use crate::traits::{ChangeCallback, Collection, Snapshot};

/// How an activation consumes the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attach a change listener: the callback fires on every mutation
    Realtime,
    /// Fetch once, invoke the callback once, track nothing
    OneShot,
}

/// Counts reported by [`SubscriptionManager::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionStats {
    /// Active realtime subscriptions
    pub active: usize,
    /// Cached static snapshots
    pub cached: usize,
}

/// Tracks realtime subscriptions and cached static snapshots by name
#[derive(Default)]
pub struct SubscriptionManager {
    active: Mutex<HashMap<String, SubscriptionHandle>>,
    static_cache: Mutex<HashMap<String, Snapshot>>,
}

impl SubscriptionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a subscription under a unique name
    ///
    /// With [`Mode::Realtime`], attaches the collection's watch stream to
    /// the callback and tracks the subscription. If `name` is already
    /// active this is a rejected no-op: the existing subscription stays
    /// untouched and a warning is logged.
    ///
    /// With [`Mode::OneShot`], performs exactly one fetch, invokes the
    /// callback with the snapshot, and tracks nothing — a later activation
    /// with the same name is not blocked by the no-op guard.
    pub async fn activate(
        &self,
        name: impl Into<String>,
        collection: Arc<dyn Collection>,
        callback: ChangeCallback,
        mode: Mode,
    ) -> Result<()> {
        let name = name.into();

        match mode {
            Mode::Realtime => {
                let mut active = self.active.lock().await;
                if active.contains_key(&name) {
                    warn!(name = %name, "subscription already active, ignoring");
                    return Ok(());
                }

                let mut stream = collection.watch();
                let task_name = name.clone();
                let task = tokio::spawn(async move {
                    while let Some(snapshot) = stream.next().await {
                        callback(snapshot);
                    }
                    debug!(name = %task_name, "watch stream ended");
                });

                active.insert(name.clone(), SubscriptionHandle::new(name.clone(), task));
                info!(name = %name, "subscription activated");
                Ok(())
            }
            Mode::OneShot => {
                let snapshot = collection.fetch().await?;
                callback(snapshot);
                info!(name = %name, "one-shot fetch delivered");
                Ok(())
            }
        }
    }

    /// Deactivate the named subscription
    ///
    /// Idempotent: deactivating an absent name is a no-op. The handle is
    /// removed from the registry exactly once, then cancelled.
    pub async fn deactivate(&self, name: &str) {
        let handle = {
            let mut active = self.active.lock().await;
            active.remove(name)
        };
        if let Some(handle) = handle {
            handle.cancel();
            info!(name = %name, "subscription deactivated");
        }
    }

    /// Deactivate every tracked subscription
    ///
    /// Every entry is visited exactly once; order is not significant.
    pub async fn deactivate_all(&self) {
        let handles: Vec<SubscriptionHandle> = {
            let mut active = self.active.lock().await;
            active.drain().map(|(_, handle)| handle).collect()
        };
        let count = handles.len();
        for handle in handles {
            handle.cancel();
        }
        info!(count, "all subscriptions deactivated");
    }

    /// Load a static snapshot, fetching at most once per name
    ///
    /// The first call fetches and stores the raw snapshot — even an empty
    /// one — so later calls are served from cache until
    /// [`clear_cache`](Self::clear_cache) drops the entry. The cache lock
    /// is held across the fetch, so concurrent callers of the same name
    /// still produce a single fetch.
    pub async fn load_static(
        &self,
        name: impl Into<String>,
        collection: Arc<dyn Collection>,
    ) -> Result<Snapshot> {
        let name = name.into();
        let mut cache = self.static_cache.lock().await;

        if let Some(snapshot) = cache.get(&name) {
            debug!(name = %name, "static snapshot served from cache");
            return Ok(snapshot.clone());
        }

        let snapshot = collection.fetch().await?;
        cache.insert(name.clone(), snapshot.clone());
        info!(name = %name, "static snapshot loaded");
        Ok(snapshot)
    }

    /// Clear cached static snapshots
    ///
    /// `Some(name)` drops one entry; `None` drops them all. Cleared names
    /// re-fetch on their next [`load_static`](Self::load_static).
    pub async fn clear_cache(&self, name: Option<&str>) {
        let mut cache = self.static_cache.lock().await;
        match name {
            Some(name) => {
                cache.remove(name);
                debug!(name = %name, "static cache entry cleared");
            }
            None => {
                cache.clear();
                debug!("static cache cleared");
            }
        }
    }

    /// Names of all active realtime subscriptions
    pub async fn active_names(&self) -> Vec<String> {
        let active = self.active.lock().await;
        active.keys().cloned().collect()
    }

    /// Current usage counts, also logged at debug level
    pub async fn stats(&self) -> SubscriptionStats {
        let stats = SubscriptionStats {
            active: self.active.lock().await.len(),
            cached: self.static_cache.lock().await.len(),
        };
        debug!(active = stats.active, cached = stats.cached, "subscription stats");
        stats
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager").finish_non_exhaustive()
    }
}
