//! Named registry of paginators
//!
//! The registry guarantees one paginator instance per logical collection
//! view: every caller asking for the same name gets the same instance, so
//! cursor state survives across UI navigation.
//!
//! The registry is an explicit context object owned by the composing
//! application — construct one, share it, drop it — rather than an ambient
//! global. Tests get isolation for free.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skiff_core::paginator::PaginatorRegistry;
//!
//! let registry = PaginatorRegistry::new();
//! let messages = registry.get("messages", collection, 20).await;
//! let page = messages.load_next_page().await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::paginator::Paginator;
use crate::traits::Collection;

/// Factory and cache of named [`Paginator`] instances
#[derive(Default)]
pub struct PaginatorRegistry {
    paginators: Mutex<HashMap<String, Arc<Paginator>>>,
}

impl PaginatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the paginator for a name
    ///
    /// The first call for a name constructs the paginator from `collection`
    /// and `page_size`; construction parameters on later calls for the same
    /// name are ignored (first-writer-wins). This is a documented
    /// simplification, not an update path — use [`remove`](Self::remove)
    /// and re-`get` to rebind a name.
    pub async fn get(
        &self,
        name: impl Into<String>,
        collection: Arc<dyn Collection>,
        page_size: usize,
    ) -> Arc<Paginator> {
        let name = name.into();
        let mut paginators = self.paginators.lock().await;
        paginators
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(name = %name, page_size, "paginator created");
                Arc::new(Paginator::new(collection, page_size))
            })
            .clone()
    }

    /// Reset the named paginator to its initial state
    ///
    /// Idempotent no-op when the name is absent.
    pub async fn reset(&self, name: &str) {
        let paginator = {
            let paginators = self.paginators.lock().await;
            paginators.get(name).cloned()
        };
        if let Some(paginator) = paginator {
            paginator.reset().await;
            debug!(name = %name, "paginator reset");
        }
    }

    /// Remove the named paginator
    ///
    /// Idempotent no-op when the name is absent.
    pub async fn remove(&self, name: &str) {
        let mut paginators = self.paginators.lock().await;
        if paginators.remove(name).is_some() {
            debug!(name = %name, "paginator removed");
        }
    }

    /// Reset every registered paginator without removing any binding
    pub async fn reset_all(&self) {
        let paginators: Vec<Arc<Paginator>> = {
            let map = self.paginators.lock().await;
            map.values().cloned().collect()
        };
        for paginator in paginators {
            paginator.reset().await;
        }
        debug!("all paginators reset");
    }

    /// Names of all registered paginators
    pub async fn names(&self) -> Vec<String> {
        let paginators = self.paginators.lock().await;
        paginators.keys().cloned().collect()
    }

    /// Number of registered paginators
    pub async fn len(&self) -> usize {
        self.paginators.lock().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.paginators.lock().await.is_empty()
    }
}
