// # Memory Collection
//
// In-memory implementation of the Collection trait.
//
// ## Purpose
//
// Provides an ordered collection that lives entirely in process memory.
// Useful for tests, demos, and embedders that want the pagination and
// subscription machinery over local data.
//
// ## Ordering
//
// Entries are held in a BTreeMap, so range queries see ascending key
// order with no extra sorting.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use crate::Error;
use crate::traits::{Collection, Entry, RangeQuery, Snapshot};

/// In-memory ordered collection with change notifications
///
/// Cloning the handle is cheap and shares the underlying data. Locks are
/// never held across a suspend point, so the std RwLock is safe here and
/// `watch()` can stay synchronous.
///
/// # Example
///
/// ```rust,no_run
/// use skiff_core::store::MemoryCollection;
/// use skiff_core::traits::{Collection, RangeQuery};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let collection = MemoryCollection::new();
///     collection.insert("msg-001", serde_json::json!({"text": "hi"}));
///
///     let entries = collection.get_range(&RangeQuery::last(10)).await?;
///     assert_eq!(entries.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<RwLock<BTreeMap<String, Value>>>,
    watchers: Arc<RwLock<Vec<mpsc::UnboundedSender<Snapshot>>>>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection from existing entries
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let collection = Self::new();
        collection.inner.write().unwrap().extend(entries);
        collection
    }

    /// Insert or replace an entry, notifying watchers
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        let snapshot = {
            let mut map = self.inner.write().unwrap();
            map.insert(key.into(), value);
            Self::snapshot_of(&map)
        };
        self.notify(snapshot);
    }

    /// Remove an entry, notifying watchers if it existed
    pub fn remove(&self, key: &str) -> Option<Value> {
        let (removed, snapshot) = {
            let mut map = self.inner.write().unwrap();
            let removed = map.remove(key);
            (removed, Self::snapshot_of(&map))
        };
        if removed.is_some() {
            self.notify(snapshot);
        }
        removed
    }

    /// Remove every entry, notifying watchers
    pub fn clear(&self) {
        let snapshot = {
            let mut map = self.inner.write().unwrap();
            map.clear();
            Self::snapshot_of(&map)
        };
        self.notify(snapshot);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    fn snapshot_of(map: &BTreeMap<String, Value>) -> Snapshot {
        if map.is_empty() {
            return Snapshot::empty();
        }
        let object: serde_json::Map<String, Value> =
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Snapshot::new(Value::Object(object))
    }

    fn notify(&self, snapshot: Snapshot) {
        let mut watchers = self.watchers.write().unwrap();
        watchers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        trace!(watchers = watchers.len(), "collection change broadcast");
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn get_range(&self, query: &RangeQuery) -> Result<Vec<Entry>, Error> {
        let map = self.inner.read().unwrap();

        let mut entries: Vec<Entry> = map
            .iter()
            .filter(|(key, _)| {
                query.start_after.as_ref().is_none_or(|bound| *key > bound)
                    && query.end_before.as_ref().is_none_or(|bound| *key < bound)
            })
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect();

        if let Some(n) = query.limit_to_first {
            entries.truncate(n);
        } else if let Some(n) = query.limit_to_last {
            if entries.len() > n {
                entries.drain(..entries.len() - n);
            }
        }

        Ok(entries)
    }

    async fn fetch(&self) -> Result<Snapshot, Error> {
        let map = self.inner.read().unwrap();
        Ok(Self::snapshot_of(&map))
    }

    async fn count(&self) -> Result<usize, Error> {
        Ok(self.inner.read().unwrap().len())
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = Snapshot> + Send + 'static>> {
        let (tx, rx) = mpsc::unbounded_channel();

        // New watchers see the current value immediately, then every change.
        let current = {
            let map = self.inner.read().unwrap();
            Self::snapshot_of(&map)
        };
        let _ = tx.send(current);

        self.watchers.write().unwrap().push(tx);
        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

impl std::fmt::Debug for MemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCollection").finish_non_exhaustive()
    }
}
