// # Collection Trait
//
// Defines the interface to one ordered remote collection.
//
// A collection is an ordered mapping from string keys to JSON values that
// supports bounded range queries, a one-shot fetch, a count operation, and
// change subscriptions. The wire protocol behind it is deliberately out of
// scope: implementations may sit on top of a realtime database, a REST
// endpoint, or an in-memory map.
//
// ## Implementations
//
// - In-memory: [`crate::store::MemoryCollection`] (tests, embedding)
// - REST-backed: `skiff-http` crate
//
// ## Usage
//
// ```rust,ignore
// use skiff_core::traits::{Collection, RangeQuery};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let collection = /* Collection implementation */;
//
//     // Fetch the newest 21 entries
//     let entries = collection.get_range(&RangeQuery::last(21)).await?;
//
//     // Watch for changes
//     let mut stream = collection.watch();
//     while let Some(snapshot) = stream.next().await {
//         println!("collection changed: {:?}", snapshot);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// One key-value pair from an ordered collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The entry key (unique within the collection)
    pub key: String,
    /// The entry value
    pub value: Value,
}

impl Entry {
    /// Create a new entry
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A bounded range query against an ordered collection
///
/// Bounds compose: `start_after`/`end_before` restrict the key range first,
/// then `limit_to_first`/`limit_to_last` keep the first or last N entries of
/// whatever remains. Results are always returned in ascending key order.
///
/// At most one of `limit_to_first`/`limit_to_last` should be set; if both
/// are, implementations apply `limit_to_first`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Keep only the first N entries of the bounded range
    pub limit_to_first: Option<usize>,
    /// Keep only the last N entries of the bounded range
    pub limit_to_last: Option<usize>,
    /// Exclusive lower key bound
    pub start_after: Option<String>,
    /// Exclusive upper key bound
    pub end_before: Option<String>,
}

impl RangeQuery {
    /// Query for the first `n` entries of the collection
    pub fn first(n: usize) -> Self {
        Self {
            limit_to_first: Some(n),
            ..Self::default()
        }
    }

    /// Query for the last `n` entries of the collection
    pub fn last(n: usize) -> Self {
        Self {
            limit_to_last: Some(n),
            ..Self::default()
        }
    }

    /// Bound the range to keys strictly greater than `key`
    pub fn with_start_after(mut self, key: impl Into<String>) -> Self {
        self.start_after = Some(key.into());
        self
    }

    /// Bound the range to keys strictly less than `key`
    pub fn with_end_before(mut self, key: impl Into<String>) -> Self {
        self.end_before = Some(key.into());
        self
    }
}

/// A whole-collection snapshot delivered to subscribers and one-shot fetches
///
/// `value` is `None` when the collection is empty or absent on the remote
/// side. Snapshots are plain data: cloning one never re-contacts the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The collection value, or `None` if empty/absent
    pub value: Option<Value>,
}

impl Snapshot {
    /// Create a snapshot holding a value
    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }

    /// Create an empty snapshot
    pub fn empty() -> Self {
        Self { value: None }
    }

    /// Whether this snapshot holds no value
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Callback invoked with each snapshot delivered by a subscription
pub type ChangeCallback = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// Trait for ordered remote collection implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// A `Collection` value is a handle to exactly one logical collection;
/// callers hold one handle per collection they page or subscribe over.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Execute a bounded range query
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Entry>)`: the matching entries in ascending key order
    /// - `Err(Error)`: if the query failed
    async fn get_range(&self, query: &RangeQuery) -> Result<Vec<Entry>, crate::Error>;

    /// Fetch the whole collection once
    ///
    /// # Returns
    ///
    /// - `Ok(Snapshot)`: the current snapshot (empty if the collection is absent)
    /// - `Err(Error)`: if the fetch failed
    async fn fetch(&self) -> Result<Snapshot, crate::Error>;

    /// Count the entries in the collection
    async fn count(&self) -> Result<usize, crate::Error>;

    /// Watch for changes
    ///
    /// Returns a stream that yields a [`Snapshot`] for every mutation of the
    /// collection.
    ///
    /// # Behavior
    ///
    /// - Must yield the current snapshot immediately when first polled
    /// - Must yield a new snapshot after every subsequent mutation
    /// - Must be cancellation-safe (dropping the stream cleans up resources)
    fn watch(&self) -> Pin<Box<dyn Stream<Item = Snapshot> + Send + 'static>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_query_builders_compose() {
        let query = RangeQuery::last(21).with_end_before("k100");
        assert_eq!(query.limit_to_last, Some(21));
        assert_eq!(query.end_before.as_deref(), Some("k100"));
        assert_eq!(query.limit_to_first, None);
        assert_eq!(query.start_after, None);

        let query = RangeQuery::first(5).with_start_after("a");
        assert_eq!(query.limit_to_first, Some(5));
        assert_eq!(query.start_after.as_deref(), Some("a"));
    }

    #[test]
    fn snapshot_emptiness() {
        assert!(Snapshot::empty().is_empty());
        assert!(!Snapshot::new(serde_json::json!({"a": 1})).is_empty());
    }
}
