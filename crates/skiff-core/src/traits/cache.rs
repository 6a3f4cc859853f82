// # Cache Store Trait
//
// Defines the interface for named, versioned cache partitions.
//
// ## Purpose
//
// The fetch gateway stores response snapshots in two partitions: a
// long-lived one for build-time static assets and a short-lived one for
// dynamically discovered resources. Partition names carry the application
// version so a whole generation of cache can be discarded atomically on
// upgrade.
//
// A partition is a dumb bucket of (request identity → response snapshot)
// pairs. Policy decisions — what to store, which partition, when to
// invalidate — are owned by the gateway, never by the store.
//
// ## Implementations
//
// - In-memory: [`crate::cache::MemoryCacheStore`]
// - Disk-backed: [`crate::cache::DiskCacheStore`]

use async_trait::async_trait;

use crate::traits::network::{Request, Response};

/// Trait for cache partition store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Ensure a partition exists
    ///
    /// Opening an existing partition is a no-op.
    async fn open(&self, partition: &str) -> Result<(), crate::Error>;

    /// Look up a request in one partition
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Response))`: the stored snapshot
    /// - `Ok(None)`: no entry for this request identity (or no such partition)
    /// - `Err(Error)`: storage error
    async fn match_in(
        &self,
        partition: &str,
        req: &Request,
    ) -> Result<Option<Response>, crate::Error>;

    /// Look up a request across every partition
    ///
    /// Partitions are searched in unspecified order; the first hit wins.
    async fn match_any(&self, req: &Request) -> Result<Option<Response>, crate::Error>;

    /// Store a response snapshot under a request identity
    ///
    /// Creates the partition if it does not exist yet. An existing entry
    /// for the same identity is replaced.
    async fn put(
        &self,
        partition: &str,
        req: &Request,
        resp: &Response,
    ) -> Result<(), crate::Error>;

    /// Delete a whole partition
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: the partition existed and was deleted
    /// - `Ok(false)`: no such partition
    /// - `Err(Error)`: storage error
    async fn delete_partition(&self, partition: &str) -> Result<bool, crate::Error>;

    /// List the names of all partitions
    async fn list_partitions(&self) -> Result<Vec<String>, crate::Error>;
}
