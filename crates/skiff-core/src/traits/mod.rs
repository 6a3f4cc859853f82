//! Core traits for the skiff data-access layer
//!
//! This module defines the abstract interfaces the subsystems are built
//! against.
//!
//! - [`Collection`]: one ordered remote collection (range queries, one-shot
//!   fetch, count, change subscriptions)
//! - [`CacheStore`]: named, versioned cache partitions of response snapshots
//! - [`Network`]: outbound transport for the fetch gateway

pub mod cache;
pub mod collection;
pub mod network;

pub use cache::CacheStore;
pub use collection::{ChangeCallback, Collection, Entry, RangeQuery, Snapshot};
pub use network::{Method, Network, Request, Response};
