// # skiff-core
//
// Core library for the skiff client-side data-access layer.
//
// Skiff sits between a UI and a remote ordered key-value store that
// exposes realtime change notifications. It solves three coupled
// problems:
//
// - **Pagination**: page through an ordered remote collection in both
//   directions without re-fetching already-seen data (`RangeCursor`,
//   `Paginator`, `PaginatorRegistry`)
// - **Subscriptions**: manage realtime subscription lifecycles so the
//   same logical stream is never double-subscribed and can be cleanly
//   torn down (`SubscriptionManager`)
// - **Cache policy**: decide, per requested resource, which caching
//   strategy applies at the network-intercept layer (`FetchGateway`)
//
// ## Architecture Overview
//
// - **Collection**: trait for one ordered remote collection (range
//   queries, one-shot fetch, count, change subscriptions)
// - **CacheStore**: trait for named, versioned cache partitions
// - **Network**: trait for the outbound transport behind the gateway
// - **RangeCursor**: pure pagination state machine (fetch N+1, return N)
// - **Paginator / PaginatorRegistry**: cursor bound to a collection; one
//   instance per logical view
// - **SubscriptionManager**: at-most-one realtime subscription per name,
//   plus a fetch-once static snapshot cache
// - **FetchGateway**: ordered rule table choosing bypass, static-first,
//   stale-while-revalidate or network-first per request
//
// ## Design Principles
//
// 1. **Separation of Concerns**: policy lives in this crate, transports
//    and stores live behind traits
// 2. **Explicit Context**: registries and managers are owned objects the
//    application constructs, never ambient globals
// 3. **Single-Writer Cursors**: page loads on one paginator serialize;
//    failed loads leave the cursor untouched so retries are safe
// 4. **Never Crash the Boundary**: every cache branch in the gateway
//    degrades to pass-through or a logged no-op

pub mod cache;
pub mod config;
pub mod cursor;
pub mod error;
pub mod paginator;
pub mod policy;
pub mod store;
pub mod subscriptions;
pub mod traits;

// Re-export core types for convenience
pub use cache::{DiskCacheStore, MemoryCacheStore};
pub use config::{GatewayConfig, PaginationConfig, SkiffConfig};
pub use cursor::{CursorState, RangeCursor, SentinelEnd, split_lookahead};
pub use error::{Error, Result};
pub use paginator::{DEFAULT_PAGE_SIZE, Paginator, PaginatorRegistry};
pub use policy::{ControlMessage, FetchGateway, GatewayEvent, RuleSet, Strategy};
pub use store::MemoryCollection;
pub use subscriptions::{Mode, SubscriptionManager};
pub use traits::{
    CacheStore, ChangeCallback, Collection, Entry, Method, Network, RangeQuery, Request,
    Response, Snapshot,
};
