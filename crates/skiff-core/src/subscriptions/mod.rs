//! Realtime subscriptions and the one-shot static cache
//!
//! - [`SubscriptionManager`]: tracks active change subscriptions by logical
//!   name (at most one per name) and a fetch-once cache of static snapshots
//! - [`SubscriptionHandle`]: cancellable handle to one forwarding task

pub mod handle;
pub mod manager;

pub use handle::SubscriptionHandle;
pub use manager::{Mode, SubscriptionManager, SubscriptionStats};
