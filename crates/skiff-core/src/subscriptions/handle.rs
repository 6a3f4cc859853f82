//! Cancellable subscription handles

use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to one active realtime subscription
///
/// The handle owns the forwarding task that drives the collection's watch
/// stream into the subscriber callback. Cancelling (or dropping) the handle
/// aborts the task and releases the watch stream; the manager removes the
/// handle from its registry exactly once, at cancellation.
#[derive(Debug)]
pub struct SubscriptionHandle {
    name: String,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub(crate) fn new(name: String, task: JoinHandle<()>) -> Self {
        Self { name, task }
    }

    /// The logical name this subscription is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop delivering snapshots
    pub(crate) fn cancel(self) {
        self.task.abort();
        debug!(name = %self.name, "subscription cancelled");
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        // A handle that falls out of the registry must not leak its task.
        self.task.abort();
    }
}
