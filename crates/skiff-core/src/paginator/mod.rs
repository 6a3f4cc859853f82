//! Paginator: a range cursor bound to a collection
//!
//! The paginator owns the I/O half of pagination: it asks the cursor for
//! query parameters, runs the query against its [`Collection`], and feeds
//! the result back into the cursor. The cursor is only mutated after a
//! query succeeds, so a failed load leaves the paginator exactly where it
//! was and a retry is always safe.
//!
//! ## Event Flow
//!
//! 1. Caller requests a page
//! 2. Cursor produces the bounded `page_size + 1` query
//! 3. Query runs against the collection
//! 4. Cursor consumes the result, trims the sentinel
//! 5. Trimmed page returns to the caller

pub mod registry;

pub use registry::PaginatorRegistry;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cursor::{CursorState, RangeCursor};
use crate::error::Result;
use crate::traits::{Collection, Entry};

/// Default page size when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Pages through one ordered collection in both directions
///
/// ## Concurrency
///
/// The cursor sits behind a mutex held across each load, so overlapping
/// page requests against the same paginator serialize instead of racing
/// cursor state. Callers should still gate their UI on one in-flight load
/// per view; queued loads observe the boundaries left by the previous one.
pub struct Paginator {
    collection: Arc<dyn Collection>,
    cursor: Mutex<RangeCursor>,
    page_size: usize,
}

impl Paginator {
    /// Create a paginator over a collection
    ///
    /// `page_size` must be positive.
    pub fn new(collection: Arc<dyn Collection>, page_size: usize) -> Self {
        Self {
            collection,
            cursor: Mutex::new(RangeCursor::new(page_size)),
            page_size,
        }
    }

    /// The fixed page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Load the next (older) page
    ///
    /// Returns an empty page without touching the store when forward paging
    /// is exhausted. The lookahead sentinel is never part of the result.
    ///
    /// # Errors
    ///
    /// Query failures propagate unchanged; the cursor is not modified on
    /// failure.
    pub async fn load_next_page(&self) -> Result<Vec<Entry>> {
        let mut cursor = self.cursor.lock().await;
        if !cursor.has_more() {
            debug!("no more pages");
            return Ok(Vec::new());
        }

        let query = cursor.next_query();
        let entries = self.collection.get_range(&query).await?;
        Ok(cursor.advance(entries))
    }

    /// Load the previous (newer) page
    ///
    /// Returns an empty page without touching the store when there is no
    /// previous page recorded.
    pub async fn load_previous_page(&self) -> Result<Vec<Entry>> {
        let mut cursor = self.cursor.lock().await;
        let Some(query) = cursor.previous_query() else {
            debug!("no previous pages");
            return Ok(Vec::new());
        };

        let entries = self.collection.get_range(&query).await?;
        Ok(cursor.retreat(entries))
    }

    /// Reset and load the first page
    ///
    /// Idempotent re-entry point: after any sequence of loads this behaves
    /// exactly like the first `load_next_page` on a fresh paginator.
    pub async fn load_first_page(&self) -> Result<Vec<Entry>> {
        self.cursor.lock().await.reset();
        self.load_next_page().await
    }

    /// Total number of entries in the collection
    ///
    /// Issues one count query on first use and caches the result until the
    /// next reset. Never refreshed automatically.
    pub async fn total_count(&self) -> Result<usize> {
        {
            let cursor = self.cursor.lock().await;
            if let Some(total) = cursor.total_count() {
                return Ok(total);
            }
        }

        // Count query runs outside the cursor lock; only the cached value
        // needs the lock.
        let total = self.collection.count().await?;
        self.cursor.lock().await.cache_total(total);
        Ok(total)
    }

    /// Return the cursor to its initial state
    ///
    /// The binding to the collection is kept.
    pub async fn reset(&self) {
        self.cursor.lock().await.reset();
    }

    /// Immutable snapshot of the cursor state
    pub async fn state(&self) -> CursorState {
        self.cursor.lock().await.state()
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
