//! Pagination state machine
//!
//! [`RangeCursor`] tracks the boundaries of a paged walk over an ordered
//! collection. It is pure state: it never performs I/O and never sees the
//! collection itself. The [`Paginator`](crate::paginator::Paginator) asks it
//! for the next query to run, executes the query, and feeds the result back.
//!
//! ## The lookahead sentinel
//!
//! Every page load fetches `page_size + 1` entries. The extra entry proves
//! the existence of a further page without a separate count query; it is
//! trimmed by [`split_lookahead`] and never surfaced to the caller.
//!
//! ## Key convention
//!
//! Pages are served newest-first (`limit_to_last`). After every successful
//! load the boundary keys describe exactly the current page:
//!
//! - `last_key` — oldest key of the current page; the next (older) page is
//!   everything strictly before it.
//! - `first_key` — newest key of the current page; the previous (newer)
//!   page starts strictly after it.
//!
//! Boundary keys are taken from the returned page in both directions, never
//! from the sentinel. Taking them from the sentinel re-fetches the sentinel
//! as part of the next page and duplicates it across pages.

use serde::{Deserialize, Serialize};

use crate::traits::{Entry, RangeQuery};

/// Which end of a fetched batch holds the lookahead sentinel
///
/// Range results arrive in ascending key order regardless of paging
/// direction, so the sentinel sits at the oldest end when paging toward
/// older entries and at the newest end when paging back toward newer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelEnd {
    /// The first (oldest) fetched entry is the sentinel
    Oldest,
    /// The last (newest) fetched entry is the sentinel
    Newest,
}

/// Split a `page_size + 1` fetch into a page and a has-more flag
///
/// Returns the page (at most `page_size` entries, sentinel trimmed) and
/// whether more data exists beyond it.
pub fn split_lookahead(
    mut entries: Vec<Entry>,
    page_size: usize,
    sentinel: SentinelEnd,
) -> (Vec<Entry>, bool) {
    if entries.len() <= page_size {
        return (entries, false);
    }

    match sentinel {
        SentinelEnd::Oldest => {
            entries.remove(0);
        }
        SentinelEnd::Newest => {
            entries.truncate(page_size);
        }
    }
    (entries, true)
}

/// Immutable snapshot of a cursor's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    /// 1-based index of the current page (0 before any load)
    pub page_index: u64,
    /// Page size the cursor was created with
    pub page_size: usize,
    /// Whether an older page exists
    pub has_more: bool,
    /// Whether a newer page exists (false on the first page)
    pub has_previous: bool,
    /// Newest key of the current page
    pub first_key: Option<String>,
    /// Oldest key of the current page
    pub last_key: Option<String>,
    /// Cached total entry count, if one was fetched
    pub total_count: Option<usize>,
}

/// Pagination state machine over an ordered collection
///
/// ## States
///
/// `INITIAL` (no keys, `has_more = true`, `has_previous = false`) moves
/// forward on [`advance`](Self::advance), back toward the newest page on
/// [`retreat`](Self::retreat), and back to `INITIAL` on
/// [`reset`](Self::reset) from anywhere.
///
/// The cursor has single-writer discipline: interleaving two loads against
/// the same cursor races its boundary keys. The paginator serializes loads
/// behind a lock.
#[derive(Debug, Clone)]
pub struct RangeCursor {
    page_size: usize,
    first_key: Option<String>,
    last_key: Option<String>,
    has_more: bool,
    has_previous: bool,
    page_index: u64,
    total_count: Option<usize>,
}

impl RangeCursor {
    /// Create a cursor in the `INITIAL` state
    ///
    /// `page_size` must be positive; it is fixed for the cursor's lifetime.
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size > 0, "page_size must be positive");
        Self {
            page_size,
            first_key: None,
            last_key: None,
            has_more: true,
            has_previous: false,
            page_index: 0,
            total_count: None,
        }
    }

    /// The fixed page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether an older page exists
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a newer page exists
    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// The query that fetches the next (older) page plus its sentinel
    pub fn next_query(&self) -> RangeQuery {
        let query = RangeQuery::last(self.page_size + 1);
        match &self.last_key {
            Some(key) => query.with_end_before(key.clone()),
            None => query,
        }
    }

    /// The query that fetches the previous (newer) page plus its sentinel
    ///
    /// Returns `None` when there is no previous page to go back to.
    pub fn previous_query(&self) -> Option<RangeQuery> {
        if !self.has_previous {
            return None;
        }
        let first_key = self.first_key.as_ref()?;
        Some(RangeQuery::first(self.page_size + 1).with_start_after(first_key.clone()))
    }

    /// Consume a forward fetch and return the trimmed page
    ///
    /// `entries` must be the ascending result of [`next_query`](Self::next_query),
    /// so at most `page_size + 1` entries. The sentinel (oldest fetched
    /// entry) is trimmed and never returned.
    pub fn advance(&mut self, entries: Vec<Entry>) -> Vec<Entry> {
        let (page, more) = split_lookahead(entries, self.page_size, SentinelEnd::Oldest);

        self.has_more = more;
        if let (Some(oldest), Some(newest)) = (page.first(), page.last()) {
            self.last_key = Some(oldest.key.clone());
            self.first_key = Some(newest.key.clone());
            self.page_index += 1;
        }
        self.has_previous = self.page_index > 1;

        page
    }

    /// Consume a backward fetch and return the trimmed page
    ///
    /// `entries` must be the ascending result of
    /// [`previous_query`](Self::previous_query). The sentinel (newest
    /// fetched entry) is trimmed and never returned. An empty result leaves
    /// everything but `has_previous` untouched.
    pub fn retreat(&mut self, entries: Vec<Entry>) -> Vec<Entry> {
        let (page, more) = split_lookahead(entries, self.page_size, SentinelEnd::Newest);

        if page.is_empty() {
            self.has_previous = false;
            return page;
        }

        self.has_previous = more;
        // The page we retreated from is still out there, older than us.
        self.has_more = true;
        if let (Some(oldest), Some(newest)) = (page.first(), page.last()) {
            self.last_key = Some(oldest.key.clone());
            self.first_key = Some(newest.key.clone());
        }
        self.page_index = self.page_index.saturating_sub(1);

        page
    }

    /// Return the cursor to `INITIAL`
    ///
    /// Clears boundary keys, flags, the page index and the cached total.
    /// The binding to the collection (held by the paginator) survives.
    pub fn reset(&mut self) {
        self.first_key = None;
        self.last_key = None;
        self.has_more = true;
        self.has_previous = false;
        self.page_index = 0;
        self.total_count = None;
    }

    /// The cached total count, if one was stored
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Cache a total count until the next reset
    pub fn cache_total(&mut self, total: usize) {
        self.total_count = Some(total);
    }

    /// Immutable snapshot of the cursor fields
    pub fn state(&self) -> CursorState {
        CursorState {
            page_index: self.page_index,
            page_size: self.page_size,
            has_more: self.has_more,
            has_previous: self.has_previous,
            first_key: self.first_key.clone(),
            last_key: self.last_key.clone(),
            total_count: self.total_count,
        }
    }
}
