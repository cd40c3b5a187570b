//! Cursor-paginated memory feed.
//!
//! The feed grows append-only. Each request asks for up to `page_size` memories
//! older than the lowest id seen so far (`lastId`); the first request omits the cursor. A page
//! shorter than `page_size` marks the end of the feed and `has_more` never turns
//! back on for the lifetime of this instance.
//!
//! Failures are logged and swallowed: the list and `has_more` stay as they were
//! and the next qualifying scroll retries.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::{FeedQuery, JournalApi};
use crate::error::Result;
use crate::slot::{bind, Request, RequestSlot, Scope, Ticket};
use crate::types::{FeedItem, ItemId};
use crate::visibility::LoadMore;

/// What a completion did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The page was merged. `skipped` counts items already present.
    Appended { added: usize, skipped: usize },
    /// The request failed; nothing changed.
    Failed,
    /// The completion belonged to a request that is no longer current.
    Stale,
    /// No request was issued: one is in flight or the feed is exhausted.
    Skipped,
}

#[derive(Debug)]
pub struct CursorFeed {
    items: Vec<FeedItem>,
    seen: HashSet<ItemId>,
    /// Lowest id the server has returned so far, repeats included.
    cursor: Option<ItemId>,
    page_size: u32,
    has_more: bool,
    initial_load: bool,
    slot: RequestSlot,
    scope: Scope,
}

impl CursorFeed {
    pub fn new(page_size: u32, scope: Scope) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            page_size: page_size.max(1),
            has_more: true,
            initial_load: true,
            slot: RequestSlot::new(),
            scope,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&FeedItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// True until the first page has completed, successfully or not.
    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }

    /// The id the next request will send as `lastId`.
    ///
    /// Follows the raw pages rather than the deduplicated list, so a page made
    /// only of repeats still moves the feed forward.
    pub fn cursor(&self) -> Option<ItemId> {
        self.cursor
    }

    /// Admits the next page request, or `None` if one is already in flight or
    /// the feed is exhausted. Guard and mark happen together.
    pub fn begin_fetch(&mut self) -> Option<Request<FeedQuery>> {
        if !self.has_more {
            return None;
        }
        let query = FeedQuery { size: self.page_size, last_id: self.cursor() };
        self.slot.try_begin(&self.scope, query)
    }

    /// Applies the response to the request identified by `ticket`.
    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<FeedItem>>) -> FeedOutcome {
        if !self.slot.finish(ticket) {
            debug!(ticket = ticket.get(), "discarding stale feed completion");
            return FeedOutcome::Stale;
        }
        self.initial_load = false;

        let page = match result {
            Ok(page) => page,
            Err(e) if e.is_cancelled() => {
                debug!("feed request cancelled");
                return FeedOutcome::Failed;
            }
            Err(e) => {
                warn!(error = %e, cursor = ?self.cursor(), "feed page failed to load");
                return FeedOutcome::Failed;
            }
        };

        // Shorter than requested means the server has nothing older.
        if page.len() < self.page_size as usize {
            self.has_more = false;
        }

        if let Some(lowest) = page.iter().map(|item| item.id).min() {
            self.cursor = Some(self.cursor.map_or(lowest, |current| current.min(lowest)));
        }

        let returned = page.len();
        let mut added = 0;
        for item in page {
            if self.seen.insert(item.id) {
                self.items.push(item);
                added += 1;
            }
        }
        let skipped = returned - added;
        if skipped > 0 {
            warn!(skipped, "feed page repeated memories already in the list");
        }
        debug!(added, total = self.items.len(), has_more = self.has_more, "feed page merged");
        FeedOutcome::Appended { added, skipped }
    }

    /// Issues and awaits the next page against `api`.
    pub async fn fetch_next<A: JournalApi>(&mut self, api: &A) -> FeedOutcome {
        let Some(request) = self.begin_fetch() else {
            return FeedOutcome::Skipped;
        };
        let result = bind(&request.token, api.feed(&request.query)).await;
        self.complete(request.ticket, result)
    }

    /// Cancels anything in flight. The list itself is kept until the feed is dropped.
    pub fn cancel(&mut self) {
        self.slot.reset();
    }
}

impl LoadMore for CursorFeed {
    type Query = FeedQuery;

    fn can_load_more(&self) -> bool {
        !self.is_loading() && self.has_more && !self.initial_load
    }

    fn begin_load_more(&mut self) -> Option<Request<FeedQuery>> {
        if self.initial_load {
            return None;
        }
        self.begin_fetch()
    }
}
