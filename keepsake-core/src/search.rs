//! Page-numbered search results.
//!
//! Unlike the feed, nothing accumulates here: every response replaces the whole
//! visible page and its [`PageInfo`]. Navigation is explicit, so the latest
//! request always wins and failures are handed back to the caller to show.

use tracing::{debug, warn};

use crate::api::{JournalApi, SearchQuery};
use crate::error::{Error, Result};
use crate::slot::{bind, Request, RequestSlot, Scope, Ticket};
use crate::types::{PageInfo, SearchHit, SearchPage};

/// Maximum number of page buttons shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Page indices to render as buttons around `current_page` (0-indexed).
///
/// The window is `PAGE_WINDOW` wide, centred on the current page where possible
/// and clamped to `0..total_pages`.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<u32> {
    let max_start = total_pages.saturating_sub(PAGE_WINDOW);
    let start = current_page.saturating_sub(2).min(max_start);
    let end = (start + PAGE_WINDOW).min(total_pages);
    (start..end).collect()
}

#[derive(Debug)]
pub struct SearchPaginator {
    /// Query that produced the displayed page. Navigation pages through this.
    query: String,
    /// A new search in flight; becomes `query` only once its page arrives.
    pending: Option<(Ticket, String)>,
    page: Option<SearchPage>,
    page_size: u32,
    slot: RequestSlot,
    scope: Scope,
}

impl SearchPaginator {
    pub fn new(page_size: u32, scope: Scope) -> Self {
        Self {
            query: String::new(),
            pending: None,
            page: None,
            page_size: page_size.max(1),
            slot: RequestSlot::new(),
            scope,
        }
    }

    /// Query of the page on screen.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query of a new search still waiting for its first page.
    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, query)| query.as_str())
    }

    pub fn results(&self) -> &[SearchHit] {
        self.page.as_ref().map(|p| p.results.as_slice()).unwrap_or_default()
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page.as_ref().map(|p| &p.page_info)
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_busy()
    }

    /// From the last response's `hasPrevious`, never recomputed locally.
    pub fn can_go_previous(&self) -> bool {
        self.page_info().is_some_and(|info| info.has_previous)
    }

    /// From the last response's `hasNext`, never recomputed locally.
    pub fn can_go_next(&self) -> bool {
        self.page_info().is_some_and(|info| info.has_next)
    }

    pub fn page_buttons(&self) -> Vec<u32> {
        self.page_info()
            .map(|info| page_window(info.current_page, info.total_pages))
            .unwrap_or_default()
    }

    /// Starts a new search at page 0, superseding anything in flight.
    pub fn begin_search(&mut self, query: &str) -> Request<SearchQuery> {
        let query = query.trim().to_owned();
        let request = self.slot.supersede(&self.scope, SearchQuery::new(query.clone(), 0, self.page_size));
        self.pending = Some((request.ticket, query));
        request
    }

    /// Requests `page` of the displayed query, superseding anything in flight,
    /// including a new search that has not answered yet.
    pub fn begin_page(&mut self, page: u32) -> Request<SearchQuery> {
        self.pending = None;
        let query = SearchQuery::new(self.query.clone(), page, self.page_size);
        self.slot.supersede(&self.scope, query)
    }

    /// Jumps to `page`, rejecting indices outside the last known `total_pages`.
    pub fn go_to(&mut self, page: u32) -> Result<Request<SearchQuery>> {
        if let Some(info) = self.page_info() {
            if page >= info.total_pages {
                return Err(Error::PageOutOfRange { page, total_pages: info.total_pages });
            }
        }
        Ok(self.begin_page(page))
    }

    pub fn go_next(&mut self) -> Option<Request<SearchQuery>> {
        if !self.can_go_next() {
            return None;
        }
        let next = self.page_info()?.current_page + 1;
        Some(self.begin_page(next))
    }

    pub fn go_previous(&mut self) -> Option<Request<SearchQuery>> {
        if !self.can_go_previous() {
            return None;
        }
        let prev = self.page_info()?.current_page.checked_sub(1)?;
        Some(self.begin_page(prev))
    }

    /// Applies a response.
    ///
    /// Returns `Ok(true)` when the page was replaced and `Ok(false)` for stale or
    /// cancelled completions.
    ///
    /// # Errors
    ///
    /// Returns the request's error when it failed; the previously displayed page
    /// stays visible.
    pub fn complete(&mut self, ticket: Ticket, result: Result<SearchPage>) -> Result<bool> {
        if !self.slot.finish(ticket) {
            debug!(ticket = ticket.get(), "discarding superseded search completion");
            return Ok(false);
        }
        let pending = self.pending.take().filter(|(pending, _)| *pending == ticket);
        match result {
            Ok(page) => {
                if let Some((_, query)) = pending {
                    self.query = query;
                }
                debug!(
                    query = %self.query,
                    page = page.page_info.current_page,
                    results = page.results.len(),
                    "search page replaced"
                );
                self.page = Some(page);
                Ok(true)
            }
            Err(e) if e.is_cancelled() => Ok(false),
            Err(e) => {
                let query = pending.map_or_else(|| self.query.clone(), |(_, query)| query);
                warn!(error = %e, query = %query, "search failed");
                Err(e)
            }
        }
    }

    /// Issues and awaits a request for `page` against `api`.
    pub async fn fetch_page<A: JournalApi>(&mut self, api: &A, page: u32) -> Result<bool> {
        let request = self.go_to(page)?;
        let result = bind(&request.token, api.search(&request.query)).await;
        self.complete(request.ticket, result)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.slot.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(page_window(0, 10), vec![0, 1, 2, 3, 4]);
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(9, 10), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(1, 3), vec![0, 1, 2]);
        assert!(page_window(0, 0).is_empty());
    }
}
