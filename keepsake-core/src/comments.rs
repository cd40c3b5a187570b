//! Two-level comment thread for a single memory.
//!
//! ```text
//! Collapsed --expand--> Loading --page 0--> Loaded --load_more--> LoadingMore
//!     ^                                       |  ^                      |
//!     +---------------collapse----------------+  +-------page n---------+
//! ```
//!
//! Page 0 replaces the list, later pages append to the tail. Replies arrive
//! embedded in their parent and are never paginated on their own. New top-level
//! comments are prepended, new replies appended to their parent.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::{CommentQuery, JournalApi};
use crate::error::{Error, Result};
use crate::slot::{bind, Request, RequestSlot, Scope, Ticket};
use crate::types::{CommentId, CommentNode, CommentPage, ItemId, NewComment};
use crate::visibility::LoadMore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadPhase {
    #[default]
    Collapsed,
    Loading,
    Loaded,
    LoadingMore,
}

/// Result of applying a page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied,
    Failed,
    Stale,
}

/// Where a newly created comment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedOutcome {
    /// New top-level comment, now first in the list.
    Prepended,
    /// Reply appended under `parent`.
    Appended { parent: CommentId },
    /// The parent is not in the loaded pages. The reply exists on the server but
    /// is not shown until a reload brings the parent in.
    ParentNotLoaded { parent: CommentId },
    /// The thread was collapsed while the submission was in flight.
    Discarded,
}

#[derive(Debug)]
pub struct CommentThread {
    content_id: ItemId,
    page_size: u32,
    phase: ThreadPhase,
    comments: Vec<CommentNode>,
    total_count: u64,
    current_page: u32,
    has_next: bool,
    /// Page the in-flight request asked for.
    requested_page: u32,
    slot: RequestSlot,
    scope: Scope,
}

impl CommentThread {
    pub fn new(content_id: ItemId, page_size: u32, scope: Scope) -> Self {
        Self {
            content_id,
            page_size: page_size.max(1),
            phase: ThreadPhase::Collapsed,
            comments: Vec::new(),
            total_count: 0,
            current_page: 0,
            has_next: false,
            requested_page: 0,
            slot: RequestSlot::new(),
            scope,
        }
    }

    pub fn content_id(&self) -> ItemId {
        self.content_id
    }

    pub fn phase(&self) -> ThreadPhase {
        self.phase
    }

    pub fn comments(&self) -> &[CommentNode] {
        &self.comments
    }

    /// Top-level comments plus all replies, as last reported by the server and
    /// adjusted for comments created locally since.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        self.comments
            .iter()
            .find_map(|c| if c.id == id { Some(c) } else { c.children.iter().find(|r| r.id == id) })
    }

    /// Opens the thread and requests page 0. Only valid while collapsed.
    pub fn expand(&mut self) -> Option<Request<CommentQuery>> {
        if self.phase != ThreadPhase::Collapsed {
            return None;
        }
        let request = self.begin_page(0)?;
        self.phase = ThreadPhase::Loading;
        Some(request)
    }

    /// Re-requests page 0 of a loaded thread. The response replaces the list.
    pub fn reload(&mut self) -> Option<Request<CommentQuery>> {
        if self.phase != ThreadPhase::Loaded {
            return None;
        }
        let request = self.begin_page(0)?;
        self.phase = ThreadPhase::Loading;
        Some(request)
    }

    /// Requests the page after the last one loaded, if the server said there is one.
    pub fn load_more(&mut self) -> Option<Request<CommentQuery>> {
        if self.phase != ThreadPhase::Loaded || !self.has_next {
            return None;
        }
        let request = self.begin_page(self.current_page + 1)?;
        self.phase = ThreadPhase::LoadingMore;
        Some(request)
    }

    /// Discards all loaded state and cancels any in-flight page request.
    pub fn collapse(&mut self) {
        self.slot.reset();
        self.phase = ThreadPhase::Collapsed;
        self.comments.clear();
        self.total_count = 0;
        self.current_page = 0;
        self.has_next = false;
    }

    fn begin_page(&mut self, page: u32) -> Option<Request<CommentQuery>> {
        let query = CommentQuery { content_id: self.content_id, page, size: self.page_size };
        let request = self.slot.try_begin(&self.scope, query)?;
        self.requested_page = page;
        Some(request)
    }

    /// Applies a page response.
    pub fn complete_page(&mut self, ticket: Ticket, result: Result<CommentPage>) -> PageOutcome {
        if !self.slot.finish(ticket) {
            debug!(content_id = self.content_id, "discarding stale comment page");
            return PageOutcome::Stale;
        }
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                if !e.is_cancelled() {
                    warn!(error = %e, content_id = self.content_id, page = self.requested_page, "comment page failed");
                }
                self.phase = match self.phase {
                    // Nothing usable was shown yet; let the user expand again.
                    ThreadPhase::Loading if self.comments.is_empty() => ThreadPhase::Collapsed,
                    _ => ThreadPhase::Loaded,
                };
                return PageOutcome::Failed;
            }
        };

        let incoming: Vec<CommentNode> = page.comments.into_iter().map(normalize_top_level).collect();
        if self.requested_page == 0 {
            self.comments = incoming;
        } else {
            let known: HashSet<CommentId> = self.comments.iter().map(|c| c.id).collect();
            // Comments prepended locally shift the server's offsets, so a later page
            // can repeat the tail of the previous one.
            self.comments.extend(incoming.into_iter().filter(|c| !known.contains(&c.id)));
        }
        self.total_count = page.total_count;
        self.current_page = page.current_page;
        self.has_next = page.has_next;
        self.phase = ThreadPhase::Loaded;
        debug!(
            content_id = self.content_id,
            page = self.current_page,
            shown = self.comments.len(),
            total = self.total_count,
            "comment page applied"
        );
        PageOutcome::Applied
    }

    /// Builds a top-level comment submission.
    pub fn compose(&self, body: &str) -> NewComment {
        NewComment { content_id: self.content_id, content: body.trim().to_owned(), parent_comment_id: None }
    }

    /// Builds a reply submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReplyable`] when `parent_id` is a loaded reply: replies
    /// are only offered on top-level comments.
    pub fn compose_reply(&self, parent_id: CommentId, body: &str) -> Result<NewComment> {
        if self.find(parent_id).is_some_and(|c| !c.is_top_level()) {
            return Err(Error::NotReplyable(parent_id));
        }
        Ok(NewComment {
            content_id: self.content_id,
            content: body.trim().to_owned(),
            parent_comment_id: Some(parent_id),
        })
    }

    /// Wraps a submission in a request bound to this thread's scope.
    pub fn submission(&self, comment: NewComment) -> Request<NewComment> {
        Request::detached(&self.scope, comment)
    }

    /// Merges a comment the server has just created.
    pub fn apply_created(&mut self, parent_id: Option<CommentId>, node: CommentNode) -> CreatedOutcome {
        if self.phase == ThreadPhase::Collapsed {
            return CreatedOutcome::Discarded;
        }
        match parent_id {
            None => {
                self.comments.insert(0, normalize_top_level(node));
                self.total_count += 1;
                CreatedOutcome::Prepended
            }
            Some(parent) => match self.comments.iter_mut().find(|c| c.id == parent) {
                Some(parent_node) => {
                    parent_node.children.push(normalize_reply(node));
                    parent_node.children_count += 1;
                    self.total_count += 1;
                    CreatedOutcome::Appended { parent }
                }
                None => {
                    debug!(content_id = self.content_id, parent, "reply parent is not loaded; not shown");
                    CreatedOutcome::ParentNotLoaded { parent }
                }
            },
        }
    }

    /// Expands the thread and awaits page 0 against `api`.
    pub async fn open<A: JournalApi>(&mut self, api: &A) -> PageOutcome {
        match self.expand() {
            Some(request) => self.run_page(api, request).await,
            None => PageOutcome::Stale,
        }
    }

    /// Awaits the next page against `api`.
    pub async fn fetch_more<A: JournalApi>(&mut self, api: &A) -> PageOutcome {
        match self.load_more() {
            Some(request) => self.run_page(api, request).await,
            None => PageOutcome::Stale,
        }
    }

    /// Awaits a fresh page 0 against `api`.
    pub async fn refresh<A: JournalApi>(&mut self, api: &A) -> PageOutcome {
        match self.reload() {
            Some(request) => self.run_page(api, request).await,
            None => PageOutcome::Stale,
        }
    }

    async fn run_page<A: JournalApi>(&mut self, api: &A, request: Request<CommentQuery>) -> PageOutcome {
        let result = bind(&request.token, api.comments(&request.query)).await;
        self.complete_page(request.ticket, result)
    }

    /// Posts `comment` and merges the created node.
    ///
    /// # Errors
    ///
    /// Returns the API error; the thread is left untouched.
    pub async fn submit<A: JournalApi>(&mut self, api: &A, comment: NewComment) -> Result<CreatedOutcome> {
        let parent = comment.parent_comment_id;
        let request = self.submission(comment);
        let node = bind(&request.token, api.create_comment(&request.query)).await?;
        Ok(self.apply_created(parent, node))
    }
}

impl LoadMore for CommentThread {
    type Query = CommentQuery;

    fn can_load_more(&self) -> bool {
        self.phase == ThreadPhase::Loaded && self.has_next && !self.is_loading()
    }

    fn begin_load_more(&mut self) -> Option<Request<CommentQuery>> {
        self.load_more()
    }
}

// The local model has exactly two levels; anything deeper is dropped.
fn normalize_top_level(mut node: CommentNode) -> CommentNode {
    node.depth = 0;
    node.children = node.children.into_iter().map(normalize_reply).collect();
    node
}

fn normalize_reply(mut node: CommentNode) -> CommentNode {
    node.depth = 1;
    node.children.clear();
    node.children_count = 0;
    node
}
