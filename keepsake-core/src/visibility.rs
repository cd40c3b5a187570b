//! Sentinel-row visibility bridge.
//!
//! A list renders a sentinel (one or more rows) directly after its last item.
//! After every frame the caller reports the list's [`Viewport`]; the bridge works
//! out how much of the sentinel is on screen and, when that ratio crosses
//! [`VISIBILITY_THRESHOLD`] from below, asks the paginator for more.
//!
//! The bridge owns no pagination state. It reads the guard from the paginator it
//! is handed at the moment the transition happens, so there is no stale copy of
//! `loading` or the cursor to keep in sync.

use tracing::trace;

use crate::slot::Request;

/// Fraction of the sentinel that must be visible before it counts as seen.
pub const VISIBILITY_THRESHOLD: f32 = 0.9;

/// Geometry of a scrolled list, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub offset: usize,
    /// Number of rows the list area can show.
    pub height: usize,
    /// Rows occupied by list items; the sentinel starts right after them.
    pub content_rows: usize,
    pub sentinel_rows: usize,
}

impl Viewport {
    /// Visible fraction of the sentinel in `[0.0, 1.0]`.
    pub fn sentinel_ratio(&self) -> f32 {
        if self.sentinel_rows == 0 || self.height == 0 {
            return 0.0;
        }
        let sentinel_start = self.content_rows;
        let sentinel_end = self.content_rows + self.sentinel_rows;
        let view_end = self.offset + self.height;
        let overlap_start = sentinel_start.max(self.offset);
        let overlap_end = sentinel_end.min(view_end);
        let visible = overlap_end.saturating_sub(overlap_start);
        visible as f32 / self.sentinel_rows as f32
    }
}

/// A paginator that can be asked for its next page by a visibility trigger.
pub trait LoadMore {
    type Query;

    /// The caller's guard, evaluated at trigger time. For a cursor feed this is
    /// `!loading && has_more && !initial_load`.
    fn can_load_more(&self) -> bool;

    /// Admits the next request. Returns `None` if the guard no longer holds, so
    /// a second trigger in the same tick is harmless.
    fn begin_load_more(&mut self) -> Option<Request<Self::Query>>;
}

#[derive(Debug, Clone)]
pub struct VisibilityBridge {
    threshold: f32,
    visible: bool,
    disposed: bool,
}

impl Default for VisibilityBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityBridge {
    pub fn new() -> Self {
        Self { threshold: VISIBILITY_THRESHOLD, visible: false, disposed: false }
    }

    /// Records the latest geometry and reports whether the sentinel just
    /// entered the visible region. Level changes in the other direction re-arm
    /// the bridge.
    pub fn observe(&mut self, viewport: Viewport) -> bool {
        if self.disposed {
            return false;
        }
        let now_visible = viewport.sentinel_ratio() >= self.threshold;
        let entered = now_visible && !self.visible;
        self.visible = now_visible;
        entered
    }

    /// Observes `viewport` and, on a transition into view, triggers `target`.
    pub fn poll<T: LoadMore>(&mut self, viewport: Viewport, target: &mut T) -> Option<Request<T::Query>> {
        if !self.observe(viewport) {
            return None;
        }
        self.trigger(target)
    }

    /// The "request more" callback. Checks the guard on the live paginator.
    pub fn trigger<T: LoadMore>(&self, target: &mut T) -> Option<Request<T::Query>> {
        if self.disposed {
            return None;
        }
        if !target.can_load_more() {
            trace!("sentinel visible but guard does not hold; not loading");
            return None;
        }
        target.begin_load_more()
    }

    /// Forgets that the sentinel is on screen, so the next observation that
    /// finds it visible counts as an entry. Called when the list changed under
    /// a sentinel that never left the viewport.
    pub fn rearm(&mut self) {
        self.visible = false;
    }

    /// Stops observing for good. Called when the owning screen goes away.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.visible = false;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_sentinel_visible(&self) -> bool {
        self.visible
    }
}
