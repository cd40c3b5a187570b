//! keepsake-core — collection synchronization for the keepsake journal client.
//!
//! Everything here is terminal-agnostic. The binary crate owns the event loop and
//! rendering; this crate owns the state machines that turn paginated API responses
//! into consistent client-side lists:
//!
//! - [`feed::CursorFeed`] — infinite-scroll memory feed (last-seen-id cursor).
//! - [`search::SearchPaginator`] — page-numbered search results (offset).
//! - [`suggest`] — autocomplete aggregation and keystroke debouncing.
//! - [`comments::CommentThread`] — two-level comment tree per memory.
//! - [`visibility::VisibilityBridge`] — sentinel-row "load more" trigger.
//!
//! Every request is issued through a [`slot::RequestSlot`] bound to a
//! [`slot::Scope`], so "is a fetch in flight" and "mark a fetch in flight" are one
//! step, and tearing a screen down cancels whatever it still has outstanding.

pub mod api;
pub mod comments;
pub mod config;
pub mod error;
pub mod feed;
pub mod search;
pub mod slot;
pub mod suggest;
pub mod types;
pub mod visibility;

pub use error::{Error, Result};
