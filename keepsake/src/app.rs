//! Central application state for keepsake.
//!
//! `AppState` owns both screens, the current mode, the text being typed, and the
//! transient notification. No ratatui rendering logic lives here: the render
//! module reads it, the keybinding dispatcher mutates it, and API completions are
//! folded in through [`AppState::apply_api`].
//!
//! Each screen owns a [`Scope`]. Leaving a screen cancels its scope and disposes
//! its visibility bridge, then the screen is rebuilt from scratch on return, so
//! nothing issued by the old instance can land in the new one.

use std::time::{Duration, Instant};

use keepsake_core::comments::{CommentThread, CreatedOutcome, PageOutcome};
use keepsake_core::config::Config;
use keepsake_core::feed::{CursorFeed, FeedOutcome};
use keepsake_core::search::SearchPaginator;
use keepsake_core::slot::Scope;
use keepsake_core::suggest::SuggestionBox;
use keepsake_core::types::{CommentId, FeedItem, ItemId};
use keepsake_core::visibility::{VisibilityBridge, Viewport};
use ratatui::widgets::ListState;
use tracing::{debug, info};

use crate::event::ApiEvent;
use crate::worker::Dispatcher;

/// How long a notification stays in the status bar.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal vim-style navigation mode (default).
    #[default]
    Normal,
    /// Typing into the current [`Draft`].
    Insert,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Feed,
    Search,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Feed => "FEED",
            Screen::Search => "SEARCH",
        }
    }
}

/// Which panel of the feed screen receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FeedFocus {
    #[default]
    List,
    Comments,
}

/// What the text typed in Insert mode will become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draft {
    Comment,
    Reply { parent: CommentId },
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

/// One rendered comment row: top-level comments followed by their replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRow {
    pub id: CommentId,
    pub top_level: bool,
}

/// The infinite-scroll memory feed plus the comment panel of the selected memory.
pub struct FeedScreen {
    scope: Scope,
    pub feed: CursorFeed,
    pub bridge: VisibilityBridge,
    pub list_state: ListState,
    /// Geometry of the list as last drawn, in list entries. Written by the renderer.
    pub viewport: Viewport,
    pub thread: Option<CommentThread>,
    pub focus: FeedFocus,
    pub comment_cursor: usize,
    comment_page_size: u32,
}

impl FeedScreen {
    pub fn new(config: &Config) -> Self {
        let scope = Scope::new();
        Self {
            feed: CursorFeed::new(config.feed_page_size, scope.clone()),
            scope,
            bridge: VisibilityBridge::new(),
            list_state: ListState::default().with_selected(Some(0)),
            viewport: Viewport::default(),
            thread: None,
            focus: FeedFocus::default(),
            comment_cursor: 0,
            comment_page_size: config.comment_page_size,
        }
    }

    /// The memory under the cursor. `None` while the cursor sits on the sentinel.
    pub fn selected_item(&self) -> Option<&FeedItem> {
        self.list_state.selected().and_then(|i| self.feed.get(i))
    }

    /// Number of selectable list entries: every memory, plus the sentinel while
    /// more pages may exist.
    pub fn entry_count(&self) -> usize {
        self.feed.len() + usize::from(self.feed.has_more())
    }

    /// Flattened comment rows in display order.
    pub fn comment_rows(&self) -> Vec<CommentRow> {
        let Some(thread) = &self.thread else {
            return Vec::new();
        };
        thread
            .comments()
            .iter()
            .flat_map(|c| {
                std::iter::once(CommentRow { id: c.id, top_level: true })
                    .chain(c.children.iter().map(|r| CommentRow { id: r.id, top_level: false }))
            })
            .collect()
    }

    pub fn selected_comment(&self) -> Option<CommentRow> {
        self.comment_rows().get(self.comment_cursor).copied()
    }

    fn teardown(&mut self) {
        self.scope.cancel();
        self.bridge.dispose();
        self.feed.cancel();
        if let Some(thread) = &mut self.thread {
            thread.collapse();
        }
    }
}

/// Page-numbered search with autocomplete.
pub struct SearchScreen {
    scope: Scope,
    pub paginator: SearchPaginator,
    pub suggestions: SuggestionBox,
    pub list_state: ListState,
    /// Highlighted suggestion while typing; `None` means "use the typed text".
    pub suggestion_cursor: Option<usize>,
}

impl SearchScreen {
    pub fn new(config: &Config) -> Self {
        let scope = Scope::new();
        Self {
            paginator: SearchPaginator::new(config.search_page_size, scope.clone()),
            suggestions: SuggestionBox::new(config.suggestion_limit, scope.clone()),
            scope,
            list_state: ListState::default(),
            suggestion_cursor: None,
        }
    }

    fn teardown(&mut self) {
        self.scope.cancel();
        self.paginator.cancel();
        self.suggestions.clear();
    }
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub screen: Screen,
    pub feed: FeedScreen,
    pub search: SearchScreen,

    /// Target of the text being typed, if any.
    pub draft: Option<Draft>,
    /// Text typed in Insert mode.
    pub input: String,

    pub notification: Option<Notification>,
    /// Vertical scroll offset of the help overlay.
    pub help_scroll: u16,

    config: Config,
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            mode: Mode::default(),
            screen: Screen::default(),
            feed: FeedScreen::new(&config),
            search: SearchScreen::new(&config),
            draft: None,
            input: String::new(),
            notification: None,
            help_scroll: 0,
            config,
            dispatcher,
        }
    }

    /// Issues the feed screen's own first page request.
    pub fn start(&mut self) {
        if let Some(request) = self.feed.feed.begin_fetch() {
            self.dispatcher.feed(request);
        }
    }

    // -----------------------------------------------------------------------
    // Screens
    // -----------------------------------------------------------------------

    /// Tears down the current screen and opens the other one.
    pub fn switch_screen(&mut self) {
        self.cancel_draft();
        match self.screen {
            Screen::Feed => {
                self.feed.teardown();
                self.search = SearchScreen::new(&self.config);
                self.screen = Screen::Search;
            }
            Screen::Search => {
                self.search.teardown();
                self.feed = FeedScreen::new(&self.config);
                self.screen = Screen::Feed;
                self.start();
            }
        }
        debug!(screen = self.screen.label(), "switched screen");
    }

    /// Tears down whatever is live. Called once on exit.
    pub fn shutdown(&mut self) {
        self.feed.teardown();
        self.search.teardown();
    }

    /// Runs after every frame, once the renderer has recorded the feed viewport.
    pub fn after_render(&mut self) {
        if self.screen != Screen::Feed {
            return;
        }
        let viewport = self.feed.viewport;
        if let Some(request) = self.feed.bridge.poll(viewport, &mut self.feed.feed) {
            debug!(cursor = ?request.query.last_id, "sentinel visible; loading more memories");
            self.dispatcher.feed(request);
        }
    }

    /// Drives time-based state: the suggestion debouncer and notification expiry.
    pub fn heartbeat(&mut self, now: Instant) {
        if self.screen == Screen::Search {
            if let Some(request) = self.search.suggestions.poll(now) {
                self.dispatcher.autocomplete(request);
            }
        }
        if self.notification.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notification = None;
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            expires_at: Instant::now() + NOTIFICATION_TTL,
        });
    }

    /// True while any request of the current screen is outstanding.
    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::Feed => {
                self.feed.feed.is_loading() || self.feed.thread.as_ref().is_some_and(|t| t.is_loading())
            }
            Screen::Search => self.search.paginator.is_loading(),
        }
    }

    // -----------------------------------------------------------------------
    // Feed screen
    // -----------------------------------------------------------------------

    pub fn move_selection(&mut self, delta: isize) {
        match (self.screen, self.feed.focus) {
            (Screen::Feed, FeedFocus::List) => {
                let count = self.feed.entry_count();
                step(&mut self.feed.list_state, count, delta);
                // Scrolling against a sentinel that is already on screen retries.
                self.feed.bridge.rearm();
            }
            (Screen::Feed, FeedFocus::Comments) => {
                let count = self.feed.comment_rows().len();
                if count > 0 {
                    let next = self.feed.comment_cursor.saturating_add_signed(delta);
                    self.feed.comment_cursor = next.min(count - 1);
                }
            }
            (Screen::Search, _) => {
                let count = self.search.paginator.results().len();
                step(&mut self.search.list_state, count, delta);
            }
        }
    }

    /// Asks for the next page directly, for when the sentinel is already on
    /// screen and will not cross into view again.
    pub fn load_more_memories(&mut self) {
        if let Some(request) = self.feed.bridge.trigger(&mut self.feed.feed) {
            self.dispatcher.feed(request);
        }
    }

    pub fn toggle_feed_focus(&mut self) {
        if self.feed.thread.is_some() {
            self.feed.focus = match self.feed.focus {
                FeedFocus::List => FeedFocus::Comments,
                FeedFocus::Comments => FeedFocus::List,
            };
        }
    }

    /// Opens the comment panel for the selected memory, or closes it if it is
    /// already showing that memory.
    pub fn toggle_comments(&mut self) {
        let Some(content_id) = self.feed.selected_item().map(|item| item.id) else {
            return;
        };
        if let Some(mut thread) = self.feed.thread.take() {
            thread.collapse();
            self.feed.focus = FeedFocus::List;
            if thread.content_id() == content_id {
                return;
            }
        }
        let mut thread = CommentThread::new(content_id, self.feed.comment_page_size, self.feed.scope.clone());
        if let Some(request) = thread.expand() {
            self.dispatcher.comments(request);
        }
        self.feed.comment_cursor = 0;
        self.feed.thread = Some(thread);
    }

    pub fn load_more_comments(&mut self) {
        if let Some(request) = self.feed.thread.as_mut().and_then(|t| t.load_more()) {
            self.dispatcher.comments(request);
        }
    }

    pub fn reload_comments(&mut self) {
        if let Some(request) = self.feed.thread.as_mut().and_then(|t| t.reload()) {
            self.dispatcher.comments(request);
        }
    }

    // -----------------------------------------------------------------------
    // Search screen
    // -----------------------------------------------------------------------

    pub fn next_page(&mut self) {
        if let Some(request) = self.search.paginator.go_next() {
            self.dispatcher.search(request);
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(request) = self.search.paginator.go_previous() {
            self.dispatcher.search(request);
        }
    }

    /// Jumps to a 0-indexed page.
    pub fn go_to_page(&mut self, page: u32) {
        if self.search.paginator.page_info().is_none() {
            return;
        }
        match self.search.paginator.go_to(page) {
            Ok(request) => self.dispatcher.search(request),
            Err(e) => self.notify(NotificationKind::Error, e.to_string()),
        }
    }

    pub fn move_suggestion(&mut self, delta: isize) {
        let count = self.search.suggestions.suggestions().len();
        if count == 0 {
            self.search.suggestion_cursor = None;
            return;
        }
        self.search.suggestion_cursor = match (self.search.suggestion_cursor, delta.is_negative()) {
            (None, false) => Some(0),
            (None, true) => None,
            (Some(0), true) => None,
            (Some(i), true) => Some(i - 1),
            (Some(i), false) => Some((i + 1).min(count - 1)),
        };
    }

    // -----------------------------------------------------------------------
    // Insert mode
    // -----------------------------------------------------------------------

    /// Starts typing a new top-level comment on the open thread.
    pub fn begin_comment(&mut self) {
        if self.feed.thread.is_some() {
            self.begin_draft(Draft::Comment, String::new());
        }
    }

    /// Starts typing a reply to the comment under the cursor.
    pub fn begin_reply(&mut self) {
        let (Some(thread), Some(row)) = (&self.feed.thread, self.feed.selected_comment()) else {
            return;
        };
        // Validate up front so the user is not left typing into a dead end.
        match thread.compose_reply(row.id, "") {
            Ok(_) => self.begin_draft(Draft::Reply { parent: row.id }, String::new()),
            Err(e) => self.notify(NotificationKind::Error, e.to_string()),
        }
    }

    pub fn begin_search_input(&mut self) {
        let current = self.search.paginator.query().to_owned();
        self.begin_draft(Draft::Search, current);
    }

    fn begin_draft(&mut self, draft: Draft, initial: String) {
        self.draft = Some(draft);
        self.input = initial;
        self.mode = Mode::Insert;
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
        self.input_changed();
    }

    pub fn delete_char(&mut self) {
        self.input.pop();
        self.input_changed();
    }

    fn input_changed(&mut self) {
        if self.draft == Some(Draft::Search) {
            self.search.suggestion_cursor = None;
            self.search.suggestions.input(&self.input, Instant::now());
        }
    }

    pub fn cancel_draft(&mut self) {
        if self.draft == Some(Draft::Search) {
            self.search.suggestions.clear();
            self.search.suggestion_cursor = None;
        }
        self.draft = None;
        self.input.clear();
        self.mode = Mode::Normal;
    }

    /// Sends whatever was typed.
    pub fn submit_draft(&mut self) {
        let Some(draft) = self.draft else {
            self.mode = Mode::Normal;
            return;
        };
        let text = match (draft, self.search.suggestion_cursor) {
            (Draft::Search, Some(i)) => self
                .search
                .suggestions
                .suggestions()
                .get(i)
                .map(|s| s.text.clone())
                .unwrap_or_else(|| self.input.clone()),
            _ => self.input.clone(),
        };
        if text.trim().is_empty() {
            self.cancel_draft();
            return;
        }

        match draft {
            Draft::Search => {
                let request = self.search.paginator.begin_search(&text);
                self.search.list_state.select(Some(0));
                self.dispatcher.search(request);
            }
            Draft::Comment => {
                if let Some(thread) = &self.feed.thread {
                    let comment = thread.compose(&text);
                    self.dispatcher.create_comment(thread.submission(comment));
                }
            }
            Draft::Reply { parent } => {
                if let Some(thread) = &self.feed.thread {
                    match thread.compose_reply(parent, &text) {
                        Ok(reply) => self.dispatcher.create_comment(thread.submission(reply)),
                        Err(e) => self.notify(NotificationKind::Error, e.to_string()),
                    }
                }
            }
        }
        self.cancel_draft();
    }

    // -----------------------------------------------------------------------
    // API completions
    // -----------------------------------------------------------------------

    /// Folds one API completion into the state that issued it.
    ///
    /// Completions for a screen or thread that no longer exists are dropped by
    /// the ticket check inside each state machine, or here by `content_id`.
    pub fn apply_api(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Feed { ticket, result } => {
                if self.screen != Screen::Feed {
                    return;
                }
                if let FeedOutcome::Appended { added, .. } = self.feed.feed.complete(ticket, result) {
                    if added > 0 && self.feed.list_state.selected().is_none() {
                        self.feed.list_state.select(Some(0));
                    }
                    // The sentinel may never have left the screen; the next
                    // frame decides whether it is still in view.
                    self.feed.bridge.rearm();
                }
            }
            ApiEvent::Search { ticket, result } => {
                if self.screen != Screen::Search {
                    return;
                }
                match self.search.paginator.complete(ticket, result) {
                    Ok(true) => self.search.list_state.select(Some(0)),
                    Ok(false) => {}
                    Err(e) => self.notify(NotificationKind::Error, format!("Search failed: {e}")),
                }
            }
            ApiEvent::Suggest { ticket, query, result } => {
                if self.screen == Screen::Search
                    && self.search.suggestions.complete(ticket, &query, result)
                {
                    self.search.suggestion_cursor = None;
                }
            }
            ApiEvent::Comments { content_id, ticket, result } => {
                let Some(thread) = self.open_thread(content_id) else {
                    return;
                };
                if thread.complete_page(ticket, result) == PageOutcome::Failed {
                    self.notify(NotificationKind::Error, "Couldn't load comments");
                }
                let rows = self.feed.comment_rows().len();
                self.feed.comment_cursor = self.feed.comment_cursor.min(rows.saturating_sub(1));
            }
            ApiEvent::Created { content_id, parent, result } => {
                let node = match result {
                    Ok(node) => node,
                    Err(e) => {
                        self.notify(NotificationKind::Error, format!("Comment not posted: {e}"));
                        return;
                    }
                };
                let Some(thread) = self.open_thread(content_id) else {
                    return;
                };
                match thread.apply_created(parent, node) {
                    CreatedOutcome::Prepended | CreatedOutcome::Appended { .. } => {
                        self.notify(NotificationKind::Info, "Comment posted");
                    }
                    CreatedOutcome::ParentNotLoaded { parent } => {
                        info!(parent, "reply posted under a comment that is not loaded");
                        self.notify(NotificationKind::Info, "Reply posted; reload to see it");
                    }
                    CreatedOutcome::Discarded => {}
                }
            }
        }
    }

    fn open_thread(&mut self, content_id: ItemId) -> Option<&mut CommentThread> {
        if self.screen != Screen::Feed {
            return None;
        }
        self.feed.thread.as_mut().filter(|t| t.content_id() == content_id)
    }
}

/// Moves a list selection by `delta`, clamped to `0..count`.
fn step(list_state: &mut ListState, count: usize, delta: isize) {
    if count == 0 {
        list_state.select(None);
        return;
    }
    let current = list_state.selected().unwrap_or(0);
    list_state.select(Some(current.saturating_add_signed(delta).min(count - 1)));
}

