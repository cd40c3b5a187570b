//! Event bus for keepsake.
//!
//! All user input, timer ticks, and API completions are normalised into a single
//! `AppEvent` enum and sent over a tokio unbounded MPSC channel. The main loop
//! receives from this channel and dispatches accordingly.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) — triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms = 4 Hz) — wakes the loop so timed state advances while idle.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use keepsake_core::slot::Ticket;
use keepsake_core::types::{CommentId, CommentNode, CommentPage, FeedItem, ItemId, SearchPage, Suggestion};
use keepsake_core::Result;
use tokio::sync::mpsc;
use tokio::time::interval;

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (click, scroll, move).
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (4 Hz / 250 ms).
    Tick,
    /// Render tick — triggers a `terminal.draw()` call (≈30 FPS / 33 ms).
    Render,
    /// A request issued through the [`Dispatcher`](crate::worker::Dispatcher) finished.
    Api(Box<ApiEvent>),
}

/// Completion of one API request, tagged with whatever the owning state
/// machine needs to decide whether the result is still wanted.
#[derive(Debug)]
pub enum ApiEvent {
    Feed {
        ticket: Ticket,
        result: Result<Vec<FeedItem>>,
    },
    Search {
        ticket: Ticket,
        result: Result<SearchPage>,
    },
    Suggest {
        ticket: Ticket,
        query: String,
        result: Result<Vec<Suggestion>>,
    },
    Comments {
        content_id: ItemId,
        ticket: Ticket,
        result: Result<CommentPage>,
    },
    Created {
        content_id: ItemId,
        parent: Option<CommentId>,
        result: Result<CommentNode>,
    },
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned and distributed to background tasks;
/// the receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that drives the unified event channel.
///
/// The task runs until the receiver is dropped. Two independent
/// `tokio::time::interval` timers drive the render and logic cycles; crossterm
/// input is polled via `EventStream`.
///
/// # Key implementation choices
///
/// - `reader.next().fuse()` — if the crossterm stream terminates, `select!`
///   must not keep polling a completed future.
/// - `KeyEventKind::Press` filter — Windows fires both `Press` and `Release`
///   for every keystroke.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
