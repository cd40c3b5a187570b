//! keepsake — terminal client for a shared memory journal.
//!
//! Entry point for the `keepsake` binary. Wires together the terminal lifecycle
//! (`tui`), unified event bus (`event`), API dispatch (`worker`), application
//! state (`app`), rendering (`ui`), and the synchronization layer in
//! `keepsake-core`.
//!
//! # Startup sequence
//!
//! 1. Logging to a rolling file, then config from XDG plus environment
//!    overrides. Both happen before the terminal is touched.
//! 2. `install_panic_hook()` — restores the terminal before the panic message prints.
//! 3. `register_sigterm()` — flag polled on the 50ms heartbeat.
//! 4. `init_tui()` — enters alternate screen and enables raw mode.
//! 5. Event channel, event task, dispatcher, and the feed's first page request.
//!
//! `restore_tui()` runs after the event loop exits on every path except panic,
//! which the panic hook covers.

mod app;
mod event;
mod logging;
mod theme;
mod tui;
mod ui;
mod worker;

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use keepsake_core::api::HttpApi;
use keepsake_core::config::{self, Config};
use tracing::{error, info};

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// Heartbeat period: SIGTERM and the suggestion debouncer are checked at least this often.
const HEARTBEAT: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init(&config::log_dir())?;

    let config = Config::load_or_default(&config::config_path()).with_env();
    info!(api_url = %config.api_url, access = ?config.access(), "starting keepsake");
    let theme = theme::Theme::from_name(&config.theme);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let dispatcher = worker::Dispatcher::new(HttpApi::from_config(&config), handler.tx.clone());
    let mut state = app::AppState::new(config, dispatcher);
    state.start();

    // Exits only via `break` so that `restore_tui()` below is always reached.
    let result = 'event_loop: loop {
        tokio::select! {
            _ = tokio::time::sleep(HEARTBEAT) => {}
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            break 'event_loop Err(e);
                        }
                        state.after_render();
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop Ok(());
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Api(completion)) => state.apply_api(*completion),
                    Some(AppEvent::Tick) => {}
                    // ratatui picks up the new size on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop Ok(()),
                }
            }
        }
        // Render events arrive faster than the heartbeat, so time-based state is
        // driven after every wakeup rather than from the sleep arm alone.
        state.heartbeat(Instant::now());
        if term_flag.load(Ordering::Relaxed) {
            info!("SIGTERM received");
            break 'event_loop Ok(());
        }
    };

    state.shutdown();
    tui::restore_tui()?;
    if let Err(e) = &result {
        error!(error = %e, "terminal draw failed");
    }
    result
}
