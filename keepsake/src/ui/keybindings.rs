//! Keybinding dispatcher for keepsake.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` calls and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode`, then on the active screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{AppState, FeedFocus, Mode, Screen};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`   — the raw crossterm key event (code + modifiers)
/// * `state` — mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Insert => handle_insert(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Tab => state.switch_screen(),
        KeyCode::Char('j') | KeyCode::Down => state.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => state.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => state.move_selection(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => state.move_selection(isize::MAX),
        _ => match state.screen {
            Screen::Feed => handle_feed_key(key, state),
            Screen::Search => handle_search_key(key, state),
        },
    }
    KeyAction::Continue
}

fn handle_feed_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('c') | KeyCode::Enter if state.feed.focus == FeedFocus::List => {
            state.toggle_comments();
        }
        KeyCode::Char('h') | KeyCode::Char('l') => state.toggle_feed_focus(),
        KeyCode::Esc if state.feed.focus == FeedFocus::Comments => state.toggle_feed_focus(),
        KeyCode::Char('m') => match state.feed.focus {
            FeedFocus::List => state.load_more_memories(),
            FeedFocus::Comments => state.load_more_comments(),
        },
        KeyCode::Char('R') => state.reload_comments(),
        KeyCode::Char('i') => state.begin_comment(),
        KeyCode::Char('r') if state.feed.focus == FeedFocus::Comments => state.begin_reply(),
        _ => {}
    }
}

fn handle_search_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('/') | KeyCode::Char('i') => state.begin_search_input(),
        KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::Right => state.next_page(),
        KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::Left => state.previous_page(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                state.go_to_page(digit - 1);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.cancel_draft(),
        KeyCode::Enter => state.submit_draft(),
        KeyCode::Backspace => state.delete_char(),
        KeyCode::Down => state.move_suggestion(1),
        KeyCode::Up => state.move_suggestion(-1),
        KeyCode::Char(c) => state.insert_char(c),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves the selection of whatever list has focus. Wheel events
/// over the help overlay scroll the overlay instead.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let delta: i16 = match mouse.kind {
        MouseEventKind::ScrollUp => -1,
        MouseEventKind::ScrollDown => 1,
        _ => return KeyAction::Continue,
    };
    match state.mode {
        Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add_signed(delta * 3);
        }
        Mode::Normal => state.move_selection(isize::from(delta)),
        Mode::Insert => {}
    }
    KeyAction::Continue
}
