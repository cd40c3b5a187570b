//! UI rendering module for keepsake.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each screen
//! has its own renderer.

mod layout;
pub mod comments_view;
pub mod feed_view;
pub mod help;
pub mod keybindings;
pub mod search_view;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::app::{AppState, Draft, Mode, Screen};
use crate::theme::Theme;
use layout::{feed_layout, panel_block, render_status_bar, split_status};

/// Renders one complete frame.
///
/// Called exactly once per `AppEvent::Render`. The feed renderer writes the list
/// viewport back into `state`, which is why this takes `&mut AppState`; the
/// caller runs [`AppState::after_render`] once the frame is done.
///
/// # Arguments
///
/// * `frame` — current render frame provided by `terminal.draw()`
/// * `state` — mutable app state
/// * `theme` — active color theme
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [main, status_bar] = split_status(frame);

    match state.screen {
        Screen::Feed => {
            let [list, comments] = feed_layout(main, state.feed.thread.is_some());
            feed_view::render_feed(frame, list, &mut state.feed, theme);
            comments_view::render_comments(frame, comments, &state.feed, theme);
        }
        Screen::Search => search_view::render_search(frame, main, state, theme),
    }

    if let Some(draft @ (Draft::Comment | Draft::Reply { .. })) = state.draft {
        render_composer(frame, main, draft, &state.input, theme);
    }

    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}

/// Three-row input box pinned to the bottom of the main area while a comment
/// or reply is being typed.
fn render_composer(frame: &mut Frame, main: Rect, draft: Draft, input: &str, theme: &Theme) {
    if main.height < 3 {
        return;
    }
    let area = Rect::new(main.x, main.bottom() - 3, main.width, 3);
    let title = match draft {
        Draft::Reply { parent } => format!(" Reply to #{parent} "),
        _ => " New comment ".to_owned(),
    };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(input),
            Span::styled("▏", Style::default().fg(theme.status_mode_insert)),
        ]))
        .block(panel_block(title, true, theme)),
        area,
    );
}
