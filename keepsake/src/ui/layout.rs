//! Layout arithmetic and shared chrome for keepsake.
//!
//! Pure functions of the frame size and a few read-only flags. Called inside
//! `terminal.draw()` on every render so each frame reflects the current terminal
//! size.
//!
//! # Feed screen geometry
//!
//! | Terminal width | Comment panel open | Layout |
//! |----------------|--------------------|--------|
//! | any            | no                 | Feed list fills the main area |
//! | `>= 100` cols  | yes                | Feed 55% / comments 45%, side by side |
//! | `< 100` cols   | yes                | Feed above, comments below |

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, NotificationKind};
use crate::theme::Theme;

/// Returns `[main, status_bar]` for the current frame.
pub fn split_status(frame: &Frame) -> [Rect; 2] {
    frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]))
}

/// Returns `[feed, comments]`. `comments` is zero-sized when the panel is closed.
///
/// # Arguments
///
/// * `main` — area above the status bar
/// * `comments_open` — whether a comment thread is showing
pub fn feed_layout(main: Rect, comments_open: bool) -> [Rect; 2] {
    if !comments_open {
        return [main, Rect::new(main.x, main.bottom(), main.width, 0)];
    }
    let layout = if main.width >= 100 {
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
    };
    main.layout(&layout.spacing(Spacing::Overlap(1)))
}

/// Returns `[query_line, results, page_bar]` for the search screen.
pub fn search_layout(main: Rect) -> [Rect; 3] {
    main.layout(&Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]))
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get a thick border in `border_active`. `MergeStrategy::Fuzzy`
/// joins the shared edge of side-by-side panels cleanly even when one border is
/// thick and the other plain.
///
/// # Arguments
///
/// * `title` — panel title shown in the top border
/// * `is_focused` — `true` when this panel has keyboard focus
/// * `theme` — active color theme
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: mode, screen, loading marker, and the current
/// notification if one has not yet expired.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay => (" NORMAL ", theme.status_mode_normal),
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {} ", state.screen.label())),
    ];
    if state.is_loading() {
        spans.push(Span::styled(" loading… ", Style::default().fg(theme.muted)));
    }
    if let Some(note) = &state.notification {
        let fg = match note.kind {
            NotificationKind::Info => theme.notify_info,
            NotificationKind::Error => theme.notify_error,
        };
        spans.push(Span::styled(format!(" {} ", note.message), Style::default().fg(fg)));
    }
    spans.push(Span::styled(" ? help ", Style::default().fg(theme.muted)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
