//! Help overlay renderer for keepsake.
//!
//! Draws a centred modal box over the current screen. `Clear` erases the
//! background first, so the overlay needs no second draw call.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal.
///
/// Skipped on terminals narrower than 60 columns.
///
/// # Arguments
///
/// * `frame` — current render frame provided by `terminal.draw()`
/// * `theme` — active color theme (supplies `border_active` for the modal border)
/// * `help_scroll` — vertical scroll offset; j/k in HelpOverlay mode mutate this field
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  — j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("General"),
        Line::from("  Tab           Switch between Feed and Search"),
        Line::from("  j / k         Move down / up"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from("Feed"),
        Line::from("  c / Enter     Open / close comments for the selected memory"),
        Line::from("  h / l         Focus memories / comments"),
        Line::from("  m             Load more (memories or comments, by focus)"),
        Line::from("  R             Reload comments"),
        Line::from("  i             Write a comment"),
        Line::from("  r             Reply to the selected comment"),
        Line::from(""),
        Line::from("Search"),
        Line::from("  / or i        Edit the query (suggestions appear as you type)"),
        Line::from("  Up / Down     Pick a suggestion while typing"),
        Line::from("  n / ]         Next page"),
        Line::from("  p / [         Previous page"),
        Line::from("  1-9           Jump to page"),
        Line::from(""),
        Line::from("Insert mode"),
        Line::from("  Enter         Submit"),
        Line::from("  Esc           Cancel"),
    ])
}
