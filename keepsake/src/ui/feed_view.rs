//! Feed list renderer.
//!
//! Every memory takes [`ENTRY_ROWS`] terminal rows. While more pages may exist a
//! sentinel entry of the same height follows the last memory; after drawing, the
//! list geometry is written back to `state.feed.viewport` (counted in entries, not
//! terminal rows) so the visibility bridge can see how much of the sentinel is on
//! screen.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use keepsake_core::types::{FeedItem, Visibility};
use keepsake_core::visibility::Viewport;

use crate::app::{FeedFocus, FeedScreen};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Terminal rows per list entry.
pub const ENTRY_ROWS: u16 = 2;

/// Renders the memory list and records its viewport.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — outer `Rect` of the list panel (includes borders)
/// * `screen` — feed screen state; `viewport` and `list_state` are updated
/// * `theme` — active color theme
pub fn render_feed(frame: &mut Frame, area: Rect, screen: &mut FeedScreen, theme: &Theme) {
    let title = format!(" Memories ({}) ", screen.feed.len());
    let block = panel_block(title, screen.focus == FeedFocus::List, theme);

    let mut items: Vec<ListItem> = screen.feed.items().iter().map(|m| memory_item(m, theme)).collect();
    let sentinel_rows = usize::from(screen.feed.has_more());
    if sentinel_rows > 0 {
        let label = if screen.feed.is_loading() { "  loading…" } else { "  scroll for more" };
        items.push(ListItem::new(vec![
            Line::styled(label, Style::default().fg(theme.sentinel)),
            Line::raw(""),
        ]));
    } else if screen.feed.is_empty() {
        items.push(ListItem::new(Line::styled("  no memories yet", Style::default().fg(theme.muted))));
    } else {
        items.push(ListItem::new(Line::styled("  — end of feed —", Style::default().fg(theme.muted))));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.selection_bg));
    frame.render_stateful_widget(list, area, &mut screen.list_state);

    screen.viewport = Viewport {
        offset: screen.list_state.offset(),
        height: usize::from((inner_rect(area).height / ENTRY_ROWS).max(1)),
        content_rows: screen.feed.len(),
        sentinel_rows,
    };
}

/// Two-line entry: visibility badge and title, then author, date, tags, and
/// comment count.
fn memory_item<'a>(memory: &'a FeedItem, theme: &Theme) -> ListItem<'a> {
    let badge_fg = match memory.visibility {
        Visibility::Public => theme.badge_public,
        Visibility::Private => theme.badge_private,
        Visibility::Relationship => theme.badge_relationship,
    };
    let headline = Line::from(vec![
        Span::styled(format!(" [{}] ", memory.visibility.label()), Style::default().fg(badge_fg)),
        Span::styled(
            memory.title.as_str(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut meta = vec![Span::styled(format!("   @{}", memory.author.nickname), Style::default().fg(theme.muted))];
    if let Some(date) = &memory.memory_date {
        meta.push(Span::styled(format!(" · {date}"), Style::default().fg(theme.muted)));
    }
    for tag in &memory.tags {
        meta.push(Span::styled(format!(" #{tag}"), Style::default().fg(theme.tag)));
    }
    meta.push(Span::styled(
        format!(" · {} comments", memory.comment_count),
        Style::default().fg(theme.muted),
    ));

    ListItem::new(vec![headline, Line::from(meta)])
}
