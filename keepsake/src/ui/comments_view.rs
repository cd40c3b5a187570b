//! Comment panel renderer.
//!
//! Top-level comments are drawn flush left with their replies indented beneath
//! them. The footer offers the next page while the server reports one.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};

use keepsake_core::comments::{CommentThread, ThreadPhase};
use keepsake_core::types::CommentNode;

use crate::app::{FeedFocus, FeedScreen};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

pub fn render_comments(frame: &mut Frame, area: Rect, screen: &FeedScreen, theme: &Theme) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let Some(thread) = &screen.thread else {
        return;
    };

    let title = format!(" Comments ({}) ", thread.total_count());
    let focused = screen.focus == FeedFocus::Comments;
    let block = panel_block(title, focused, theme);

    let mut items: Vec<ListItem> = Vec::new();
    for comment in thread.comments() {
        items.push(comment_item(comment, false, theme));
        for reply in &comment.children {
            items.push(comment_item(reply, true, theme));
        }
    }
    items.push(footer(thread, theme));

    let mut list_state = ListState::default();
    if focused && !thread.comments().is_empty() {
        list_state.select(Some(screen.comment_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.selection_bg));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn comment_item<'a>(comment: &'a CommentNode, is_reply: bool, theme: &Theme) -> ListItem<'a> {
    let indent = if is_reply {
        Span::styled("  └ ", Style::default().fg(theme.reply_guide))
    } else {
        Span::raw(" ")
    };
    let header = Line::from(vec![
        indent.clone(),
        Span::styled(
            comment.author.nickname.as_str(),
            Style::default().fg(theme.comment_author).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", comment.created_at), Style::default().fg(theme.muted)),
    ]);
    let pad = if is_reply { "    " } else { " " };
    let mut lines = vec![header];
    lines.extend(comment.body.lines().map(|l| Line::raw(format!("{pad}{l}"))));
    ListItem::new(lines)
}

fn footer<'a>(thread: &CommentThread, theme: &Theme) -> ListItem<'a> {
    let text = match thread.phase() {
        ThreadPhase::Loading => " loading comments…".to_owned(),
        ThreadPhase::LoadingMore => " loading more…".to_owned(),
        ThreadPhase::Loaded if thread.comments().is_empty() => " no comments yet · i to write one".to_owned(),
        ThreadPhase::Loaded if thread.has_next() => format!(
            " m: more comments (page {} loaded)",
            thread.current_page() + 1
        ),
        ThreadPhase::Loaded | ThreadPhase::Collapsed => String::new(),
    };
    ListItem::new(Line::styled(text, Style::default().fg(theme.muted)))
}
