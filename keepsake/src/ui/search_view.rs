//! Search screen renderer: query line, autocomplete dropdown, result list, and
//! the page-button bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
};

use keepsake_core::suggest::AggregatedSuggestion;
use keepsake_core::types::{SearchHit, SuggestionType};

use crate::app::{AppState, Draft};
use crate::theme::Theme;
use crate::ui::layout::{panel_block, search_layout};

pub fn render_search(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [query_area, results_area, pages_area] = search_layout(area);
    let typing = state.draft == Some(Draft::Search);

    let paginator = &state.search.paginator;
    let query_text = if typing {
        state.input.as_str()
    } else {
        paginator.pending_query().unwrap_or(paginator.query())
    };
    let cursor = if typing { "▏" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![Span::raw(query_text), Span::raw(cursor)]))
            .block(panel_block(" Search ", typing, theme)),
        query_area,
    );

    render_results(frame, results_area, state, theme);
    render_pages(frame, pages_area, state, theme);

    if typing {
        render_dropdown(frame, query_area, results_area, state, theme);
    }
}

fn render_results(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let paginator = &state.search.paginator;
    let title = match paginator.page_info() {
        Some(info) => format!(" Results ({}) ", info.total_elements),
        None => " Results ".to_owned(),
    };
    let items: Vec<ListItem> = if paginator.results().is_empty() {
        let msg = match (paginator.is_loading(), paginator.page_info()) {
            (true, _) => "  searching…",
            (false, Some(_)) => "  nothing found",
            (false, None) => "  press / to search",
        };
        vec![ListItem::new(Line::styled(msg, Style::default().fg(theme.muted)))]
    } else {
        paginator.results().iter().map(|hit| hit_item(hit, theme)).collect()
    };

    let list = List::new(items)
        .block(panel_block(title, state.draft.is_none(), theme))
        .highlight_style(Style::default().bg(theme.selection_bg));
    frame.render_stateful_widget(list, area, &mut state.search.list_state);
}

fn hit_item<'a>(hit: &'a SearchHit, theme: &Theme) -> ListItem<'a> {
    let mut lines = vec![Line::styled(
        format!(" {}", hit.title),
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];
    if let Some(highlight) = &hit.highlight {
        lines.push(highlighted_line(highlight, theme));
    }
    if !hit.tags.is_empty() {
        let tags: Vec<Span> = hit.tags.iter().map(|t| Span::styled(format!(" #{t}"), Style::default().fg(theme.tag))).collect();
        lines.push(Line::from(tags));
    }
    ListItem::new(lines)
}

/// Renders a server excerpt, turning `<em>…</em>` spans into emphasis.
fn highlighted_line<'a>(excerpt: &'a str, theme: &Theme) -> Line<'a> {
    let plain = Style::default().fg(theme.muted);
    let emphasis = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::raw("   ")];
    let mut rest = excerpt;
    while let Some(start) = rest.find("<em>") {
        spans.push(Span::styled(&rest[..start], plain));
        let after = &rest[start + "<em>".len()..];
        let end = after.find("</em>").unwrap_or(after.len());
        spans.push(Span::styled(&after[..end], emphasis));
        rest = after.get(end + "</em>".len()..).unwrap_or("");
    }
    spans.push(Span::styled(rest, plain));
    Line::from(spans)
}

/// `‹ 3 4 [5] 6 7 ›`, with the arrows shown only where the server says a page exists.
fn render_pages(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let paginator = &state.search.paginator;
    let Some(info) = paginator.page_info() else {
        return;
    };
    let enabled = Style::default().fg(theme.page_other);
    let disabled = Style::default().fg(theme.muted);

    let mut spans = vec![Span::styled(" ‹ ", if paginator.can_go_previous() { enabled } else { disabled })];
    for page in paginator.page_buttons() {
        let label = page + 1;
        if page == info.current_page {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default().fg(theme.page_current).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(format!(" {label} "), enabled));
        }
    }
    spans.push(Span::styled(" › ", if paginator.can_go_next() { enabled } else { disabled }));
    spans.push(Span::styled(format!("  of {}", info.total_pages), disabled));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draws the suggestion list directly under the query line, over the results.
fn render_dropdown(frame: &mut Frame, query_area: Rect, results_area: Rect, state: &AppState, theme: &Theme) {
    let suggestions = state.search.suggestions.suggestions();
    if suggestions.is_empty() {
        return;
    }
    let height = (suggestions.len() as u16 + 2).min(results_area.height);
    let area = Rect::new(query_area.x + 1, results_area.y, query_area.width.saturating_sub(2), height);

    let items: Vec<ListItem> = suggestions.iter().map(|s| suggestion_item(s, theme)).collect();
    let mut list_state = ListState::default().with_selected(state.search.suggestion_cursor);
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(
        List::new(items)
            .block(panel_block(" Suggestions ", true, theme))
            .highlight_style(Style::default().bg(theme.selection_bg)),
        area,
        &mut list_state,
    );
}

fn suggestion_item<'a>(suggestion: &'a AggregatedSuggestion, theme: &Theme) -> ListItem<'a> {
    let mut spans = vec![Span::raw(format!(" {} ", suggestion.text))];
    for tag in &suggestion.type_tags {
        let label = match tag {
            SuggestionType::Title => "TITLE",
            SuggestionType::Hashtag => "HASHTAG",
        };
        spans.push(Span::styled(format!(" {label}"), Style::default().fg(theme.suggestion_type)));
    }
    spans.push(Span::styled(
        format!("  ×{}", suggestion.total_match_count),
        Style::default().fg(theme.muted),
    ));
    ListItem::new(Line::from(spans))
}
