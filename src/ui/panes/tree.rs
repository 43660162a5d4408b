//! Syntax tree pane
//!
//! Shows the flattened translation unit one node per row, indented by depth,
//! with the kind name, the literal (operator, name or constant) and the
//! source position.

use super::{border_style, follow_cursor};
use crate::printer::TreeRow;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

fn row_line(row: &TreeRow, is_selected: bool) -> Line<'_> {
    let (kind, literal) = match row.label.split_once(' ') {
        Some((kind, literal)) => (kind, Some(literal)),
        None => (row.label.as_str(), None),
    };

    let mut spans = vec![
        Span::raw("  ".repeat(row.depth)),
        Span::styled(kind, Style::default().fg(DEFAULT_THEME.node_kind)),
    ];
    if let Some(literal) = literal {
        let color = if literal.starts_with(|c: char| c.is_ascii_digit() || c == '"' || c == '\'') {
            DEFAULT_THEME.number
        } else {
            DEFAULT_THEME.fg
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(literal, Style::default().fg(color)));
    }
    spans.push(Span::styled(
        format!(" @{}", row.location),
        Style::default().fg(DEFAULT_THEME.comment),
    ));

    if is_selected {
        for span in &mut spans {
            span.style = span
                .style
                .bg(DEFAULT_THEME.selection_bg)
                .add_modifier(Modifier::BOLD);
        }
    }
    Line::from(spans)
}

/// Render the tree pane
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    rows: &[TreeRow],
    selected: usize,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Syntax Tree ({} nodes) ", rows.len()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = follow_cursor(*scroll, selected, visible_height);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, row)| row_line(row, idx == selected))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
