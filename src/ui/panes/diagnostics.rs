//! Diagnostics pane: one row per recorded error, in source order.

use super::{border_style, follow_cursor};
use crate::parser::Diagnostic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render_diagnostics_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[Diagnostic],
    selected: usize,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Diagnostics ({}) ", diagnostics.len()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if diagnostics.is_empty() {
        let ok = Paragraph::new(Line::from(Span::styled(
            " No syntax errors",
            Style::default().fg(DEFAULT_THEME.success),
        )))
        .block(block);
        frame.render_widget(ok, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = follow_cursor(*scroll, selected, visible_height);

    let lines: Vec<Line> = diagnostics
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, diagnostic)| {
            let mut spans = vec![
                Span::styled(
                    format!("{:>4}:{:<4}", diagnostic.location.line, diagnostic.location.column),
                    Style::default().fg(DEFAULT_THEME.error),
                ),
                Span::styled(diagnostic.message.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ];
            if is_focused && idx == selected {
                for span in &mut spans {
                    span.style = span
                        .style
                        .bg(DEFAULT_THEME.selection_bg)
                        .add_modifier(Modifier::BOLD);
                }
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
