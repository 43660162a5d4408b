//! Source code pane rendering with syntax highlighting
//!
//! This module renders the parsed C source with line numbers.
//!
//! # Features
//!
//! - Syntax highlighting driven by the front end's own keyword table
//! - The line of the selected node (or diagnostic) highlighted
//! - Lines carrying a diagnostic marked in the error colour
//!
//! # Rendering
//!
//! Highlighting runs a light per-line word splitter rather than the lexer, so
//! a line that does not tokenize on its own (inside a block comment, say)
//! still renders.

use super::border_style;
use crate::parser::token::{KEYWORDS, TokenKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rustc_hash::FxHashSet;

fn keyword_kind(word: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == word)
        .map(|(_, kind)| *kind)
}

fn word_style(word: &str, is_function: bool) -> Style {
    match keyword_kind(word) {
        Some(kind) if kind.is_type_specifier() || kind.is_type_qualifier() => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        Some(_) => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        None if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        None if is_function => Style::default().fg(DEFAULT_THEME.function),
        None => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Split a quoted run starting at `start` (the quote itself), honouring escapes.
fn quoted_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut end = start + 1;
    while end < chars.len() && chars[end] != quote {
        end += if chars[end] == '\\' { 2 } else { 1 };
    }
    (end + 1).min(chars.len())
}

/// Per-line syntax highlighting for C
pub fn highlight_source_code(line: &str) -> Line<'static> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    let flush = |word: &mut String, spans: &mut Vec<Span<'static>>, next: Option<char>| {
        if !word.is_empty() {
            let style = word_style(word, next == Some('('));
            spans.push(Span::styled(std::mem::take(word), style));
        }
    };

    while i < chars.len() {
        let c = chars[i];

        let is_line_comment = c == '/' && chars.get(i + 1) == Some(&'/');
        let is_directive = c == '#' && spans.is_empty() && word.is_empty();
        if is_line_comment || is_directive {
            flush(&mut word, &mut spans, None);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        if c == '"' || c == '\'' {
            flush(&mut word, &mut spans, None);
            let end = quoted_end(&chars, i);
            let text: String = chars[i..end].iter().collect();
            spans.push(Span::styled(text, Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        let in_number = word.starts_with(|d: char| d.is_ascii_digit());
        if c.is_alphanumeric() || c == '_' || (c == '.' && in_number) {
            word.push(c);
            i += 1;
            continue;
        }

        flush(&mut word, &mut spans, Some(c));
        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(c.to_string(), style));
        i += 1;
    }
    flush(&mut word, &mut spans, None);

    Line::from(spans)
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    error_lines: &FxHashSet<usize>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = source_code.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    // Keep the current line on screen unless the pane itself is being scrolled
    if !is_focused {
        *scroll = super::follow_cursor(*scroll, current_line.saturating_sub(1), visible_height);
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;
            let is_error = error_lines.contains(&line_num);

            let num_style = if is_error {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment) // Line numbers
            };
            let marker = if is_error { "✗" } else if is_current { "▶" } else { " " };

            let mut content = highlight_source_code(line);
            if is_current {
                let bg = if is_error {
                    Style::default().bg(DEFAULT_THEME.error).fg(Color::Black)
                } else {
                    Style::default().bg(DEFAULT_THEME.current_line_bg)
                };
                for span in &mut content.spans {
                    span.style = span.style.patch(bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
