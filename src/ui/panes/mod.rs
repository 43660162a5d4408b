//! TUI pane rendering modules
//!
//! This module provides the rendering logic for all visual panes in the TUI,
//! organized by responsibility for maintainability.
//!
//! # Pane Modules
//!
//! - [`tree`]: Flattened syntax tree with a selection cursor
//! - [`source`]: Source code display with syntax highlighting, the selected
//!   node's line and lines carrying diagnostics
//! - [`diagnostics`]: Syntax errors collected during recovery
//! - [`status`]: Status bar with keybindings and parse summary
//!
//! Each pane module exports a primary `render_*` function. Panes that scroll
//! take their offset by `&mut` and keep the cursor row visible with
//! [`follow_cursor`].

pub mod diagnostics;
pub mod source;
pub mod status;
pub mod tree;

// Re-export render functions for convenience
pub use diagnostics::render_diagnostics_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
pub use tree::render_tree_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

/// Adjust `offset` so that `cursor` lies inside a window of `height` rows.
pub fn follow_cursor(offset: usize, cursor: usize, height: usize) -> usize {
    let height = height.max(1);
    if cursor < offset {
        cursor
    } else if cursor >= offset + height {
        cursor + 1 - height
    } else {
        offset
    }
}

/// Border style shared by every pane.
pub(crate) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}
