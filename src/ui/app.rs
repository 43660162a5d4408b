//! Main TUI application state and logic

use crate::parser::{Diagnostic, Node};
use crate::printer::{self, TreeRow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::Duration;

/// Rows moved by PgUp/PgDn
const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Tree,
    Source,
    Diagnostics,
}

impl FocusedPane {
    /// Move focus to the next pane (tree -> source -> diagnostics)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tree => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Tree,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Tree => FocusedPane::Diagnostics,
            FocusedPane::Source => FocusedPane::Tree,
            FocusedPane::Diagnostics => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The source code that was parsed
    pub source_code: String,

    /// Flattened translation unit, one row per node
    pub rows: Vec<TreeRow>,

    pub diagnostics: Vec<Diagnostic>,

    /// Lines carrying at least one diagnostic
    pub error_lines: FxHashSet<usize>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Selected tree row and selected diagnostic
    pub selected_row: usize,
    pub selected_diagnostic: usize,

    /// Per-pane scroll offsets
    pub tree_scroll: usize,
    pub source_scroll: usize,
    pub diagnostics_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app for a parsed translation unit
    pub fn new(source_code: String, unit: Node, diagnostics: Vec<Diagnostic>) -> Self {
        let rows = printer::flatten(&unit);
        let error_lines = diagnostics.iter().map(|d| d.location.line).collect();
        let status_message = match diagnostics.len() {
            0 => String::from("Parsed cleanly"),
            1 => String::from("1 syntax error"),
            n => format!("{} syntax errors", n),
        };

        App {
            source_code,
            rows,
            diagnostics,
            error_lines,
            focused_pane: FocusedPane::Tree,
            selected_row: 0,
            selected_diagnostic: 0,
            tree_scroll: 0,
            source_scroll: 0,
            diagnostics_scroll: 0,
            should_quit: false,
            status_message,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Source line the source pane should mark: the selected diagnostic when
    /// that pane has focus, otherwise the selected node.
    pub fn current_line(&self) -> usize {
        match self.focused_pane {
            FocusedPane::Diagnostics => self
                .diagnostics
                .get(self.selected_diagnostic)
                .map(|d| d.location.line),
            _ => self.rows.get(self.selected_row).map(|r| r.location.line),
        }
        .unwrap_or(1)
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        // Left: tree | Right: source over diagnostics
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(pane_area);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[1]);

        let current_line = self.current_line();

        super::panes::render_tree_pane(
            frame,
            columns[0],
            &self.rows,
            self.selected_row,
            self.focused_pane == FocusedPane::Tree,
            &mut self.tree_scroll,
        );

        super::panes::render_source_pane(
            frame,
            right_rows[0],
            &self.source_code,
            current_line,
            &self.error_lines,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_diagnostics_pane(
            frame,
            right_rows[1],
            &self.diagnostics,
            self.selected_diagnostic,
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.selected_row,
            self.rows.len(),
            self.diagnostics.len(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(PAGE as isize)),
            KeyCode::PageDown => self.move_selection(PAGE as isize),
            KeyCode::Home => self.move_selection(isize::MIN),
            KeyCode::End => self.move_selection(isize::MAX),
            _ => {}
        }
    }

    /// Move the cursor of the focused pane by `delta`, clamped to its range
    fn move_selection(&mut self, delta: isize) {
        match self.focused_pane {
            FocusedPane::Tree => {
                self.selected_row = step(self.selected_row, delta, self.rows.len());
                if let Some(row) = self.rows.get(self.selected_row) {
                    self.status_message = format!("{} @{}", row.label, row.location);
                }
            }
            FocusedPane::Diagnostics => {
                self.selected_diagnostic =
                    step(self.selected_diagnostic, delta, self.diagnostics.len());
                if let Some(diagnostic) = self.diagnostics.get(self.selected_diagnostic) {
                    self.status_message = diagnostic.message.clone();
                }
            }
            FocusedPane::Source => {
                let lines = self.source_code.lines().count();
                self.source_scroll = step(self.source_scroll, delta, lines);
            }
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}
