//! Application state for the TUI.
//!
//! Wraps the console with the UI-only state: focus, the selected grid column,
//! the row scroll position and the running flag.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::widgets::spinner::Spinner;
use super::Event;
use crate::console::{Console, ConsoleView};
use crate::error::Result;
use crate::query::QueryOutcome;

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Results,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Editor => Self::Results,
            Self::Results => Self::Editor,
        }
    }
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Execute the editor contents.
    Run,
    Quit,
}

/// Main application state.
pub struct App {
    pub console: Console,
    pub focus: Focus,
    /// Grid column that sort toggles apply to.
    pub selected_column: usize,
    /// First row of the current page drawn in the results pane.
    pub row_offset: usize,
    pub running: bool,
    spinner: Spinner,
}

impl App {
    /// Creates a new application state.
    pub fn new(console: Console) -> Self {
        Self {
            console,
            focus: Focus::default(),
            selected_column: 0,
            row_offset: 0,
            running: true,
            spinner: Spinner::initializing(),
        }
    }

    /// Spinner to animate, if anything is pending.
    pub fn spinner(&self) -> Option<&Spinner> {
        match self.console.view() {
            ConsoleView::Initializing => Some(&self.spinner),
            _ if self.console.is_executing() => Some(&self.spinner),
            _ => None,
        }
    }

    /// Starts an execution, returning the SQL the caller should run.
    pub fn begin_run(&mut self) -> Option<String> {
        let sql = self.console.begin_execution()?;
        self.spinner = Spinner::executing();
        Some(sql)
    }

    /// Applies a finished execution, keeps the column selection in range and
    /// scrolls back to the top.
    pub fn finish_run(&mut self, result: Result<QueryOutcome>) {
        self.console.finish_execution(result);
        let columns = self
            .console
            .pane()
            .grid()
            .map_or(0, |grid| grid.columns().len());
        self.selected_column = self.selected_column.min(columns.saturating_sub(1));
        self.row_offset = 0;
    }

    /// Handles an event and updates application state.
    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            // Terminal resize is handled automatically by ratatui
            Event::Resize(_, _) | Event::Tick => Action::None,
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind == KeyEventKind::Release {
            return Action::None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
                return Action::Quit;
            }
            KeyCode::Enter if ctrl => return self.run_action(),
            KeyCode::F(5) => return self.run_action(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.next();
                return Action::None;
            }
            _ => {}
        }

        if !matches!(self.console.view(), ConsoleView::Ready { .. }) {
            return Action::None;
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Results => self.handle_results_key(key),
        }
        Action::None
    }

    fn run_action(&self) -> Action {
        if self.console.editor().can_run() {
            Action::Run
        } else {
            Action::None
        }
    }

    /// Handles key events when the editor is focused.
    fn handle_editor_key(&mut self, key: KeyEvent) {
        let editor = self.console.editor_mut();
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => editor.insert(c),
            KeyCode::Enter => editor.newline(),
            KeyCode::Backspace => {
                editor.backspace();
            }
            KeyCode::Delete => {
                editor.delete();
            }
            KeyCode::Left => editor.move_left(),
            KeyCode::Right => editor.move_right(),
            KeyCode::Up => editor.move_up(),
            KeyCode::Down => editor.move_down(),
            KeyCode::Home => editor.move_line_start(),
            KeyCode::End => editor.move_line_end(),
            _ => {}
        }
    }

    /// Handles key events when the results grid is focused.
    fn handle_results_key(&mut self, key: KeyEvent) {
        let selected = self.selected_column;
        let Some(grid) = self.console.grid_mut() else {
            return;
        };
        let last_column = grid.columns().len().saturating_sub(1);
        let last_row = grid.visible_rows().len().saturating_sub(1);

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.row_offset = self.row_offset.min(last_row).saturating_sub(1);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.row_offset = (self.row_offset + 1).min(last_row);
                return;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_column = selected.saturating_sub(1);
                return;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected_column = (selected + 1).min(last_column);
                return;
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                if let Some(column) = grid.columns().get(selected).map(|c| c.id.clone()) {
                    grid.toggle_sort(&column);
                }
            }
            KeyCode::Char('c') => grid.clear_sort(),
            KeyCode::PageDown | KeyCode::Char('n') => grid.next_page(),
            KeyCode::PageUp | KeyCode::Char('p') => grid.previous_page(),
            KeyCode::Home | KeyCode::Char('g') => grid.first_page(),
            KeyCode::End | KeyCode::Char('G') => grid.last_page(),
            _ => return,
        }
        // Sorting and paging change which rows are on the page.
        self.row_offset = 0;
    }
}
