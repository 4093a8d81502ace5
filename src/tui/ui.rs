//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{
    editor::EditorPane, header::Header, message::MessagePanel, results::ResultsPane,
};
use crate::connection::ConnectionState;
use crate::console::{ConsoleView, Editor, ResultPane};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, body, key hints
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, main_layout[0], app);

    match app.console.view() {
        ConsoleView::Initializing => {
            let label = app
                .spinner()
                .map(|spinner| spinner.display())
                .unwrap_or_else(|| "Initializing DuckDB".to_string());
            frame.render_widget(MessagePanel::initializing(&label), main_layout[1]);
        }
        ConsoleView::Error { message } => {
            frame.render_widget(MessagePanel::init_failed(&message), main_layout[1]);
        }
        ConsoleView::Ready { editor, pane } => {
            render_workspace(frame, main_layout[1], app, editor, pane);
        }
    }

    render_hints(frame, main_layout[2], app);
}

/// Renders the header bar.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.console.manager().state();
    let info = match &state {
        ConnectionState::Ready(info) => Some(info.to_string()),
        _ => None,
    };
    let spinner = if app.console.is_executing() {
        app.spinner()
    } else {
        None
    };
    let widget = Header::new(info.as_deref(), spinner, state.is_ready());
    frame.render_widget(widget, area);
}

/// Renders the editor above the results pane.
fn render_workspace(frame: &mut Frame, area: Rect, app: &App, editor: &Editor, pane: &ResultPane) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let editor_focused = app.focus == Focus::Editor;
    let editor_pane = EditorPane::new(editor, editor_focused);
    let cursor = editor_pane.cursor_position(layout[0]);
    frame.render_widget(editor_pane, layout[0]);

    let loading = if app.console.is_executing() {
        app.spinner()
    } else {
        None
    };
    let results = ResultsPane::new(
        pane,
        app.selected_column,
        app.focus == Focus::Results,
        loading,
    )
    .row_offset(app.row_offset);
    frame.render_widget(results, layout[1]);

    // Position cursor in the editor when focused
    if editor_focused && !editor.is_disabled() {
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }
}

/// Renders the key hint line.
fn render_hints(frame: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = match (app.console.view(), app.focus) {
        (ConsoleView::Ready { .. }, Focus::Editor) => &[
            ("Ctrl+Enter/F5", "run"),
            ("Tab", "results"),
            ("Ctrl+Q", "quit"),
        ],
        (ConsoleView::Ready { .. }, Focus::Results) => &[
            ("←/→", "column"),
            ("↑/↓", "scroll"),
            ("s/c", "sort/clear"),
            ("n/p", "page"),
            ("g/G", "first/last"),
            ("Tab", "editor"),
            ("Ctrl+Q", "quit"),
        ],
        _ => &[("Ctrl+Q", "quit")],
    };

    let key_style = Style::default().fg(Color::Cyan);
    let text_style = Style::default().fg(Color::DarkGray);
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!(" {key}"), key_style),
                Span::styled(format!(" {action} "), text_style),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
