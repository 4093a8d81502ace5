//! SQL editor widget for the TUI.
//!
//! Renders the multi-line editor with a run hint and a run button that turns
//! into `Running...` while an execution is pending.

use crate::console::Editor;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Run button label while idle.
pub const RUN_LABEL: &str = "[ Run Query ]";

/// Run button label while an execution is pending.
pub const RUNNING_LABEL: &str = "[ Running... ]";

/// Keyboard hint shown under the editor.
pub const RUN_HINT: &str = "Ctrl+Enter to run (F5)";

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of lines (or columns) to skip from the start.
pub fn calculate_scroll_offset(cursor: usize, available: usize) -> usize {
    if available == 0 || cursor < available {
        0
    } else {
        cursor + 1 - available
    }
}

/// Editor pane widget.
pub struct EditorPane<'a> {
    editor: &'a Editor,
    focused: bool,
}

impl<'a> EditorPane<'a> {
    /// Creates a new editor pane widget.
    pub fn new(editor: &'a Editor, focused: bool) -> Self {
        Self { editor, focused }
    }

    /// Text area inside the borders, above the hint line.
    fn text_area(area: Rect) -> Rect {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        }
    }

    /// Screen position of the cursor when rendered into `area`.
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        let text = Self::text_area(area);
        if text.width == 0 || text.height == 0 {
            return None;
        }

        let (line, column) = self.editor.cursor_position();
        let row_offset = calculate_scroll_offset(line, text.height as usize);
        let col_offset = calculate_scroll_offset(column, text.width as usize);
        Some(Position::new(
            text.x + (column - col_offset) as u16,
            text.y + (line - row_offset) as u16,
        ))
    }
}

impl Widget for EditorPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Query ");
        block.render(area, buf);

        let text = Self::text_area(area);
        let (line, column) = self.editor.cursor_position();
        let row_offset = calculate_scroll_offset(line, text.height as usize);
        let col_offset = calculate_scroll_offset(column, text.width as usize);

        let lines: Vec<Line> = self
            .editor
            .lines()
            .skip(row_offset)
            .take(text.height as usize)
            .map(|l| Line::from(l.chars().skip(col_offset).collect::<String>()))
            .collect();
        Paragraph::new(lines).render(text, buf);

        // Hint and run button on the last inner line
        let footer_y = text.y + text.height;
        let inner_right = text.x + text.width;
        if footer_y >= area.bottom().saturating_sub(1) || text.width == 0 {
            return;
        }

        let hint_style = Style::default().fg(Color::DarkGray);
        buf.set_span(text.x, footer_y, &Span::styled(RUN_HINT, hint_style), text.width);

        let (label, style) = if self.editor.is_disabled() {
            (RUNNING_LABEL, Style::default().fg(Color::DarkGray))
        } else {
            (
                RUN_LABEL,
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let label_width = label.chars().count() as u16;
        if label_width + RUN_HINT.len() as u16 + 1 <= text.width {
            buf.set_string(inner_right - label_width, footer_y, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(editor: &Editor, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        EditorPane::new(editor, true).render(area, &mut buf);
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_scroll_offset_within_area() {
        assert_eq!(calculate_scroll_offset(5, 20), 0);
        assert_eq!(calculate_scroll_offset(19, 20), 0);
    }

    #[test]
    fn test_scroll_offset_beyond_area() {
        assert_eq!(calculate_scroll_offset(20, 20), 1);
        assert_eq!(calculate_scroll_offset(49, 20), 30);
        assert_eq!(calculate_scroll_offset(5, 0), 0);
    }

    #[test]
    fn test_renders_text_and_run_button() {
        let editor = Editor::new("SELECT 1;");
        let buf = render(&editor, 60, 6);

        assert!(row(&buf, 1).contains("SELECT 1;"));
        assert!(row(&buf, 4).contains(RUN_HINT));
        assert!(row(&buf, 4).contains(RUN_LABEL));
    }

    #[test]
    fn test_disabled_shows_running() {
        let mut editor = Editor::new("SELECT 1;");
        editor.set_disabled(true);
        let buf = render(&editor, 60, 6);
        assert!(row(&buf, 4).contains("Running..."));
    }

    #[test]
    fn test_cursor_position() {
        let editor = Editor::new("SELECT *\nFROM t");
        let pane = EditorPane::new(&editor, true);
        let pos = pane.cursor_position(Rect::new(0, 0, 40, 8)).unwrap();
        assert_eq!(pos, Position::new(1 + 6, 1 + 1));
    }
}
