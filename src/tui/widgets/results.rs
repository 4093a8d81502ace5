//! Result pane widget for the TUI.
//!
//! Renders the current page of the result grid with column headers,
//! auto-sized columns, sort indicators and styled NULL values. Pages taller
//! than the pane are scrolled by a row offset.

use crate::console::ResultPane;
use crate::grid::{CellKind, ResultGrid};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::message::center_rect;
use super::spinner::Spinner;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Widget for rendering the results pane.
pub struct ResultsPane<'a> {
    pane: &'a ResultPane,
    selected_column: usize,
    row_offset: usize,
    focused: bool,
    spinner: Option<&'a Spinner>,
}

impl<'a> ResultsPane<'a> {
    /// Creates a new results pane widget.
    pub fn new(
        pane: &'a ResultPane,
        selected_column: usize,
        focused: bool,
        spinner: Option<&'a Spinner>,
    ) -> Self {
        Self {
            pane,
            selected_column,
            row_offset: 0,
            focused,
            spinner,
        }
    }

    /// Skips the first `offset` rows of the page.
    pub fn row_offset(mut self, offset: usize) -> Self {
        self.row_offset = offset;
        self
    }
}

/// Truncates a string to fit within the given width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}

/// Calculates the width of each column from its header and visible cells.
fn column_widths(grid: &ResultGrid) -> Vec<usize> {
    let rows = grid.visible_rows();
    grid.columns()
        .iter()
        .map(|column| {
            let header = grid.header_label(column).chars().count();
            rows.iter()
                .map(|row| grid.cell(row, column).text.chars().count())
                .fold(header, usize::max)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// First column to draw so that `selected` fits within `available` cells.
fn first_visible_column(widths: &[usize], selected: usize, available: usize) -> usize {
    let selected = selected.min(widths.len().saturating_sub(1));
    let mut first = selected;
    let mut used = widths.get(selected).map_or(0, |w| w + 3);

    while first > 0 && used + widths[first - 1] + 3 <= available {
        first -= 1;
        used += widths[first] + 3;
    }
    first
}

/// Renders a centered, dimmed message.
fn render_notice(text: &str, area: Rect, buf: &mut Buffer) {
    let width = (text.chars().count() as u16).min(area.width);
    let target = center_rect(width, 1, area);
    buf.set_string(target.x, target.y, text, Style::default().fg(Color::DarkGray));
}

fn render_error(message: &str, area: Rect, buf: &mut Buffer) {
    let width = area.width.saturating_sub(4).min(80);
    let height = area.height.min(message.lines().count() as u16 + 3);
    let target = center_rect(width, height, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Query Error ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    Paragraph::new(message)
        .style(Style::default().fg(Color::LightRed))
        .wrap(Wrap { trim: false })
        .block(block)
        .render(target, buf);
}

impl ResultsPane<'_> {
    fn render_grid(&self, grid: &ResultGrid, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let dim = Style::default().fg(Color::DarkGray);

        let rows = grid.visible_rows();
        // Header and separator take two lines of the table.
        let capacity = (area.height as usize).saturating_sub(3).max(1);
        let offset = self.row_offset.min(rows.len().saturating_sub(1));
        let shown = &rows[offset.min(rows.len())..];
        let shown = &shown[..shown.len().min(capacity)];

        // Summary and pagination bar
        let mut summary = grid.result().summary();
        if shown.len() < rows.len() {
            summary.push_str(&format!(
                " · rows {}-{} of {}",
                offset + 1,
                offset + shown.len(),
                rows.len()
            ));
        }
        buf.set_string(area.x, area.y, &summary, dim);

        let enabled = Style::default().fg(Color::White);
        let prev_style = if grid.can_previous_page() { enabled } else { dim };
        let next_style = if grid.can_next_page() { enabled } else { dim };
        let pager = Line::from(vec![
            Span::styled("◀ Previous", prev_style),
            Span::styled(format!("  {}  ", grid.page_label()), dim),
            Span::styled("Next ▶", next_style),
        ]);
        let pager_width = pager.width() as u16;
        if pager_width + summary.chars().count() as u16 + 2 <= area.width {
            buf.set_line(area.right() - pager_width, area.y, &pager, pager_width);
        }

        let table = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };
        if table.height < 3 {
            return;
        }

        let widths = column_widths(grid);
        let first = first_visible_column(&widths, self.selected_column, table.width as usize);
        let columns = &grid.columns()[first..];
        let widths = &widths[first..];

        let mut lines = Vec::new();

        // Header row
        let mut header = Vec::new();
        for (offset, (column, &width)) in columns.iter().zip(widths).enumerate() {
            let label = truncate(&grid.header_label(column), width);
            let mut style = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            if self.focused && first + offset == self.selected_column {
                style = style.add_modifier(Modifier::REVERSED);
            }
            header.push(Span::styled(format!(" {label:width$} "), style));
            header.push(Span::styled("│", dim));
        }
        lines.push(Line::from(header));

        // Header separator
        let separator: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        lines.push(Line::from(Span::styled(separator.join("┼"), dim)));

        // Data rows
        if rows.is_empty() {
            lines.push(Line::from(Span::styled(" No results", dim)));
        }
        for row in shown {
            let mut spans = Vec::new();
            for (column, &width) in columns.iter().zip(widths) {
                let cell = grid.cell(row, column);
                let text = truncate(&cell.text, width);
                let style = match cell.kind {
                    CellKind::Null => Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                    CellKind::Structured => Style::default().fg(Color::Yellow),
                    CellKind::Scalar => Style::default(),
                };
                spans.push(Span::styled(format!(" {text:width$} "), style));
                spans.push(Span::styled("│", dim));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).render(table, buf);
    }
}

impl Widget for ResultsPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Results ");
        let inner = block.inner(area);
        block.render(area, buf);

        match self.pane {
            ResultPane::Idle => render_notice("Run a query to see results", inner, buf),
            ResultPane::Loading => {
                let text = self
                    .spinner
                    .map(Spinner::display)
                    .unwrap_or_else(|| Spinner::executing().display());
                render_notice(&text, inner, buf);
            }
            ResultPane::Error(message) => render_error(message, inner, buf),
            ResultPane::Success(grid) => self.render_grid(grid, inner, buf),
        }
    }
}
