//! Full-screen message panel for the initialization and failure screens.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Returns a rectangle of the given size centered in `area`.
pub fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

/// A titled panel with a body, centered on screen.
pub struct MessagePanel<'a> {
    title: &'a str,
    body: &'a str,
    tone: Tone,
}

impl<'a> MessagePanel<'a> {
    pub fn new(title: &'a str, body: &'a str, tone: Tone) -> Self {
        Self { title, body, tone }
    }

    /// Panel shown while the connection comes online.
    pub fn initializing(title: &'a str) -> Self {
        Self::new(
            title,
            "Loading extensions and connecting to Iceberg catalog...",
            Tone::Info,
        )
    }

    /// Panel shown when the connection failed to come online.
    pub fn init_failed(message: &'a str) -> Self {
        Self::new("Failed to Initialize Database", message, Tone::Error)
    }
}

impl Widget for MessagePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (accent, body_color) = match self.tone {
            Tone::Info => (Color::Cyan, Color::Gray),
            Tone::Error => (Color::Red, Color::LightRed),
        };

        let width = area.width.saturating_sub(4).min(72);
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let body_lines: usize = self
            .body
            .lines()
            .map(|line| line.chars().count().max(1).div_ceil(inner_width))
            .sum();
        let height = (body_lines as u16 + 4).min(area.height);
        let target = center_rect(width, height, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent));

        let mut lines = vec![
            Line::from(Span::styled(
                self.title,
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
        ];
        lines.extend(
            self.body
                .lines()
                .map(|line| Line::from(Span::styled(line, Style::default().fg(body_color)))),
        );

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(target, buf);
    }
}
