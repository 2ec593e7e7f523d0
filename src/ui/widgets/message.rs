use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::wrap_text;
use crate::events::Role;

/// One conversation entry: a role header followed by the wrapped text.
/// User messages sit on the right, assistant messages on the left.
#[derive(Debug, Clone, Copy)]
pub struct MessageBubble<'a> {
    role: Role,
    text: &'a str,
    timestamp: Option<DateTime<Local>>,
}

impl<'a> MessageBubble<'a> {
    pub fn new(role: Role, text: &'a str) -> Self {
        Self {
            role,
            text,
            timestamp: None,
        }
    }

    pub fn timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn alignment(&self) -> Alignment {
        match self.role {
            Role::User => Alignment::Right,
            Role::Assistant => Alignment::Left,
        }
    }

    fn content_style(&self) -> Style {
        match self.role {
            Role::User => Style::default().fg(Color::White).bg(Color::DarkGray),
            Role::Assistant => Style::default().fg(Color::White).bg(Color::Blue),
        }
    }

    fn header(&self) -> Line<'static> {
        let label = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let mut spans = vec![Span::styled(
            label,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(timestamp) = self.timestamp {
            spans.push(Span::styled(
                format!(" {}", timestamp.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans).alignment(self.alignment())
    }

    /// Bubbles take at most 70% of the available width, like the web client.
    pub fn bubble_width(width: u16) -> usize {
        ((width as usize) * 7 / 10).max(1)
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = vec![self.header()];
        let inner = Self::bubble_width(width).saturating_sub(2).max(1);
        for content_line in wrap_text(self.text, inner) {
            lines.push(
                Line::from(Span::styled(format!(" {content_line} "), self.content_style()))
                    .alignment(self.alignment()),
            );
        }
        lines
    }
}

impl Widget for MessageBubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines(area.width)).render(area, buf);
    }
}
