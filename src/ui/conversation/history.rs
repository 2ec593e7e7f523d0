//! Conversation history display component

use crate::events::{ConversationEntry, Role};
use crate::ui::widgets::{MessageBubble, SourceTags, Spinner};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Conversation history for one frame, anchored to the bottom
pub struct ConversationHistory<'a> {
    entries: &'a [ConversationEntry],
    pending: Option<Spinner>,
    show_timestamps: bool,
    scroll_back: u16,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(entries: &'a [ConversationEntry]) -> Self {
        Self {
            entries,
            pending: None,
            show_timestamps: true,
            scroll_back: 0,
        }
    }

    /// Show the spinner under the last entry.
    pub fn pending(mut self, spinner: Option<Spinner>) -> Self {
        self.pending = spinner;
        self
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// Lines scrolled up from the bottom.
    pub fn scroll_back(mut self, lines: u16) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Every line of the history at the given inner width.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line<'static>> = Vec::new();

        for entry in self.entries {
            let mut bubble = MessageBubble::new(entry.role, &entry.text);
            if self.show_timestamps {
                bubble = bubble.timestamp(entry.timestamp);
            }
            all_lines.extend(bubble.lines(width));

            if entry.role == Role::Assistant {
                let tag_width = MessageBubble::bubble_width(width) as u16;
                all_lines.extend(SourceTags::new(entry.sources()).lines(tag_width));
            }
            // spacing between messages
            all_lines.push(Line::default());
        }

        if let Some(spinner) = self.pending {
            all_lines.push(spinner.line());
        }

        all_lines
    }

    /// Largest useful scroll-back for the given inner area.
    pub fn max_scroll_back(&self, inner: Rect) -> u16 {
        let total = self.lines(inner.width).len();
        total.saturating_sub(inner.height as usize).min(u16::MAX as usize) as u16
    }

    fn welcome_lines() -> Vec<Line<'static>> {
        vec![
            Line::from(vec![Span::styled(
                "lam-agent-unified",
                Style::default().fg(Color::Green),
            )]),
            Line::default(),
            Line::from(vec![Span::styled(
                "Ask something below. Tab switches between offline, web and hybrid mode.",
                Style::default().fg(Color::Gray),
            )]),
            Line::from(vec![Span::styled(
                "Enter sends, Alt+Enter adds a new line, /help lists commands.",
                Style::default().fg(Color::DarkGray),
            )]),
        ]
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Conversation");
        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() && self.pending.is_none() {
            Paragraph::new(Self::welcome_lines())
                .alignment(Alignment::Center)
                .render(inner_area, buf);
            return;
        }

        // Show the bottom of the history, shifted up by the scroll-back
        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let bottom_start = total.saturating_sub(height);
        let start = bottom_start.saturating_sub(self.scroll_back as usize);
        let visible: Vec<Line<'static>> = all_lines.into_iter().skip(start).take(height).collect();

        Paragraph::new(visible).render(inner_area, buf);
    }
}
