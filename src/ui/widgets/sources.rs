use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Citation labels shown under an assistant reply, one tag per source in the order the
/// backend returned them. An empty list renders nothing at all.
#[derive(Debug, Clone, Copy)]
pub struct SourceTags<'a> {
    sources: &'a [String],
}

impl<'a> SourceTags<'a> {
    pub fn new(sources: &'a [String]) -> Self {
        Self { sources }
    }

    fn tag_style() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    /// One span per source.
    pub fn tags(&self) -> Vec<Span<'static>> {
        self.sources
            .iter()
            .map(|source| Span::styled(format!(" {source} "), Self::tag_style()))
            .collect()
    }

    /// Tags packed greedily into lines no wider than `width`.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        let mut lines = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0;

        for tag in self.tags() {
            let tag_width = tag.width();
            if !current.is_empty() && current_width + 1 + tag_width > width {
                lines.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(Span::raw(" "));
                current_width += 1;
            }
            current_width += tag_width;
            current.push(tag);
        }

        if !current.is_empty() {
            lines.push(Line::from(current));
        }
        lines
    }
}

impl Widget for SourceTags<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(area.width);
        if lines.is_empty() {
            return;
        }
        Paragraph::new(lines).render(area, buf);
    }
}
