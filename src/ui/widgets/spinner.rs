use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Pending indicator. The frame is derived from elapsed time, so nothing is stored
/// between draws.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    elapsed_ms: u128,
    interval_ms: u64,
}

impl Spinner {
    pub fn new(elapsed_ms: u128, interval_ms: u64) -> Self {
        Self {
            elapsed_ms,
            interval_ms: interval_ms.max(1),
        }
    }

    /// Spinner for the current wall-clock time.
    pub fn now(interval_ms: u64) -> Self {
        let elapsed_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self::new(elapsed_ms, interval_ms)
    }

    pub fn frame(&self) -> &'static str {
        let index = (self.elapsed_ms / self.interval_ms as u128) % FRAMES.len() as u128;
        FRAMES[index as usize]
    }

    pub fn line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(self.frame(), Style::default().fg(Color::LightBlue)),
            Span::styled(" Generating...", Style::default().fg(Color::Gray)),
        ])
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}
