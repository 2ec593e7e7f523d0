use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::events::Mode;

/// Row of mode buttons with the active one highlighted. It only reports what the user
/// picked; the caller owns the selection.
#[derive(Debug, Clone, Copy)]
pub struct ModeToggle {
    active: Mode,
}

impl ModeToggle {
    pub fn new(active: Mode) -> Self {
        Self { active }
    }

    /// Map a key press to the mode it selects: `Tab`/`Shift+Tab` cycle,
    /// `Alt+1..3` pick directly.
    pub fn selection(&self, key: &KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(self.active.previous())
            }
            KeyCode::Tab => Some(self.active.next()),
            KeyCode::BackTab => Some(self.active.previous()),
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
                let index = c.to_digit(10)?.checked_sub(1)? as usize;
                Mode::all().get(index).copied()
            }
            _ => None,
        }
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, mode) in Mode::all().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if mode == self.active {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray).bg(Color::Black)
            };
            spans.push(Span::styled(format!(" {} ", mode.as_str()), style));
        }
        Line::from(spans)
    }

    pub fn width(&self) -> u16 {
        self.line().width() as u16
    }
}

impl Widget for ModeToggle {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}
