use crate::conversation::InputBuffer;
use crate::events::Mode;
use crate::ui::conversation::commands::{CommandEntry, ParsedCommand, command_entries, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter on ordinary text, including slash text that names no command; the caller
    /// decides whether it can be sent
    Submit,
    Command(ParsedCommand),
    None,
}

/// Key handling for the input buffer plus the slash command palette
#[derive(Debug, Clone)]
pub struct Composer {
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    pub fn palette_open(&self) -> bool {
        self.show_command_palette
    }

    pub fn filtered_commands(&self) -> &[CommandEntry] {
        &self.filtered_commands
    }

    pub fn selected_command(&self) -> Option<usize> {
        self.selected_command
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent, input: &mut InputBuffer) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    input.insert('\n');
                } else if let Some(command) = parse_slash_command(input.content()) {
                    input.clear();
                    self.close_command_palette();
                    return ComposerResult::Command(command);
                } else if self.show_command_palette && self.apply_selected_command(input) {
                    return ComposerResult::None;
                } else if !input.content().trim().is_empty() {
                    self.close_command_palette();
                    return ComposerResult::Submit;
                }
            }
            KeyCode::Up if self.show_command_palette => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette => self.move_command_selection(1),
            KeyCode::Esc if self.show_command_palette => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette => {
                self.apply_selected_command(input);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.insert(c);
                self.sync_palette(input, c.is_whitespace());
            }
            KeyCode::Backspace => {
                if input.backspace() {
                    self.sync_palette(input, false);
                }
            }
            KeyCode::Delete => {
                if input.delete() {
                    self.sync_palette(input, false);
                }
            }
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            _ => {}
        }

        ComposerResult::None
    }

    /// Open, refresh or close the palette to match what is typed.
    fn sync_palette(&mut self, input: &InputBuffer, typed_whitespace: bool) {
        let content = input.content();
        let is_command_word = content.starts_with('/') && !content.contains(char::is_whitespace);

        if !is_command_word || typed_whitespace {
            self.close_command_palette();
        } else if self.show_command_palette {
            self.refresh_command_palette(content);
        } else {
            self.open_command_palette(content);
        }
    }

    fn open_command_palette(&mut self, content: &str) {
        self.show_command_palette = true;
        self.selected_command = Some(0);
        self.refresh_command_palette(content);
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self, content: &str) {
        let query = content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command = Some(next as usize);
    }

    fn apply_selected_command(&mut self, input: &mut InputBuffer) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        input.set(format!("/{} ", entry.keyword));
        self.close_command_palette();
        true
    }
}

/// Borrowed view used to draw the composer for one frame
pub struct ComposerView<'a> {
    pub composer: &'a Composer,
    pub input: &'a InputBuffer,
    pub mode: Mode,
    pub pending: bool,
}

impl ComposerView<'_> {
    fn title(&self) -> String {
        if self.pending {
            format!("{} - waiting for reply, sending disabled", self.mode)
        } else {
            format!("{} - Enter to send, /help for commands", self.mode)
        }
    }

    /// Height needed to show the whole input, borders included.
    pub fn height(input: &InputBuffer, max: u16) -> u16 {
        let lines = input.content().split('\n').count() as u16;
        (lines + 2).clamp(3, max.max(3))
    }
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.input.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                "Ask something...",
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content: Vec<char> = self.input.content().chars().collect();
            content.insert(self.input.cursor().min(content.len()), '▌');
            let content: String = content.into_iter().collect();

            let lines: Vec<&str> = content.split('\n').collect();
            let skip = lines.len().saturating_sub(inner_area.height as usize);
            for (i, line_text) in lines.iter().skip(skip).enumerate() {
                let line = Line::from(vec![Span::raw(*line_text)]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }

        if self.composer.palette_open() {
            let filtered = self.composer.filtered_commands();
            let palette_height = (filtered.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            Clear.render(palette_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .border_style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            let selected = self.composer.selected_command();
            for (index, entry) in filtered.iter().enumerate().take(inner.height as usize) {
                let style = if selected == Some(index) {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" - ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);
                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}
