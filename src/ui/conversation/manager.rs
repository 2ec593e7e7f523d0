use crate::conversation::SendRejected;
use crate::events::Mode;
use crate::session::ChatSession;
use crate::ui::conversation::{
    Composer, ComposerResult, ComposerView, ConversationHistory, ParsedCommand, SlashCommand,
    get_help_text,
};
use crate::ui::widgets::{ModeToggle, Spinner, wrap_text};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const TITLE: &str = "lam-agent-unified";
const MAX_NOTICE_LINES: u16 = 4;
const MAX_COMPOSER_HEIGHT: u16 = 8;

/// Actions that can be requested by the conversation screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Display preferences for the conversation screen
#[derive(Debug, Clone, Copy)]
pub struct ScreenOptions {
    pub show_timestamps: bool,
    pub spinner_interval_ms: u64,
}

/// The single conversation screen: routes keys to the toggle, composer and session and
/// draws everything
pub struct ConversationManager {
    session: ChatSession,
    composer: Composer,
    options: ScreenOptions,
    scroll_back: u16,
    notice: Option<String>,
    history_area: Rect,
}

impl ConversationManager {
    pub fn new(session: ChatSession, options: ScreenOptions) -> Self {
        Self {
            session,
            composer: Composer::new(),
            options,
            scroll_back: 0,
            notice: None,
            history_area: Rect::default(),
        }
    }

    /// Fire the one startup health request.
    pub fn start(&mut self) {
        self.session.load_health();
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply whatever the background requests have delivered.
    pub fn tick(&mut self) -> bool {
        self.session.process_events() > 0
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            return ConversationAction::Exit;
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll(self.page_size() as i32);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.scroll(-(self.page_size() as i32));
                return ConversationAction::None;
            }
            _ => {}
        }

        if !self.composer.palette_open()
            && let Some(mode) = ModeToggle::new(self.session.state().mode()).selection(&key)
        {
            self.switch_mode(mode);
            return ConversationAction::None;
        }

        let input = self.session.state_mut().input_mut();
        match self.composer.handle_key(key, input) {
            ComposerResult::Submit => {
                self.submit();
                ConversationAction::None
            }
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ConversationAction::None,
        }
    }

    /// Insert pasted text at the cursor. Pasting never sends.
    pub fn paste(&mut self, text: &str) {
        let input = self.session.state_mut().input_mut();
        for c in text.chars().filter(|c| *c != '\r') {
            input.insert(c);
        }
    }

    fn submit(&mut self) {
        match self.session.send_message() {
            Ok(_) => {
                self.notice = None;
                self.scroll_back = 0;
            }
            Err(SendRejected::Pending) => {
                self.notice = Some("Still waiting for the previous reply.".to_string());
            }
            Err(SendRejected::Empty) => {}
        }
    }

    fn switch_mode(&mut self, mode: Mode) {
        self.session.select_mode(mode);
        self.notice = Some(format!("Mode: {} - {}", mode, mode.description()));
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        match command.command {
            SlashCommand::Mode => {
                match (command.argument(), command.mode_target()) {
                    (_, Some(mode)) => self.switch_mode(mode),
                    (None, None) => self.switch_mode(self.session.state().mode().next()),
                    (Some(arg), None) => {
                        self.notice = Some(format!(
                            "Unknown mode '{arg}'. Choose offline, web or hybrid."
                        ));
                    }
                }
                ConversationAction::None
            }
            SlashCommand::Health => {
                self.session.load_health();
                self.notice = None;
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }

    fn page_size(&self) -> u16 {
        self.history_area.height.saturating_sub(2).max(1)
    }

    fn scroll(&mut self, delta: i32) {
        let inner = Block::default().borders(Borders::ALL).inner(self.history_area);
        let max = self.history_widget().max_scroll_back(inner) as i32;
        self.scroll_back = (self.scroll_back as i32 + delta).clamp(0, max) as u16;
    }

    fn history_widget(&self) -> ConversationHistory<'_> {
        let state = self.session.state();
        let spinner = state
            .is_pending()
            .then(|| Spinner::now(self.options.spinner_interval_ms));
        ConversationHistory::new(state.conversation().entries())
            .pending(spinner)
            .show_timestamps(self.options.show_timestamps)
            .scroll_back(self.scroll_back)
    }

    /// Render the whole screen
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let state = self.session.state();

        let notice_height = self
            .notice
            .as_deref()
            .map(|n| (wrap_text(n, area.width as usize).len() as u16).min(MAX_NOTICE_LINES))
            .unwrap_or(0);
        let composer_height = ComposerView::height(state.input(), MAX_COMPOSER_HEIGHT);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),               // Title and mode toggle
                Constraint::Length(1),               // Status line
                Constraint::Length(notice_height),   // Notice
                Constraint::Min(5),                  // History
                Constraint::Length(composer_height), // Composer
            ])
            .split(area);

        let toggle = ModeToggle::new(state.mode());
        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(toggle.width())])
            .split(chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            ))),
            header[0],
        );
        frame.render_widget(toggle, header[1]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                state.status().to_string(),
                Style::default().fg(Color::LightBlue),
            )),
            chunks[1],
        );

        if let Some(notice) = self.notice.as_deref() {
            frame.render_widget(
                Paragraph::new(notice.to_string())
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true }),
                chunks[2],
            );
        }

        frame.render_widget(self.history_widget(), chunks[3]);

        frame.render_widget(
            ComposerView {
                composer: &self.composer,
                input: state.input(),
                mode: state.mode(),
                pending: state.is_pending(),
            },
            chunks[4],
        );

        self.history_area = chunks[3];
    }
}
