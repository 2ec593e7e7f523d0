use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::BackendClient;
use crate::config::Config;
use crate::session::ChatSession;
use crate::ui::conversation::{ConversationAction, ConversationManager, ScreenOptions};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive chat screen until the user quits.
pub async fn run(config: &Config) -> Result<()> {
    let client = BackendClient::from_config(config).context("Failed to create HTTP client")?;
    tracing::info!(backend = %client.base_url(), mode = %config.default_mode, "starting chat screen");

    let session = ChatSession::new(Arc::new(client), config.default_mode);
    let mut screen = ConversationManager::new(
        session,
        ScreenOptions {
            show_timestamps: config.ui.show_timestamps,
            spinner_interval_ms: config.ui.spinner_interval_ms,
        },
    );

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut screen).await;
    restore_terminal(&mut terminal)?;

    tracing::info!(
        entries = screen.session().state().conversation().len(),
        "chat screen closed"
    );
    result
}

fn setup_terminal() -> Result<Tui> {
    install_panic_hook();
    enable_raw_mode().context("Failed to enable raw mode")?;

    let terminal = execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")
        .and_then(|()| {
            Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")
        });
    reset_on_error(terminal, reset_terminal)
}

/// Run `reset` when a setup step after raw mode was enabled has failed.
fn reset_on_error<T>(result: Result<T>, reset: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        reset();
    }
    result
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Best-effort restore for paths where the `Terminal` is unavailable.
fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste, Show);
}

/// Put the terminal back before the panic message is printed, otherwise it lands in
/// the alternate screen and the shell stays in raw mode.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        reset_terminal();
        previous(info);
    }));
}

async fn event_loop(terminal: &mut Tui, screen: &mut ConversationManager) -> Result<()> {
    screen.start();

    loop {
        screen.tick();
        terminal.draw(|f| screen.render(f))?;

        // Yield so request tasks make progress between input polls
        tokio::task::yield_now().await;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if screen.handle_key(key) == ConversationAction::Exit {
                    return Ok(());
                }
            }
            Event::Paste(text) => screen.paste(&text),
            Event::Resize(_, _) => terminal.autoresize()?,
            _ => {}
        }
    }
}
