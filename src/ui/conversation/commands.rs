use std::str::FromStr;

use crate::events::Mode;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Switch to a different mode (offline, web, hybrid)
    Mode,
    /// Re-check backend health
    Health,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Target of `/mode <name>`. `None` when there is no argument or it names no mode.
    pub fn mode_target(&self) -> Option<Mode> {
        if self.command != SlashCommand::Mode {
            return None;
        }

        let arg = self.argument()?.trim().to_lowercase();
        match arg.as_str() {
            "o" | "off" | "local" => Some(Mode::Offline),
            "w" => Some(Mode::Web),
            "h" | "both" => Some(Mode::Hybrid),
            other => Mode::from_str(other).ok(),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Mode => "switch mode (offline, web, hybrid); no argument cycles",
            SlashCommand::Health => "re-check the backend status line",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim_start();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let rest: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head)
        .ok()
        .or_else(|| match head.as_str() {
            "q" | "exit" | "bye" => Some(SlashCommand::Quit),
            "m" => Some(SlashCommand::Mode),
            "status" => Some(SlashCommand::Health),
            "h" | "?" => Some(SlashCommand::Help),
            _ => None,
        })?;

    let argument = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Commands:");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("  /{} - {}", command_str, command.description()));
    }
    help.push_str("  | Keys: Enter send, Alt+Enter newline, Tab/Shift+Tab mode, PgUp/PgDn scroll, Ctrl+C quit");
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(
            parse_slash_command("/mode web"),
            Some(ParsedCommand {
                command: SlashCommand::Mode,
                argument: Some("web".into()),
            })
        );
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/EXIT").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/status").unwrap().command, SlashCommand::Health);
        assert_eq!(parse_slash_command("/help").unwrap().argument, None);
    }

    #[test]
    fn plain_text_and_unknown_commands_are_not_commands() {
        assert_eq!(parse_slash_command("hello /mode"), None);
        assert_eq!(parse_slash_command("/"), None);
        assert_eq!(parse_slash_command("/rag index"), None);
    }

    #[test]
    fn mode_target_accepts_names_and_short_forms() {
        let target = |s: &str| parse_slash_command(s).and_then(|c| c.mode_target());
        assert_eq!(target("/mode offline"), Some(Mode::Offline));
        assert_eq!(target("/mode W"), Some(Mode::Web));
        assert_eq!(target("/m hybrid"), Some(Mode::Hybrid));
        assert_eq!(target("/mode"), None);
        assert_eq!(target("/mode nonsense"), None);
        assert_eq!(target("/help web"), None);
    }

    #[test]
    fn entries_cover_every_command() {
        let keywords: Vec<&str> = command_entries().iter().map(|e| e.keyword).collect();
        assert_eq!(keywords, vec!["mode", "health", "help", "quit"]);
        assert!(get_help_text().contains("/health"));
    }
}
