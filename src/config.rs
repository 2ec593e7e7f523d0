use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::Mode;

pub const BACKEND_URL_ENV: &str = "LAM_CHAT_BACKEND_URL";
pub const MODE_ENV: &str = "LAM_CHAT_MODE";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin serving `/chat` and `/health`
    pub backend_url: String,

    /// Mode selected when the client starts
    #[serde(deserialize_with = "deserialize_mode")]
    pub default_mode: Mode,

    /// Client-side request timeout. Unset means requests may stay pending forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Where the terminal UI writes its log files
    pub log_dir: PathBuf,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub spinner_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            spinner_interval_ms: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_mode: Mode::Hybrid,
            request_timeout_secs: None,
            log_dir: Self::home_dir().join("logs"),
            ui: UiConfig::default(),
        }
    }
}

fn deserialize_mode<'de, D>(deserializer: D) -> std::result::Result<Mode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Mode::normalized(&raw))
}

/// Overrides supplied on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub mode: Option<Mode>,
}

impl Config {
    /// `~/.lam-chat`
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lam-chat")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load configuration from `path` (or the default location), then apply the
    /// environment and command line overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.backend_url = config.backend_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = self.to_toml()?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(mode) = lookup(MODE_ENV) {
            self.default_mode = Mode::normalized(&mode);
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.backend_url {
            self.backend_url = url.clone();
        }
        if let Some(mode) = overrides.mode {
            self.default_mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.default_mode, Mode::Hybrid);
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "backend_url = \"http://agent:9000\"\ndefault_mode = \"WEB\"\n\n[ui]\nshow_timestamps = false\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://agent:9000");
        assert_eq!(config.default_mode, Mode::Web);
        assert!(!config.ui.show_timestamps);
        assert_eq!(config.ui.spinner_interval_ms, 100);
    }

    #[test]
    fn unknown_mode_in_file_normalizes_to_hybrid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_mode = \"turbo\"\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().default_mode, Mode::Hybrid);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = [").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.backend_url = "http://example:1234".into();
        config.request_timeout_secs = Some(30);
        config.default_mode = Mode::Offline;
        config.save(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn cli_overrides_beat_environment() {
        let env: HashMap<&str, &str> =
            HashMap::from([(BACKEND_URL_ENV, "http://env:1"), (MODE_ENV, "offline")]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend_url, "http://env:1");
        assert_eq!(config.default_mode, Mode::Offline);

        config.apply_overrides(&Overrides {
            backend_url: Some("http://flag:2".into()),
            mode: Some(Mode::Web),
        });
        assert_eq!(config.backend_url, "http://flag:2");
        assert_eq!(config.default_mode, Mode::Web);
    }

    #[test]
    fn load_strips_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(
            Some(&dir.path().join("config.toml")),
            &Overrides {
                backend_url: Some("http://flag:2/".into()),
                mode: None,
            },
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://flag:2");
    }
}
