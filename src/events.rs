use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::api::{ChatResponse, HealthInfo};
use crate::error::ApiError;

/// Events delivered to the controller from background request tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A chat request resolved, successfully or not
    ChatResolved {
        seq: u64,
        outcome: Result<ChatResponse, ApiError>,
    },

    /// Health check `seq` resolved
    HealthLoaded {
        seq: u64,
        result: Result<HealthInfo, ApiError>,
    },
}

/// Retrieval/generation strategy sent with every chat request
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// Local model and local documents only
    Offline,
    /// Web search only
    Web,
    /// Local documents plus web search
    #[default]
    Hybrid,
}

impl Mode {
    /// Wire name, also used as the toggle label.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Offline => "answer from the local model and indexed documents",
            Mode::Web => "answer from live web search results",
            Mode::Hybrid => "combine local documents with web search",
        }
    }

    /// Parse a user or config supplied value, falling back to `Hybrid` for anything unknown.
    pub fn normalized(value: &str) -> Mode {
        value.trim().parse().unwrap_or_default()
    }

    pub fn next(self) -> Mode {
        match self {
            Mode::Offline => Mode::Web,
            Mode::Web => Mode::Hybrid,
            Mode::Hybrid => Mode::Offline,
        }
    }

    pub fn previous(self) -> Mode {
        match self {
            Mode::Offline => Mode::Hybrid,
            Mode::Web => Mode::Offline,
            Mode::Hybrid => Mode::Web,
        }
    }

    pub fn all() -> Vec<Mode> {
        Mode::iter().collect()
    }
}

/// Author of a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Entries are never mutated after they are appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
    pub sources: Option<Vec<String>>,
    pub timestamp: DateTime<Local>,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: None,
            timestamp: Local::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: Some(sources),
            timestamp: Local::now(),
        }
    }

    /// Assistant entry produced from a failed request. Carries no sources.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: None,
            timestamp: Local::now(),
        }
    }

    pub fn sources(&self) -> &[String] {
        self.sources.as_deref().unwrap_or_default()
    }
}
