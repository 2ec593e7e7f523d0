//! Terminal chat client for the lam-agent backend.
//!
//! The client keeps a single append-only conversation, sends each message to
//! `POST /chat` together with the selected [`Mode`], and shows a status line built from
//! `GET /health`. All state lives in [`ChatState`]; [`ChatSession`] issues the requests
//! and applies their outcomes.

pub mod api;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod logging;
pub mod session;
pub mod tui;
pub mod ui;

pub use api::{Backend, BackendClient, ChatResponse, HealthInfo};
pub use config::Config;
pub use conversation::{ChatState, Conversation};
pub use error::{ApiError, error_display_text};
pub use events::{ConversationEntry, Mode, Role};
pub use session::ChatSession;
