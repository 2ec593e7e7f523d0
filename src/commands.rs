//! One-shot subcommands that talk to the backend without the chat screen.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::api::{self, BACKEND_UNAVAILABLE, Backend};
use crate::config::Config;
use crate::conversation::ChatState;
use crate::events::Mode;

/// Send a single message and print the reply and its sources.
///
/// Returns `false` when nothing was sent or the request failed; the failure text goes to
/// `err` exactly as the chat screen would show it.
pub async fn ask(
    backend: &dyn Backend,
    message: &str,
    mode: Mode,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<bool> {
    let mut state = ChatState::new(mode);
    let Ok(request) = state.send_text(message) else {
        writeln!(err, "Nothing to send: the message is empty.")?;
        return Ok(false);
    };

    let outcome = backend.chat(&request.message, request.mode).await;
    let succeeded = outcome.is_ok();
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "chat request failed");
    }
    state.resolve_chat(request.seq, outcome);

    let reply = state
        .conversation()
        .last()
        .context("chat resolution appended no reply")?;

    if succeeded {
        writeln!(out, "{}", reply.text)?;
        if !reply.sources().is_empty() {
            writeln!(out, "Sources: {}", reply.sources().join(", "))?;
        }
    } else {
        writeln!(err, "{}", reply.text)?;
    }

    Ok(succeeded)
}

/// Print the health status line, or the raw health document with `json`.
pub async fn health(
    backend: &dyn Backend,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<bool> {
    match backend.health().await {
        Ok(info) => {
            if json {
                let text = serde_json::to_string_pretty(&info).context("Failed to serialize health")?;
                writeln!(out, "{text}")?;
            } else {
                writeln!(out, "{}", api::status_line(&info))?;
            }
            Ok(true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            writeln!(err, "{BACKEND_UNAVAILABLE}")?;
            Ok(false)
        }
    }
}

/// Print the effective configuration as TOML.
pub fn print_config(config: &Config, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", config.to_toml()?)?;
    Ok(())
}

/// Write the effective configuration to `path` so later runs pick it up.
pub fn write_config(config: &Config, path: &Path, out: &mut impl Write) -> Result<()> {
    config.save(path)?;
    tracing::info!(path = %path.display(), "config written");
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}
