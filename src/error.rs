use thiserror::Error;

/// Shown when an error carries no message of its own.
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";

/// Which backend call failed. Decides the wording of status failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    Health,
}

/// Failures talking to the backend. None of them are fatal to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{}", status_message(.endpoint, .status_text))]
    Status {
        endpoint: Endpoint,
        status: u16,
        status_text: String,
    },

    /// No response: connection refused, DNS failure, timeout and the like.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid response from backend: {0}")]
    Decode(String),
}

fn status_message(endpoint: &Endpoint, status_text: &str) -> String {
    match endpoint {
        Endpoint::Chat => format!("Chat request failed: {status_text}"),
        Endpoint::Health => "Failed to fetch health".to_string(),
    }
}

impl ApiError {
    pub fn status(endpoint: Endpoint, status: reqwest::StatusCode) -> Self {
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        ApiError::Status {
            endpoint,
            status: status.as_u16(),
            status_text,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(err) if err.is_timeout())
    }
}

/// Text shown in the conversation for a failed request: the error's own message, or
/// [`UNKNOWN_ERROR_TEXT`] when that message is blank.
pub fn error_display_text(error: &(dyn std::error::Error + 'static)) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_TEXT.to_string()
    } else {
        message
    }
}
