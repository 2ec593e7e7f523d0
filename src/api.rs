use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{ApiError, Endpoint};
use crate::events::Mode;

/// Status line shown when `/health` cannot be reached or fails.
pub const BACKEND_UNAVAILABLE: &str = "Backend unavailable";

/// Status line shown before the health request resolves.
pub const STATUS_LOADING: &str = "Loading...";

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub mode: Mode,
}

/// Successful body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default, deserialize_with = "deserialize_sources")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub model: String,
    pub web_enabled: bool,
    #[serde(default)]
    pub submodules: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents_available: Option<bool>,
}

impl HealthInfo {
    /// Whether a named submodule reports itself enabled. Unknown names count as disabled.
    pub fn submodule_enabled(&self, name: &str) -> bool {
        self.submodules.get(name).copied().unwrap_or(false)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// One-line summary rendered under the title bar.
pub fn status_line(info: &HealthInfo) -> String {
    format!(
        "Model: {} | Web: {} | CopilotKit: {}",
        info.model,
        on_off(info.web_enabled),
        on_off(info.submodule_enabled("copilotkit")),
    )
}

/// Status line for a resolved health request.
pub fn status_from_health(result: &Result<HealthInfo, ApiError>) -> String {
    match result {
        Ok(info) => status_line(info),
        Err(_) => BACKEND_UNAVAILABLE.to_string(),
    }
}

const SOURCE_LABEL_KEYS: [&str; 5] = ["title", "source", "url", "path", "id"];

/// Reduce one source returned by the backend to a display label.
pub fn source_label(source: &Value) -> String {
    match source {
        Value::String(label) => label.clone(),
        Value::Object(fields) => SOURCE_LABEL_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| source.to_string()),
        other => other.to_string(),
    }
}

fn deserialize_sources<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().map(source_label).collect())
}

/// The two calls the client makes against the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn chat(&self, message: &str, mode: Mode) -> Result<ChatResponse, ApiError>;

    async fn health(&self) -> Result<HealthInfo, ApiError>;
}

/// HTTP client for the lam-agent backend
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            config.backend_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::status(endpoint, status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn chat(&self, message: &str, mode: Mode) -> Result<ChatResponse, ApiError> {
        let payload = ChatRequest {
            message: message.to_string(),
            mode,
        };

        tracing::debug!(mode = %mode, chars = message.chars().count(), "sending chat request");
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&payload)
            .send()
            .await?;

        Self::decode(Endpoint::Chat, response).await
    }

    async fn health(&self) -> Result<HealthInfo, ApiError> {
        tracing::debug!(url = %self.base_url, "fetching backend health");
        let response = self.client.get(self.url("/health")).send().await?;
        Self::decode(Endpoint::Health, response).await
    }
}
