use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::Backend;
use crate::conversation::{ChatState, Resolution, SendRejected};
use crate::events::{AppEvent, Mode};

/// Owns the chat state and the backend, issues requests on background tasks and applies
/// their outcomes in arrival order.
pub struct ChatSession {
    state: ChatState,
    backend: Arc<dyn Backend>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, mode: Mode) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: ChatState::new(mode),
            backend,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ChatState {
        &mut self.state
    }

    pub fn select_mode(&mut self, mode: Mode) {
        if mode != self.state.mode() {
            tracing::info!(from = %self.state.mode(), to = %mode, "mode changed");
        }
        self.state.select_mode(mode);
    }

    /// Send whatever is in the input buffer with the current mode.
    pub fn send_message(&mut self) -> Result<u64, SendRejected> {
        let request = self.state.begin_send()?;
        let seq = request.seq;

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tracing::debug!(seq, mode = %request.mode, "dispatching chat request");
        tokio::spawn(async move {
            let outcome = backend.chat(&request.message, request.mode).await;
            let _ = tx.send(AppEvent::ChatResolved {
                seq: request.seq,
                outcome,
            });
        });

        Ok(seq)
    }

    /// Fetch backend health once; the status line updates when it resolves.
    pub fn load_health(&mut self) -> u64 {
        let seq = self.state.begin_health();
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.health().await;
            let _ = tx.send(AppEvent::HealthLoaded { seq, result });
        });
        seq
    }

    /// Apply every event that has already arrived without waiting. Returns how many
    /// were applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::ChatResolved { seq, outcome } => {
                match &outcome {
                    Ok(response) => {
                        tracing::info!(seq, sources = response.sources.len(), "chat reply received")
                    }
                    Err(err) => tracing::warn!(seq, error = %err, "chat request failed"),
                }
                if self.state.resolve_chat(seq, outcome) == Resolution::Stale {
                    tracing::warn!(seq, in_flight = ?self.state.in_flight(), "discarding stale chat resolution");
                }
            }
            AppEvent::HealthLoaded { seq, result } => {
                match &result {
                    Ok(info) => tracing::info!(seq, model = %info.model, web = info.web_enabled, "backend healthy"),
                    Err(err) => tracing::warn!(seq, error = %err, "health check failed"),
                }
                if self.state.apply_health(seq, &result) == Resolution::Stale {
                    tracing::debug!(seq, "discarding superseded health result");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BACKEND_UNAVAILABLE, ChatResponse, HealthInfo};
    use crate::error::{ApiError, Endpoint};
    use crate::events::Role;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Backend that records calls and answers once released.
    #[derive(Default)]
    struct ScriptedBackend {
        calls: Mutex<Vec<(String, Mode)>>,
        fail_with: Option<reqwest::StatusCode>,
        release: Notify,
        gated: bool,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn chat(&self, message: &str, mode: Mode) -> Result<ChatResponse, ApiError> {
            self.calls.lock().unwrap().push((message.to_string(), mode));
            if self.gated {
                self.release.notified().await;
            }
            match self.fail_with {
                Some(status) => Err(ApiError::status(Endpoint::Chat, status)),
                None => Ok(ChatResponse {
                    reply: format!("echo: {message}"),
                    sources: vec!["doc1".into(), "doc2".into()],
                    meta: Default::default(),
                }),
            }
        }

        async fn health(&self) -> Result<HealthInfo, ApiError> {
            match self.fail_with {
                Some(status) => Err(ApiError::status(Endpoint::Health, status)),
                None => Ok(HealthInfo {
                    model: "llama3:8b".into(),
                    web_enabled: true,
                    submodules: BTreeMap::from([("copilotkit".to_string(), true)]),
                    status: None,
                    base_url: None,
                    frontend_enabled: None,
                    agents_available: None,
                }),
            }
        }
    }

    #[tokio::test]
    async fn send_resolves_to_exactly_two_entries() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend.clone(), Mode::Hybrid);

        session.state_mut().input_mut().set("hello");
        session.send_message().unwrap();
        assert!(session.state().input().is_empty());
        assert!(session.state().is_pending());

        assert!(session.next_event().await);
        let entries = session.state().conversation().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(entries[1].text, "echo: hello");
        assert_eq!(entries[1].sources(), ["doc1".to_string(), "doc2".to_string()]);
        assert!(!session.state().is_pending());
        assert_eq!(
            backend.calls.lock().unwrap().as_slice(),
            [("hello".to_string(), Mode::Hybrid)]
        );
    }

    #[tokio::test]
    async fn failure_still_appends_one_assistant_entry() {
        let backend = Arc::new(ScriptedBackend {
            fail_with: Some(reqwest::StatusCode::BAD_GATEWAY),
            ..Default::default()
        });
        let mut session = ChatSession::new(backend, Mode::Web);
        session.state_mut().input_mut().set("hello");
        session.send_message().unwrap();
        session.next_event().await;

        let entries = session.state().conversation().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "Chat request failed: Bad Gateway");
    }

    #[tokio::test]
    async fn whitespace_sends_nothing() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = ChatSession::new(backend.clone(), Mode::Hybrid);
        session.state_mut().input_mut().set(" \n\t ");

        assert_eq!(session.send_message(), Err(SendRejected::Empty));
        tokio::task::yield_now().await;
        assert_eq!(session.process_events(), 0);
        assert!(session.state().conversation().is_empty());
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_holds_until_the_response_arrives() {
        let backend = Arc::new(ScriptedBackend {
            gated: true,
            ..Default::default()
        });
        let mut session = ChatSession::new(backend.clone(), Mode::Offline);
        session.state_mut().input_mut().set("first");
        session.send_message().unwrap();

        for _ in 0..5 {
            tokio::task::yield_now().await;
            session.process_events();
        }
        assert!(session.state().is_pending());
        assert_eq!(session.state().conversation().len(), 1);

        session.state_mut().input_mut().set("second");
        assert_eq!(session.send_message(), Err(SendRejected::Pending));

        backend.release.notify_one();
        session.next_event().await;
        assert!(!session.state().is_pending());
        assert_eq!(session.state().conversation().len(), 2);
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn health_sets_status_line() {
        let mut session = ChatSession::new(Arc::new(ScriptedBackend::default()), Mode::Hybrid);
        session.load_health();
        assert_eq!(session.state().status(), "Loading...");
        session.next_event().await;
        assert_eq!(
            session.state().status(),
            "Model: llama3:8b | Web: on | CopilotKit: on"
        );
        assert!(session.state().conversation().is_empty());
    }

    #[tokio::test]
    async fn rechecked_health_ignores_the_older_result() {
        let mut session = ChatSession::new(Arc::new(ScriptedBackend::default()), Mode::Hybrid);
        let first = session.load_health();
        let second = session.load_health();
        assert!(second > first);

        session.next_event().await;
        session.next_event().await;
        assert_eq!(
            session.state().status(),
            "Model: llama3:8b | Web: on | CopilotKit: on"
        );

        session.state_mut().begin_health();
        let stale = Err(ApiError::status(Endpoint::Health, reqwest::StatusCode::BAD_GATEWAY));
        session.apply(AppEvent::HealthLoaded { seq: second, result: stale });
        assert_eq!(session.state().status(), "Loading...");
    }

    #[tokio::test]
    async fn failed_health_reads_backend_unavailable() {
        let backend = Arc::new(ScriptedBackend {
            fail_with: Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ..Default::default()
        });
        let mut session = ChatSession::new(backend, Mode::Hybrid);
        session.load_health();
        session.next_event().await;
        assert_eq!(session.state().status(), BACKEND_UNAVAILABLE);
    }
}
