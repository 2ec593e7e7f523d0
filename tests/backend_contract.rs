//! HTTP contract tests for the backend client and the chat session.
//!
//! Each test stands up a wiremock server playing the lam-agent backend and checks the
//! exact request shape the client sends and the conversation state it ends up with.

use std::sync::Arc;
use std::time::Duration;

use lam_chat::api::{BACKEND_UNAVAILABLE, Backend, BackendClient};
use lam_chat::error::ApiError;
use lam_chat::{ChatSession, Mode, Role};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(server.uri(), None).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// POST /chat
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_posts_message_and_mode_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"message": "hello", "mode": "hybrid"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "hi there",
            "sources": ["doc1"],
            "meta": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).chat("hello", Mode::Hybrid).await.unwrap();
    assert_eq!(response.reply, "hi there");
    assert_eq!(response.sources, vec!["doc1".to_string()]);
}

#[tokio::test]
async fn chat_server_error_maps_to_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).chat("hello", Mode::Web).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "Chat request failed: Internal Server Error");
}

#[tokio::test]
async fn chat_malformed_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).chat("hello", Mode::Web).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn chat_timeout_surfaces_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"reply": "late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri(), Some(Duration::from_millis(50))).unwrap();
    let err = client.chat("hello", Mode::Offline).await.unwrap_err();
    assert!(err.is_timeout());
}

// ────────────────────────────────────────────────────────────────────────────
// GET /health
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_parses_backend_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "model": "llama3:8b",
            "base_url": "http://localhost:11434",
            "web_enabled": true,
            "frontend_enabled": true,
            "submodules": {"langgraph": false, "deerflow": false, "copilotkit": true},
            "agents_available": false
        })))
        .mount(&server)
        .await;

    let info = client(&server).health().await.unwrap();
    assert_eq!(
        lam_chat::api::status_line(&info),
        "Model: llama3:8b | Web: on | CopilotKit: on"
    );
}

#[tokio::test]
async fn health_non_success_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).health().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch health");
}

// ────────────────────────────────────────────────────────────────────────────
// Session scenarios
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_in_hybrid_mode_yields_user_then_assistant_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"message": "hello", "mode": "hybrid"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "hi there",
            "sources": ["doc1"],
            "meta": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(Arc::new(client(&server)), Mode::Hybrid);
    session.state_mut().input_mut().set("hello");
    session.send_message().unwrap();
    assert!(session.state().input().is_empty());
    assert!(session.state().is_pending());

    session.next_event().await;
    let entries = session.state().conversation().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].role, entries[0].text.as_str()), (Role::User, "hello"));
    assert_eq!(entries[0].sources, None);
    assert_eq!((entries[1].role, entries[1].text.as_str()), (Role::Assistant, "hi there"));
    assert_eq!(entries[1].sources, Some(vec!["doc1".to_string()]));
    assert!(!session.state().is_pending());
}

#[tokio::test]
async fn server_error_yields_error_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(Arc::new(client(&server)), Mode::Hybrid);
    session.state_mut().input_mut().set("hello");
    session.send_message().unwrap();
    session.next_event().await;

    let entries = session.state().conversation().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "hello");
    assert_eq!(entries[1].role, Role::Assistant);
    assert_eq!(entries[1].text, "Chat request failed: Internal Server Error");
    assert_eq!(entries[1].sources, None);
}

#[tokio::test]
async fn whitespace_input_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(Arc::new(client(&server)), Mode::Hybrid);
    session.state_mut().input_mut().set("   ");
    assert!(session.send_message().is_err());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.process_events(), 0);
    assert!(session.state().conversation().is_empty());
}

#[tokio::test]
async fn unreachable_backend_reads_backend_unavailable() {
    // Nothing listens on the discard port
    let client = BackendClient::new("http://127.0.0.1:9", None).unwrap();
    let mut session = ChatSession::new(Arc::new(client), Mode::Hybrid);
    session.load_health();
    session.next_event().await;
    assert_eq!(session.state().status(), BACKEND_UNAVAILABLE);
}

#[tokio::test]
async fn unreachable_backend_chat_still_appends_one_entry() {
    let client = BackendClient::new("http://127.0.0.1:9", None).unwrap();
    let mut session = ChatSession::new(Arc::new(client), Mode::Web);
    session.state_mut().input_mut().set("hello");
    session.send_message().unwrap();
    session.next_event().await;

    let entries = session.state().conversation().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[1].text.starts_with("Network error:"));
    assert!(!session.state().is_pending());
}
