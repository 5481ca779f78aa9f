//! End-to-end submit flows against a mock HTTP endpoint

use serde_json::{json, Value};
use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatwidget::controller::{
    ControllerOptions, ConversationController, SubmitOutcome, EMPTY_REPLY_TEXT, ERROR_REPLY_TEXT,
};
use chatwidget::endpoint::HttpEndpoint;
use chatwidget::message::Sender;
use chatwidget::storage::MemoryStore;

mod common;

fn controller_for(
    server: &MockServer,
) -> ConversationController<HttpEndpoint, Arc<MemoryStore>> {
    let endpoint = HttpEndpoint::new(&common::endpoint_config(&server.uri())).unwrap();
    ConversationController::new(
        endpoint,
        Arc::new(MemoryStore::new()),
        ControllerOptions::default(),
    )
}

#[tokio::test]
async fn test_submit_success_appends_reply_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": "Plan | Price\n---|---\nPro | $10"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let outcome = controller.submit("ping").await;

    let SubmitOutcome::Settled { user, reply } = outcome else {
        panic!("expected settled outcome");
    };
    assert_eq!(user.text, "ping");
    assert_eq!(reply.sender, Sender::Bot);
    assert_eq!(reply.text, "Plan | Price\n---|---\nPro | $10");
    assert_eq!(controller.history().len(), 2);
    assert!(!controller.is_pending());
}

#[tokio::test]
async fn test_request_body_carries_correlation_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "ok" })))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit("what time is it?").await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();

    assert_eq!(body["prompt"], "what time is it?");
    assert_eq!(body["sessionId"], controller.session_id());
    let request_id = body["requestId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
    assert_eq!(
        controller.history()[0].request_id.as_deref(),
        Some(request_id)
    );
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(body["clientContext"]["userAgent"]
        .as_str()
        .unwrap()
        .starts_with("chatwidget/"));
}

#[tokio::test]
async fn test_missing_output_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit("ping").await;

    assert_eq!(
        controller.history().last().unwrap().text,
        EMPTY_REPLY_TEXT
    );
}

#[tokio::test]
async fn test_server_error_uses_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit("ping").await;

    let last = controller.history().last().cloned().unwrap();
    assert_eq!(last.text, ERROR_REPLY_TEXT);
    assert_eq!(last.sender, Sender::Bot);
    assert!(!controller.is_pending());
}

#[tokio::test]
async fn test_malformed_body_uses_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit("ping").await;

    assert_eq!(controller.history().last().unwrap().text, ERROR_REPLY_TEXT);
}

#[tokio::test]
async fn test_unreachable_endpoint_uses_error_text() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let endpoint = HttpEndpoint::new(&common::endpoint_config(&uri)).unwrap();
    let controller = ConversationController::new(
        endpoint,
        MemoryStore::new(),
        ControllerOptions::default(),
    );
    controller.submit("ping").await;

    let history = controller.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].text, ERROR_REPLY_TEXT);
    assert!(!controller.is_pending());
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .and(header("x-widget-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "hi" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::endpoint_config(&server.uri());
    config
        .headers
        .insert("X-Widget-Key".to_string(), "secret".to_string());
    let controller = ConversationController::new(
        HttpEndpoint::new(&config).unwrap(),
        MemoryStore::new(),
        ControllerOptions::default(),
    );

    controller.submit("hello").await;
    assert_eq!(controller.last_bot_message().unwrap().text, "hi");
}

#[tokio::test]
async fn test_each_submit_adds_exactly_two_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "ack" })))
        .expect(3)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    for (i, prompt) in ["one", "two", "three"].iter().enumerate() {
        controller.submit(prompt).await;
        assert_eq!(controller.history().len(), (i + 1) * 2);
    }

    let history = controller.history();
    for pair in history.chunks(2) {
        assert_eq!(pair[0].sender, Sender::User);
        assert_eq!(pair[1].sender, Sender::Bot);
        assert_eq!(pair[0].request_id, pair[1].request_id);
    }
}
