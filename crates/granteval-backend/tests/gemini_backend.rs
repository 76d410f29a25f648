//! Integration tests for GeminiBackend against a mocked generateContent endpoint.

use std::time::Duration;

use granteval_backend::{Backend, BackendError, BackendSettings, GeminiBackend};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn backend_for(mock_server: &MockServer) -> GeminiBackend {
    let settings = BackendSettings::new("test-key").with_base_url(mock_server.uri());
    GeminiBackend::new(&settings).expect("failed to create backend")
}

fn candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": { "role": "model", "parts": [ { "text": text } ] },
                "finishReason": "STOP"
            }
        ]
    })
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [ { "role": "user", "parts": [ { "text": "score this" } ] } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("{\"summary\":\"ok\"}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let output = backend.generate("score this").await.expect("generate failed");

    assert_eq!(output.text, "{\"summary\":\"ok\"}");
    assert_eq!(output.model, "gemini-2.5-flash");
}

#[tokio::test]
async fn test_generate_uses_configured_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("hello")))
        .mount(&mock_server)
        .await;

    let settings = BackendSettings::new("test-key")
        .with_base_url(mock_server.uri())
        .with_model("gemini-1.5-pro");
    let backend = GeminiBackend::new(&settings).unwrap();

    let output = backend.generate("hi").await.unwrap();
    assert_eq!(output.text, "hello");
    assert_eq!(backend.model(), "gemini-1.5-pro");
}

#[tokio::test]
async fn test_generate_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.generate("prompt").await.unwrap_err();

    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_does_not_retry_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_generate_empty_candidate_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::EmptyResponse));
}

#[tokio::test]
async fn test_generate_non_json_body_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_generate_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_body("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let settings = BackendSettings::new("test-key")
        .with_base_url(mock_server.uri())
        .with_timeout(Duration::from_millis(100));
    let backend = GeminiBackend::new(&settings).unwrap();

    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_generate_connection_refused_is_transport_error() {
    let settings = BackendSettings::new("test-key").with_base_url("http://127.0.0.1:1");
    let backend = GeminiBackend::new(&settings).unwrap();

    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_transport_error_does_not_expose_credential() {
    let settings = BackendSettings::new("SECRET-KEY-123").with_base_url("http://127.0.0.1:1");
    let backend = GeminiBackend::new(&settings).unwrap();

    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
    assert!(
        !err.to_string().contains("SECRET-KEY-123"),
        "credential leaked into error: {}",
        err
    );
}

#[tokio::test]
async fn test_decode_error_does_not_expose_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let settings = BackendSettings::new("SECRET-KEY-123").with_base_url(mock_server.uri());
    let backend = GeminiBackend::new(&settings).unwrap();

    let err = backend.generate("prompt").await.unwrap_err();
    assert!(!err.to_string().contains("SECRET-KEY-123"));
}

#[tokio::test]
async fn test_credential_is_not_sent_in_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = backend_for(&mock_server).generate("prompt").await.unwrap();
    assert_eq!(output.text, "ok");
}
