#![allow(missing_docs)]

//! `LlmClient` against a local chat-completions stand-in: request body and auth header.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use counsel_lab::{
    ADVISOR_PERSONA, CompletionRequest, CompletionService, CredentialMode, CredentialSource,
    Interaction, Lab, LabConfig, LlmClient, SessionState, WireMessage,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone)]
struct MockCompletions {
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    status: StatusCode,
    reply: Value,
}

async fn complete(
    State(mock): State<MockCompletions>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.seen.lock().await.push((headers, body));
    (mock.status, Json(mock.reply.clone()))
}

async fn spawn_completions(status: StatusCode, reply: Value) -> (String, MockCompletions) {
    let mock = MockCompletions {
        seen: Arc::new(Mutex::new(Vec::new())),
        status,
        reply,
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(complete))
        .with_state(mock.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/v1/chat/completions"), mock)
}

fn content_reply(content: &str) -> Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

fn lab_config(dir: &Path, inference_url: String) -> LabConfig {
    let key_file = dir.join("api_key.txt");
    let prompt_file = dir.join("prompt.txt");
    std::fs::write(&key_file, "sk-local").expect("write key");
    std::fs::write(&prompt_file, "Reply as JSON.").expect("write prompt");
    LabConfig {
        inference_url,
        model: "gpt-5.1".to_string(),
        credential: CredentialSource {
            mode: CredentialMode::File,
            env_var: "COUNSEL_LAB_TEST_UNUSED_KEY".to_string(),
            file: key_file,
        },
        prompt_path: prompt_file,
        log_path: dir.join("turns.jsonl"),
        reasoning_path: None,
        export_path: dir.join("turns.csv"),
        ..LabConfig::default()
    }
}

#[tokio::test]
async fn request_carries_fixed_generation_controls() {
    let tmp = TempDir::new().expect("tempdir");
    let (url, mock) = spawn_completions(
        StatusCode::OK,
        content_reply(r#"{"answers": ["Start an emergency fund."], "reasoning": "final"}"#),
    )
    .await;
    let lab = Lab::from_config(lab_config(tmp.path(), url));
    let mut state = SessionState::new();
    state.start("Alice").expect("start");

    let outcome = lab
        .handle(
            &mut state,
            Interaction::Message {
                text: "I have spare money".to_string(),
            },
        )
        .await;
    assert!(outcome.accepted);
    assert!(outcome.notices.is_empty(), "{:?}", outcome.notices);
    assert_eq!(
        state.messages().last().map(|m| m.content.as_str()),
        Some("Start an emergency fund.")
    );

    let seen = mock.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (headers, body) = &seen[0];
    assert_eq!(
        headers.get("authorization").and_then(|v| v.to_str().ok()),
        Some("Bearer sk-local")
    );
    assert_eq!(body["model"], "gpt-5.1");
    assert_eq!(body["response_format"], json!({ "type": "text" }));
    assert_eq!(body["verbosity"], "medium");
    assert_eq!(body["reasoning_effort"], "medium");
    assert_eq!(body["store"], false);
    assert_eq!(
        body["messages"],
        json!([
            { "role": "developer", "content": ADVISOR_PERSONA },
            { "role": "user", "content": "Reply as JSON." },
            { "role": "user", "content": "I have spare money" },
        ])
    );
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (url, _mock) = spawn_completions(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "rate limited" } }),
    )
    .await;
    let client = LlmClient::new(url, "gpt-5.1".to_string());

    let error = client
        .complete(CompletionRequest {
            api_key: "sk-local".to_string(),
            messages: vec![WireMessage::user("hi")],
        })
        .await
        .expect_err("status error");
    let message = error.to_string();
    assert!(message.contains("429"), "{message}");
    assert!(message.contains("rate limited"), "{message}");
}

#[tokio::test]
async fn missing_content_is_an_error() {
    let (url, _mock) = spawn_completions(StatusCode::OK, json!({ "choices": [] })).await;
    let client = LlmClient::new(url, "gpt-5.1".to_string());

    let error = client
        .complete(CompletionRequest {
            api_key: "sk-local".to_string(),
            messages: vec![WireMessage::user("hi")],
        })
        .await
        .expect_err("no choices");
    assert!(error.to_string().contains("no choices"));
}
