#![allow(missing_docs)]

//! HTTP gateway integration tests: validation (400/404), labeling flow, response shape.
//! Uses a scripted completion service so no network access is required.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use counsel_lab::test_support::ScriptedCompletion;
use counsel_lab::{CredentialMode, CredentialSource, Lab, LabConfig, RemoteConfig, router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn lab_config(dir: &Path) -> LabConfig {
    let key_file = dir.join("api_key.txt");
    let prompt_file = dir.join("prompt.txt");
    std::fs::write(&key_file, "sk-test").expect("write key");
    std::fs::write(&prompt_file, "prompt").expect("write prompt");
    LabConfig {
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

fn app(dir: &Path, service: ScriptedCompletion) -> Router {
    router(Lab::with_service(lab_config(dir), Arc::new(service)), 300)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Accepts connections and never answers.
async fn spawn_silent_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn start(app: &Router, name: &str) -> String {
    let (status, body) = post(app, "/start", json!({ "name": name })).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn health_reports_timeout_and_participants() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());
    start(&app, "Alice").await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["turn_timeout_secs"], 300);
    assert_eq!(body["active_participants"], 1);
}

#[tokio::test]
async fn start_rejects_blank_name() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());
    let (status, _) = post(&app, "/start", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_returns_token_and_first_session_view() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());
    let (status, body) = post(&app, "/start", json!({ "name": "Alice" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["accepted"], true);
    assert_eq!(body["view"]["participant"], "Alice");
    assert_eq!(body["view"]["session"], 1);
    assert_eq!(body["view"]["input_enabled"], true);
    assert_eq!(body["view"]["phase"], "no_pending");
}

#[tokio::test]
async fn message_validation_and_unknown_token() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());

    let (status, _) = post(&app, "/message", json!({ "token": "", "message": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = start(&app, "Alice").await;
    let (status, _) = post(&app, "/message", json!({ "token": token, "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/message",
        json!({ "token": "no-such-token", "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn label_request_needs_index_or_reason() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());
    let token = start(&app, "Alice").await;
    let (status, _) = post(&app, "/label", json!({ "token": token, "side": "good" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn labeled_turn_over_http() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(
        tmp.path(),
        ScriptedCompletion::new().three_options(["Stocks", "Bonds", "Cash"], "spread"),
    );
    let token = start(&app, "Alice").await;

    let (status, body) = post(
        &app,
        "/message",
        json!({ "token": token, "message": "I have spare money" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["phase"], "awaiting_label");
    assert_eq!(body["view"]["input_enabled"], false);
    assert_eq!(body["view"]["options"].as_array().map(Vec::len), Some(3));

    let (_, body) = post(
        &app,
        "/finalize",
        json!({ "token": token, "choice": 0 }),
    )
    .await;
    assert_eq!(body["accepted"], false);
    assert_eq!(body["notices"][0]["level"], "warning");

    let (_, body) = post(
        &app,
        "/label",
        json!({ "token": token, "side": "good", "index": 0, "reason": "clear" }),
    )
    .await;
    assert_eq!(body["view"]["options"][0]["good"], true);
    let (_, body) = post(
        &app,
        "/label",
        json!({ "token": token, "side": "bad", "index": 1 }),
    )
    .await;
    assert_eq!(body["view"]["options"][1]["bad"], true);
    let (_, body) = post(
        &app,
        "/label",
        json!({ "token": token, "side": "bad", "reason": "vague" }),
    )
    .await;
    assert_eq!(body["view"]["bad_reason"], "vague");

    let (status, body) = post(
        &app,
        "/finalize",
        json!({ "token": token, "choice": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["view"]["phase"], "no_pending");
    assert_eq!(body["view"]["option_set_id"], 2);
    assert_eq!(body["view"]["messages"][1]["role"], "assistant");
    assert_eq!(body["view"]["messages"][1]["content"], "Cash");

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/state/{token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = post(&app, "/export", json!({ "token": token })).await;
    assert_eq!(body["notices"][0]["level"], "info");
    assert!(tmp.path().join("turns.csv").exists());
}

#[tokio::test]
async fn advance_reaches_terminal_session_and_releases_the_token() {
    let tmp = TempDir::new().expect("tempdir");
    let app = app(tmp.path(), ScriptedCompletion::new());
    let token = start(&app, "Alice").await;

    let (_, body) = post(&app, "/advance", json!({ "token": token })).await;
    assert_eq!(body["view"]["session"], 2);
    let (status, body) = post(&app, "/advance", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["session"], 3);
    assert_eq!(body["view"]["experiment_ended"], true);
    assert_eq!(body["view"]["input_enabled"], false);
    assert_eq!(body["notices"][0]["level"], "info");

    let (status, _) = get(&app, &format!("/state/{token}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["active_participants"], 0);
}

#[tokio::test]
async fn slow_remote_mirror_does_not_turn_a_reply_into_a_timeout() {
    let tmp = TempDir::new().expect("tempdir");
    let mut config = lab_config(tmp.path());
    config.remote = Some(RemoteConfig {
        url: spawn_silent_listener().await,
        table: "turn_logs".to_string(),
        api_key: None,
        timeout_secs: 1,
    });
    let service = ScriptedCompletion::new()
        .reply(r#"{"answers": ["Keep saving."], "reasoning": "final"}"#);
    let app = router(Lab::with_service(config, Arc::new(service)), 1);
    let token = start(&app, "Alice").await;

    let (status, body) = post(&app, "/message", json!({ "token": token, "message": "hi" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["view"]["messages"][1]["content"], "Keep saving.");
    let notices = body["notices"].as_array().expect("notices");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["level"], "error");
    assert!(
        notices[0]["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("could not save turn log")
    );
    let log = std::fs::read_to_string(tmp.path().join("turns.jsonl")).expect("local log");
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn slow_completion_returns_504_with_fallback_in_state() {
    let tmp = TempDir::new().expect("tempdir");
    let service = ScriptedCompletion::new()
        .delayed(Duration::from_secs(5))
        .three_options(["a", "b", "c"], "r");
    let app = router(Lab::with_service(lab_config(tmp.path()), Arc::new(service)), 1);
    let token = start(&app, "Alice").await;

    let (status, _) = post(&app, "/message", json!({ "token": token, "message": "hi" })).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let (status, view) = get(&app, &format!("/state/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "no_pending");
    assert_eq!(view["input_enabled"], true);
    assert_eq!(view["messages"][1]["content"], counsel_lab::FALLBACK_REPLY);
}
