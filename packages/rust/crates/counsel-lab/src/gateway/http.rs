//! HTTP gateway: one JSON endpoint per participant action.
//!
//! `POST /start` issues a participant token; every other action names that
//! token. Malformed or empty fields are 400, unknown tokens 404. Actions the
//! state machine refuses return 200 with `accepted: false` and a warning.
//! The completion step of a message turn is limited by a timeout; on expiry
//! the turn falls back and the request returns 504. Ended participants are
//! released after their final advance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};

use crate::lab::{Interaction, Lab, Notice, Outcome};
use crate::turn::{LabelSide, SessionState};
use crate::view::SessionView;

/// Default timeout for one message turn (completion call included).
const TURN_TIMEOUT_SECS: u64 = 300;

type Participants = Arc<RwLock<HashMap<String, Arc<Mutex<SessionState>>>>>;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub token: String,
    pub message: String,
}

/// With `index`, marks that option (and optionally sets the reason);
/// without it, only edits the reason for `side`.
#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub token: String,
    pub side: LabelSide,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub token: String,
    pub choice: usize,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub token: String,
    pub accepted: bool,
    pub notices: Vec<Notice>,
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub turn_timeout_secs: u64,
    pub active_participants: usize,
}

/// Shared state for the HTTP server: lab + one session state per participant token.
///
/// Only running participants are held. A token is released once its session
/// reaches the terminal screen; the advance response carries the final view.
#[derive(Clone)]
pub struct GatewayState {
    pub lab: Arc<Lab>,
    pub participants: Participants,
    pub turn_timeout_secs: u64,
}

type HandlerError = (StatusCode, String);

fn non_empty(value: &str, field: &str) -> Result<String, HandlerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err((StatusCode::BAD_REQUEST, format!("{field} must be non-empty")));
    }
    Ok(trimmed.to_string())
}

/// Validate request body; returns error for empty token or message.
pub fn validate_message_request(body: &MessageRequest) -> Result<(String, String), HandlerError> {
    let token = non_empty(&body.token, "token")?;
    let message = non_empty(&body.message, "message")?;
    Ok((token, message))
}

/// Map a label request to an interaction; 400 when it would do nothing.
pub fn label_interaction(body: &LabelRequest) -> Result<Interaction, HandlerError> {
    match (body.index, body.reason.clone()) {
        (Some(index), reason) => Ok(Interaction::Mark {
            side: body.side,
            index,
            reason,
        }),
        (None, Some(reason)) => Ok(Interaction::SetReason {
            side: body.side,
            reason,
        }),
        (None, None) => Err((
            StatusCode::BAD_REQUEST,
            "label request needs an index or a reason".to_string(),
        )),
    }
}

async fn participant(
    state: &GatewayState,
    token: &str,
) -> Result<Arc<Mutex<SessionState>>, HandlerError> {
    let token = non_empty(token, "token")?;
    state
        .participants
        .read()
        .await
        .get(&token)
        .cloned()
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown participant token: {token}")))
}

fn respond(lab: &Lab, token: String, outcome: Outcome, session: &SessionState) -> Json<InteractionResponse> {
    Json(InteractionResponse {
        token,
        accepted: outcome.accepted,
        notices: outcome.notices,
        view: SessionView::build(lab, session),
    })
}

async fn run_interaction(
    state: &GatewayState,
    token: String,
    interaction: Interaction,
) -> Result<Json<InteractionResponse>, HandlerError> {
    let entry = participant(state, &token).await?;
    let mut session = entry.lock().await;
    let outcome = state.lab.handle(&mut session, interaction).await;
    Ok(respond(&state.lab, token, outcome, &session))
}

async fn handle_start(
    State(state): State<GatewayState>,
    Json(body): Json<StartRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    let mut session = SessionState::new();
    let outcome = state
        .lab
        .handle(&mut session, Interaction::Start { name: body.name })
        .await;
    if !outcome.accepted {
        let message = outcome
            .notices
            .first()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "name must be non-empty".to_string());
        return Err((StatusCode::BAD_REQUEST, message));
    }
    let token = uuid::Uuid::new_v4().to_string();
    let response = respond(&state.lab, token.clone(), outcome, &session);
    state
        .participants
        .write()
        .await
        .insert(token, Arc::new(Mutex::new(session)));
    Ok(response)
}

async fn handle_state(
    State(state): State<GatewayState>,
    Path(token): Path<String>,
) -> Result<Json<SessionView>, HandlerError> {
    let entry = participant(&state, &token).await?;
    let session = entry.lock().await;
    Ok(Json(SessionView::build(&state.lab, &session)))
}

async fn handle_message(
    State(state): State<GatewayState>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    let (token, message) = validate_message_request(&body)?;
    let entry = participant(&state, &token).await?;
    let mut session = entry.lock().await;
    let turn = state
        .lab
        .submit_message_within(
            &mut session,
            &message,
            Duration::from_secs(state.turn_timeout_secs),
        )
        .await;
    match turn.timed_out {
        None => Ok(respond(&state.lab, token, turn.outcome, &session)),
        Some(reason) => Err((StatusCode::GATEWAY_TIMEOUT, reason)),
    }
}

async fn handle_label(
    State(state): State<GatewayState>,
    Json(body): Json<LabelRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    let interaction = label_interaction(&body)?;
    run_interaction(&state, body.token, interaction).await
}

async fn handle_finalize(
    State(state): State<GatewayState>,
    Json(body): Json<FinalizeRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    run_interaction(
        &state,
        body.token,
        Interaction::Finalize {
            choice: body.choice,
        },
    )
    .await
}

async fn handle_advance(
    State(state): State<GatewayState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    let token = body.token.clone();
    let response = run_interaction(&state, body.token, Interaction::Advance).await?;
    if response.view.experiment_ended {
        state.participants.write().await.remove(token.trim());
        let active = state.participants.read().await.len();
        tracing::debug!(active = active, "participant released");
    }
    Ok(response)
}

async fn handle_export(
    State(state): State<GatewayState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<InteractionResponse>, HandlerError> {
    run_interaction(&state, body.token, Interaction::Export { target: None }).await
}

async fn handle_health(State(state): State<GatewayState>) -> Json<GatewayHealthResponse> {
    Json(GatewayHealthResponse {
        status: "healthy",
        turn_timeout_secs: state.turn_timeout_secs,
        active_participants: state.participants.read().await.len(),
    })
}

/// Build the gateway router.
pub fn router(lab: Lab, turn_timeout_secs: u64) -> Router {
    let state = GatewayState {
        lab: Arc::new(lab),
        participants: Arc::new(RwLock::new(HashMap::new())),
        turn_timeout_secs,
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/start", post(handle_start))
        .route("/state/{token}", get(handle_state))
        .route("/message", post(handle_message))
        .route("/label", post(handle_label))
        .route("/finalize", post(handle_finalize))
        .route("/advance", post(handle_advance))
        .route("/export", post(handle_export))
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:8080`).
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix).
/// `turn_timeout_secs`: per-turn timeout (default 300 when None).
pub async fn run_http(lab: Lab, bind_addr: &str, turn_timeout_secs: Option<u64>) -> Result<()> {
    let timeout = turn_timeout_secs.unwrap_or(TURN_TIMEOUT_SECS);
    let app = router(lab, timeout);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(
        "gateway listening on {} (turn_timeout={}s, Ctrl+C/SIGTERM to stop)",
        bind_addr,
        timeout
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
