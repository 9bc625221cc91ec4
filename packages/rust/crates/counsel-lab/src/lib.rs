//! Financial-advice chat experiment: labeled candidate replies, turn logs.
//!
//! - **Parser / requester**: OpenAI-compatible completion → one final answer or three candidates.
//! - **Turn state machine**: participant labels one option good and one bad, then picks the continuation.
//! - **Recorder**: one JSONL record per resolved turn, optional remote table mirror, CSV export.
//! - **Surfaces**: HTTP gateway and stdio console over the same [`Lab::handle`] entry point.

#![allow(missing_docs)]

mod config;
mod experiment;
mod gateway;
mod lab;
mod llm;
mod observability;
mod parser;
mod record;
mod requester;
mod session;
#[doc(hidden)]
pub mod test_support;
mod turn;
mod view;

pub use config::{
    CredentialMode, CredentialSource, DEFAULT_API_KEY_ENV, DEFAULT_API_KEY_FILE,
    DEFAULT_EXPORT_PATH, DEFAULT_HISTORY_WINDOW, DEFAULT_LOG_PATH, DEFAULT_MODEL,
    DEFAULT_PROMPT_FILE, DEFAULT_REASONING_PATH, DEFAULT_REMOTE_TABLE, DEFAULT_REMOTE_TIMEOUT_SECS,
    ExperimentSettings,
    LabConfig, LlmSettings, LogSettings, OPENAI_CHAT_COMPLETIONS_URL, RemoteConfig,
    RemoteSettings, RuntimeSettings, load_prompt_text, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
pub use experiment::{
    EXPERIMENT_COMPLETE_MESSAGE, ExperimentSession, ScenarioPrompts, normalize_participant_name,
};
pub use gateway::{
    CONSOLE_HELP, ConsoleCommand, FinalizeRequest, GatewayHealthResponse, GatewayState,
    InteractionResponse, LabelRequest, MessageRequest, StartRequest, TokenRequest,
    label_interaction, parse_console_command, render_notices, render_options, render_update,
    render_view, router, run_console, run_http, validate_message_request,
};
pub use lab::{Interaction, Lab, MessageTurn, Notice, NoticeLevel, Outcome};
pub use llm::{CompletionRequest, CompletionService, LlmClient, WireMessage};
pub use parser::{ParsedCompletion, TextOrList, parse_completion};
pub use record::{
    AppendReport, LogRecorder, ReasoningLog, RecordError, RemoteTable, TurnLogRecord, export_log,
};
pub use requester::{ADVISOR_PERSONA, CompletionRequester, Generation, GenerationFailure};
pub use session::{ChatMessage, Role};
pub use turn::{
    FALLBACK_REPLY, Feedback, LabelSide, OptionSet, PendingTurn, Phase, RejectReason,
    SessionState, TurnResolution,
};
pub use view::{OptionCard, SessionView};
