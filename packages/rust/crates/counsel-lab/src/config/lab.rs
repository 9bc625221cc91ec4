//! Lab configuration: completion endpoint, credential, prompt template, log stores.

use std::path::PathBuf;

use crate::experiment::ScenarioPrompts;

use super::credential::{CredentialSource, DEFAULT_PROMPT_FILE};

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-5.1";
/// Transcript messages forwarded with each completion request.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;
pub const DEFAULT_LOG_PATH: &str = "logs/turns.jsonl";
pub const DEFAULT_REASONING_PATH: &str = "reasoning.txt";
pub const DEFAULT_EXPORT_PATH: &str = "logs/turns.csv";
pub const DEFAULT_REMOTE_TABLE: &str = "turn_logs";
/// Upper bound for one remote insert, connect included.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Remote table mirror (PostgREST-style insert endpoint).
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://project.supabase.co`.
    pub url: String,
    pub table: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Chat completions URL (OpenAI-compatible).
    pub inference_url: String,
    pub model: String,
    pub credential: CredentialSource,
    pub prompt_path: PathBuf,
    pub history_window: usize,
    /// Durable JSONL turn log.
    pub log_path: PathBuf,
    /// Append-only `REASONING:` side log; `None` disables it.
    pub reasoning_path: Option<PathBuf>,
    pub export_path: PathBuf,
    pub remote: Option<RemoteConfig>,
    pub scenarios: ScenarioPrompts,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            inference_url: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            credential: CredentialSource::default(),
            prompt_path: PathBuf::from(DEFAULT_PROMPT_FILE),
            history_window: DEFAULT_HISTORY_WINDOW,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            reasoning_path: Some(PathBuf::from(DEFAULT_REASONING_PATH)),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            remote: None,
            scenarios: ScenarioPrompts::default(),
        }
    }
}
