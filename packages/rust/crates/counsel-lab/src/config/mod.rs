//! Config namespace: lab config, credential sources, runtime settings loading.

mod credential;
mod lab;
mod settings;

pub use credential::{
    CredentialMode, CredentialSource, DEFAULT_API_KEY_ENV, DEFAULT_API_KEY_FILE,
    DEFAULT_PROMPT_FILE, load_prompt_text,
};
pub use lab::{
    DEFAULT_EXPORT_PATH, DEFAULT_HISTORY_WINDOW, DEFAULT_LOG_PATH, DEFAULT_MODEL,
    DEFAULT_REASONING_PATH, DEFAULT_REMOTE_TABLE, DEFAULT_REMOTE_TIMEOUT_SECS, LabConfig,
    OPENAI_CHAT_COMPLETIONS_URL, RemoteConfig,
};
pub use settings::{
    ExperimentSettings, LlmSettings, LogSettings, RemoteSettings, RuntimeSettings,
    load_runtime_settings, load_runtime_settings_from_paths, runtime_settings_paths,
    set_config_home_override,
};
