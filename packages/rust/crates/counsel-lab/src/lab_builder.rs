use std::path::PathBuf;

use anyhow::{Result, anyhow};
use counsel_lab::{
    CredentialMode, CredentialSource, DEFAULT_API_KEY_ENV, DEFAULT_API_KEY_FILE,
    DEFAULT_EXPORT_PATH, DEFAULT_HISTORY_WINDOW, DEFAULT_LOG_PATH, DEFAULT_MODEL,
    DEFAULT_PROMPT_FILE, DEFAULT_REASONING_PATH, DEFAULT_REMOTE_TABLE,
    DEFAULT_REMOTE_TIMEOUT_SECS, LabConfig, OPENAI_CHAT_COMPLETIONS_URL, RemoteConfig,
    RuntimeSettings, ScenarioPrompts,
};

use crate::resolve::{non_empty_env, resolve_optional_string, resolve_positive_usize, resolve_string};

const DEFAULT_REMOTE_KEY_ENV: &str = "COUNSEL_LAB_REMOTE_KEY";

/// CLI-level overrides; everything else comes from env and settings.
#[derive(Debug, Default)]
pub(crate) struct LabOverrides {
    pub(crate) model: Option<String>,
    pub(crate) prompt_file: Option<PathBuf>,
    pub(crate) log_path: Option<PathBuf>,
}

fn path_arg(path: Option<PathBuf>) -> Option<String> {
    path.map(|p| p.display().to_string())
}

fn parse_credential_mode(raw: &str, source: &str) -> Result<CredentialMode> {
    CredentialMode::parse(raw)
        .ok_or_else(|| anyhow!("invalid {source}: '{raw}' (expected one of: env, file, auto)"))
}

fn resolve_credential_mode(runtime_settings: &RuntimeSettings) -> Result<CredentialMode> {
    if let Some(raw) = non_empty_env("COUNSEL_LAB_CREDENTIAL_SOURCE") {
        return parse_credential_mode(&raw, "COUNSEL_LAB_CREDENTIAL_SOURCE");
    }
    if let Some(raw) = runtime_settings
        .llm
        .credential_source
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return parse_credential_mode(raw, "llm.credential_source");
    }
    Ok(CredentialMode::Auto)
}

fn resolve_remote(runtime_settings: &RuntimeSettings) -> Option<RemoteConfig> {
    let remote = &runtime_settings.remote;
    let url = resolve_optional_string(None, "COUNSEL_LAB_REMOTE_URL", remote.url.as_deref())?;
    let table = resolve_string(
        None,
        "COUNSEL_LAB_REMOTE_TABLE",
        remote.table.as_deref(),
        DEFAULT_REMOTE_TABLE,
    );
    let key_env = remote
        .api_key_env
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_REMOTE_KEY_ENV);
    let api_key = non_empty_env(key_env);
    if api_key.is_none() {
        tracing::warn!(env_var = key_env, "remote log table configured without an API key");
    }
    Some(RemoteConfig {
        url,
        table,
        api_key,
        timeout_secs: remote
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS),
    })
}

pub(crate) fn build_lab_config(
    overrides: LabOverrides,
    runtime_settings: &RuntimeSettings,
) -> Result<LabConfig> {
    let llm = &runtime_settings.llm;
    let log = &runtime_settings.log;

    let credential = CredentialSource {
        mode: resolve_credential_mode(runtime_settings)?,
        env_var: llm
            .api_key_env
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_KEY_ENV)
            .to_string(),
        file: PathBuf::from(resolve_string(
            None,
            "COUNSEL_LAB_API_KEY_FILE",
            llm.api_key_file.as_deref(),
            DEFAULT_API_KEY_FILE,
        )),
    };

    let config = LabConfig {
        inference_url: resolve_string(
            None,
            "COUNSEL_LAB_INFERENCE_URL",
            llm.inference_url.as_deref(),
            OPENAI_CHAT_COMPLETIONS_URL,
        ),
        model: resolve_string(
            overrides.model,
            "COUNSEL_LAB_MODEL",
            llm.model.as_deref(),
            DEFAULT_MODEL,
        ),
        credential,
        prompt_path: PathBuf::from(resolve_string(
            path_arg(overrides.prompt_file),
            "COUNSEL_LAB_PROMPT_FILE",
            llm.prompt_file.as_deref(),
            DEFAULT_PROMPT_FILE,
        )),
        history_window: resolve_positive_usize(
            None,
            "COUNSEL_LAB_HISTORY_WINDOW",
            llm.history_window,
            DEFAULT_HISTORY_WINDOW,
        ),
        log_path: PathBuf::from(resolve_string(
            path_arg(overrides.log_path),
            "COUNSEL_LAB_LOG_PATH",
            log.path.as_deref(),
            DEFAULT_LOG_PATH,
        )),
        reasoning_path: Some(PathBuf::from(resolve_string(
            None,
            "COUNSEL_LAB_REASONING_PATH",
            log.reasoning_path.as_deref(),
            DEFAULT_REASONING_PATH,
        ))),
        export_path: PathBuf::from(resolve_string(
            None,
            "COUNSEL_LAB_EXPORT_PATH",
            log.export_path.as_deref(),
            DEFAULT_EXPORT_PATH,
        )),
        remote: resolve_remote(runtime_settings),
        scenarios: ScenarioPrompts::with_overrides(
            runtime_settings.experiment.session_one_prompt.as_deref(),
            runtime_settings.experiment.session_two_prompt.as_deref(),
        ),
    };

    tracing::info!(
        inference_url = %config.inference_url,
        model = %config.model,
        prompt_path = %config.prompt_path.display(),
        log_path = %config.log_path.display(),
        remote = config.remote.is_some(),
        "lab config resolved"
    );
    Ok(config)
}
