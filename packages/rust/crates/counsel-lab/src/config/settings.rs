//! Runtime settings loader for counsel-lab.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/counsel-lab.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/counsel-lab/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/counsel-lab.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "counsel-lab/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub experiment: ExperimentSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSettings {
    pub inference_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub api_key_file: Option<String>,
    /// `env`, `file`, or `auto` (env first, then file).
    pub credential_source: Option<String>,
    pub prompt_file: Option<String>,
    pub history_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    pub path: Option<String>,
    pub reasoning_path: Option<String>,
    pub export_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteSettings {
    pub url: Option<String>,
    pub table: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperimentSettings {
    pub session_one_prompt: Option<String>,
    pub session_two_prompt: Option<String>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            llm: self.llm.merge(overlay.llm),
            log: self.log.merge(overlay.log),
            remote: self.remote.merge(overlay.remote),
            experiment: self.experiment.merge(overlay.experiment),
        }
    }
}

impl LlmSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            inference_url: overlay.inference_url.or(self.inference_url),
            model: overlay.model.or(self.model),
            api_key_env: overlay.api_key_env.or(self.api_key_env),
            api_key_file: overlay.api_key_file.or(self.api_key_file),
            credential_source: overlay.credential_source.or(self.credential_source),
            prompt_file: overlay.prompt_file.or(self.prompt_file),
            history_window: overlay.history_window.or(self.history_window),
        }
    }
}

impl LogSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            path: overlay.path.or(self.path),
            reasoning_path: overlay.reasoning_path.or(self.reasoning_path),
            export_path: overlay.export_path.or(self.export_path),
        }
    }
}

impl RemoteSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            url: overlay.url.or(self.url),
            table: overlay.table.or(self.table),
            api_key_env: overlay.api_key_env.or(self.api_key_env),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl ExperimentSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            session_one_prompt: overlay.session_one_prompt.or(self.session_one_prompt),
            session_two_prompt: overlay.session_two_prompt.or(self.session_two_prompt),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
