//! Credential and prompt-template sources. Both are read on every request and
//! both treat absence as a normal condition (`None`), never an error.

use std::path::{Path, PathBuf};

pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_API_KEY_FILE: &str = "openai_api_key.txt";
pub const DEFAULT_PROMPT_FILE: &str = "prompt.txt";

/// Where the completion API key is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialMode {
    /// Environment variable only (hosted deployments).
    Env,
    /// Key file only (local runs).
    File,
    /// Environment variable, then key file.
    #[default]
    Auto,
}

impl CredentialMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "env" => Some(Self::Env),
            "file" => Some(Self::File),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialSource {
    pub mode: CredentialMode,
    pub env_var: String,
    pub file: PathBuf,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self {
            mode: CredentialMode::Auto,
            env_var: DEFAULT_API_KEY_ENV.to_string(),
            file: PathBuf::from(DEFAULT_API_KEY_FILE),
        }
    }
}

impl CredentialSource {
    /// Resolve the key; blank values count as missing.
    pub fn resolve(&self) -> Option<String> {
        match self.mode {
            CredentialMode::Env => self.from_env(),
            CredentialMode::File => self.from_file(),
            CredentialMode::Auto => self.from_env().or_else(|| self.from_file()),
        }
    }

    fn from_env(&self) -> Option<String> {
        std::env::var(&self.env_var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn from_file(&self) -> Option<String> {
        read_trimmed(&self.file)
    }
}

/// Read the prompt template; missing, unreadable and blank files yield `None`.
pub fn load_prompt_text(path: &Path) -> Option<String> {
    read_trimmed(path)
}

fn read_trimmed(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Some(raw.trim().to_string()).filter(|text| !text.is_empty()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read file; treating as missing"
            );
            None
        }
    }
}
