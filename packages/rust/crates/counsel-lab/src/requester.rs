//! Completion requester: prompt assembly, service call, answer-count classification.
//!
//! The requester never touches session state. It returns a [`Generation`] or a
//! typed [`GenerationFailure`]; the turn state machine decides what the
//! transcript shows.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{CredentialSource, LabConfig, load_prompt_text};
use crate::llm::{CompletionRequest, CompletionService, WireMessage};
use crate::observability::LabEvent;
use crate::parser::parse_completion;
use crate::record::ReasoningLog;
use crate::session::ChatMessage;

/// Fixed developer instruction sent ahead of the prompt template.
pub const ADVISOR_PERSONA: &str = "You are an assistant who listens to the user's financial \
concerns and gives advice. The user will mostly ask what to do with newly available spare \
money. Your goal is to reach a final piece of advice on that concern.\n";

/// Successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Exactly one answer: a final reply that needs no labeling.
    Direct {
        answer: String,
        reasoning: Option<String>,
    },
    /// Three candidate replies awaiting labels.
    Options {
        options: [String; 3],
        reasoning: Option<String>,
    },
}

impl Generation {
    pub fn reasoning(&self) -> Option<&str> {
        match self {
            Self::Direct { reasoning, .. } | Self::Options { reasoning, .. } => reasoning.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("API key not found (env {env_var} / file {file})")]
    MissingCredential { env_var: String, file: PathBuf },
    #[error("prompt template missing or empty: {0}")]
    MissingPrompt(PathBuf),
    #[error("completion service call failed: {0}")]
    Upstream(String),
    #[error("completion returned {count} answers (expected 1, or 3 or more)")]
    UnexpectedCardinality {
        count: usize,
        reasoning: Option<String>,
    },
}

impl GenerationFailure {
    /// Missing credential or template, as opposed to an upstream failure.
    pub const fn is_config_missing(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::MissingPrompt(_)
        )
    }

    /// Reasoning decoded before the answer count was rejected.
    pub fn reasoning(&self) -> Option<&str> {
        match self {
            Self::UnexpectedCardinality { reasoning, .. } => reasoning.as_deref(),
            _ => None,
        }
    }
}

pub struct CompletionRequester {
    service: Arc<dyn CompletionService>,
    credential: CredentialSource,
    prompt_path: PathBuf,
    history_window: usize,
    reasoning_log: ReasoningLog,
}

impl CompletionRequester {
    pub fn new(service: Arc<dyn CompletionService>, config: &LabConfig) -> Self {
        Self {
            service,
            credential: config.credential.clone(),
            prompt_path: config.prompt_path.clone(),
            history_window: config.history_window.max(1),
            reasoning_log: ReasoningLog::new(config.reasoning_path.clone()),
        }
    }

    /// Instruction, template, then the last `history_window` transcript
    /// messages ending with `user_input`.
    pub fn build_messages(
        &self,
        prompt: &str,
        user_input: &str,
        history: &[ChatMessage],
    ) -> Vec<WireMessage> {
        let current = ChatMessage::user(user_input);
        let start = (history.len() + 1).saturating_sub(self.history_window);
        let mut messages = vec![
            WireMessage::developer(ADVISOR_PERSONA),
            WireMessage::user(prompt),
        ];
        messages.extend(
            history
                .iter()
                .chain(std::iter::once(&current))
                .skip(start)
                .map(WireMessage::from),
        );
        messages
    }

    /// Generate a reply for `user_input`; `history` is the transcript before it.
    pub async fn generate(
        &self,
        user_input: &str,
        history: &[ChatMessage],
    ) -> Result<Generation, GenerationFailure> {
        let Some(api_key) = self.credential.resolve() else {
            return Err(GenerationFailure::MissingCredential {
                env_var: self.credential.env_var.clone(),
                file: self.credential.file.clone(),
            });
        };
        let Some(prompt) = load_prompt_text(&self.prompt_path) else {
            return Err(GenerationFailure::MissingPrompt(self.prompt_path.clone()));
        };

        let messages = self.build_messages(&prompt, user_input, history);
        tracing::debug!(
            event = LabEvent::CompletionRequested.as_str(),
            request_messages = messages.len(),
            input_chars = user_input.chars().count(),
            "completion requested"
        );
        let raw = self
            .service
            .complete(CompletionRequest { api_key, messages })
            .await
            .map_err(|error| GenerationFailure::Upstream(format!("{error:#}")))?;

        let parsed = parse_completion(&raw);
        if let Some(ref reasoning) = parsed.reasoning {
            self.reasoning_log.record(reasoning);
        }
        classify_answers(parsed.answers, parsed.reasoning)
    }
}

/// One answer is final, three or more become options, anything else fails.
fn classify_answers(
    mut answers: Vec<String>,
    reasoning: Option<String>,
) -> Result<Generation, GenerationFailure> {
    match answers.len() {
        1 => Ok(Generation::Direct {
            answer: answers.remove(0),
            reasoning,
        }),
        count if count >= 3 => {
            answers.truncate(3);
            match <[String; 3]>::try_from(answers) {
                Ok(options) => Ok(Generation::Options { options, reasoning }),
                Err(rest) => Err(GenerationFailure::UnexpectedCardinality {
                    count: rest.len(),
                    reasoning,
                }),
            }
        }
        count => Err(GenerationFailure::UnexpectedCardinality { count, reasoning }),
    }
}
