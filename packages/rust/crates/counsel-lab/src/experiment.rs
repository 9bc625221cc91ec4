//! Experiment progression: two working sessions, then a terminal one.

use std::path::Path;

use serde::{Deserialize, Serialize};

const DEFAULT_SESSION_ONE_PROMPT: &str = "You recently came into 3,000,000 KRW of spare money. \
Imagine you are asking this assistant for advice on how to grow it. \
Start the conversation with a question asking for financial advice.";

const DEFAULT_SESSION_TWO_PROMPT: &str = "You are now saving for a large expense two years from now \
(a move, a wedding, or tuition). Ask the assistant how to prepare for it \
without putting the money at risk.";

pub const EXPERIMENT_COMPLETE_MESSAGE: &str =
    "The experiment has ended. Thank you for participating.";

/// Experiment phase. Numbered 1, 2 and 3 in persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ExperimentSession {
    First,
    Second,
    Ended,
}

impl ExperimentSession {
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Ended => 3,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Ended),
            _ => None,
        }
    }

    /// Next session; `Ended` is terminal and has none.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl From<ExperimentSession> for u8 {
    fn from(session: ExperimentSession) -> Self {
        session.number()
    }
}

impl TryFrom<u8> for ExperimentSession {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| format!("invalid experiment session: {value}"))
    }
}

/// Scenario text shown to the participant in each working session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPrompts {
    pub session_one: String,
    pub session_two: String,
}

impl Default for ScenarioPrompts {
    fn default() -> Self {
        Self {
            session_one: DEFAULT_SESSION_ONE_PROMPT.to_string(),
            session_two: DEFAULT_SESSION_TWO_PROMPT.to_string(),
        }
    }
}

impl ScenarioPrompts {
    /// Build from optional overrides; blank overrides keep the defaults.
    pub fn with_overrides(session_one: Option<&str>, session_two: Option<&str>) -> Self {
        let defaults = Self::default();
        let pick = |value: Option<&str>, fallback: String| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map_or(fallback, ToString::to_string)
        };
        Self {
            session_one: pick(session_one, defaults.session_one),
            session_two: pick(session_two, defaults.session_two),
        }
    }

    /// Text for the given session. The terminal session shows the completion
    /// message plus the export location when one was recorded.
    pub fn instructions(&self, session: ExperimentSession, export_path: Option<&Path>) -> String {
        match session {
            ExperimentSession::First => self.session_one.clone(),
            ExperimentSession::Second => self.session_two.clone(),
            ExperimentSession::Ended => match export_path {
                Some(path) => format!(
                    "{EXPERIMENT_COMPLETE_MESSAGE} Results were written to {}.",
                    path.display()
                ),
                None => EXPERIMENT_COMPLETE_MESSAGE.to_string(),
            },
        }
    }
}

/// Trimmed participant name, or `None` when blank.
pub fn normalize_participant_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_progress_to_terminal() {
        assert_eq!(ExperimentSession::First.next(), Some(ExperimentSession::Second));
        assert_eq!(ExperimentSession::Second.next(), Some(ExperimentSession::Ended));
        assert_eq!(ExperimentSession::Ended.next(), None);
        assert_eq!(ExperimentSession::Ended.number(), 3);
    }

    #[test]
    fn working_sessions_have_distinct_prompts() {
        let prompts = ScenarioPrompts::default();
        assert_ne!(
            prompts.instructions(ExperimentSession::First, None),
            prompts.instructions(ExperimentSession::Second, None)
        );
    }

    #[test]
    fn terminal_instructions_mention_export_path() {
        let prompts = ScenarioPrompts::default();
        let text = prompts.instructions(ExperimentSession::Ended, Some(Path::new("out/turns.csv")));
        assert!(text.starts_with(EXPERIMENT_COMPLETE_MESSAGE));
        assert!(text.contains("out/turns.csv"));
    }

    #[test]
    fn blank_overrides_keep_defaults() {
        let prompts = ScenarioPrompts::with_overrides(Some("  "), Some("Plan a trip budget."));
        assert_eq!(prompts.session_one, ScenarioPrompts::default().session_one);
        assert_eq!(prompts.session_two, "Plan a trip budget.");
    }

    #[test]
    fn participant_name_is_trimmed() {
        assert_eq!(normalize_participant_name("  Alice "), Some("Alice".to_string()));
        assert_eq!(normalize_participant_name(" \t "), None);
        assert_eq!(normalize_participant_name(""), None);
    }
}
