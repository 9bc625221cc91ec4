//! Render-ready snapshot of a session state.

use serde::Serialize;

use crate::lab::Lab;
use crate::session::ChatMessage;
use crate::turn::{Phase, SessionState};

/// One selectable option card with its label toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionCard {
    /// 0-based position within the option set.
    pub index: usize,
    pub text: String,
    pub good: bool,
    pub bad: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub participant: Option<String>,
    pub experiment_started: bool,
    pub session: u8,
    pub experiment_ended: bool,
    pub instructions: String,
    pub phase: Phase,
    pub input_enabled: bool,
    pub option_set_id: u64,
    pub messages: Vec<ChatMessage>,
    pub options: Vec<OptionCard>,
    pub good_reason: String,
    pub bad_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,
}

impl SessionView {
    pub fn build(lab: &Lab, state: &SessionState) -> Self {
        let feedback = state.current_feedback().cloned().unwrap_or_default();
        let options = state
            .option_set()
            .map(|set| {
                set.options
                    .iter()
                    .enumerate()
                    .map(|(index, text)| OptionCard {
                        index,
                        text: text.clone(),
                        good: feedback.good_index == Some(index),
                        bad: feedback.bad_index == Some(index),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            participant: state.user_name().map(ToString::to_string),
            experiment_started: state.experiment_started(),
            session: state.session().number(),
            experiment_ended: state.session().is_ended(),
            instructions: lab.instructions(state),
            phase: state.phase(),
            input_enabled: state.input_enabled(),
            option_set_id: state.option_set_id(),
            messages: state.messages().to_vec(),
            options,
            good_reason: feedback.good_reason,
            bad_reason: feedback.bad_reason,
            export_path: state.export_path().map(|p| p.display().to_string()),
        }
    }
}
