//! Per-participant session state and its transitions.
//!
//! Every transition is synchronous and either applies fully or returns a
//! [`RejectReason`] with the state unchanged. The one asynchronous step, the
//! completion call, sits between [`SessionState::begin_turn`] and
//! [`SessionState::apply_generation`] and is driven by the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::experiment::{ExperimentSession, normalize_participant_name};
use crate::parser::TextOrList;
use crate::record::TurnLogRecord;
use crate::requester::{Generation, GenerationFailure};
use crate::session::ChatMessage;

use super::feedback::{Feedback, LabelSide};
use super::reject::RejectReason;

/// Assistant message shown when generation fails; the participant retypes.
pub const FALLBACK_REPLY: &str = "Response generation failed. Please enter your message again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Chat input enabled.
    NoPending,
    /// Options shown, chat input disabled until finalize.
    AwaitingLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    pub id: u64,
    pub options: Vec<String>,
}

/// Staging record between the completion request and the log write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub session: ExperimentSession,
    pub user_text: String,
    pub assistant_candidates: Vec<String>,
    pub reasoning: Option<String>,
}

/// How a submitted turn was resolved once the completion returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResolution {
    /// Three options are pending; the record is written at finalize.
    OptionsReady { option_set_id: u64 },
    /// A single reply went straight to the transcript; write this record now.
    Direct(TurnLogRecord),
    /// The fallback reply was appended; nothing to record.
    Failed(GenerationFailure),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
    option_set: Option<OptionSet>,
    feedback: BTreeMap<u64, Feedback>,
    pending_turn: Option<PendingTurn>,
    option_set_id: u64,
    session: ExperimentSession,
    user_name: Option<String>,
    experiment_started: bool,
    last_reasoning: Option<String>,
    export_path: Option<PathBuf>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            option_set: None,
            feedback: BTreeMap::new(),
            pending_turn: None,
            option_set_id: 0,
            session: ExperimentSession::First,
            user_name: None,
            experiment_started: false,
            last_reasoning: None,
            export_path: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn option_set(&self) -> Option<&OptionSet> {
        self.option_set.as_ref()
    }

    /// Labels of the active option set.
    pub fn current_feedback(&self) -> Option<&Feedback> {
        self.option_set
            .as_ref()
            .and_then(|set| self.feedback.get(&set.id))
    }

    pub fn feedback_entries(&self) -> usize {
        self.feedback.len()
    }

    pub fn pending_turn(&self) -> Option<&PendingTurn> {
        self.pending_turn.as_ref()
    }

    pub fn option_set_id(&self) -> u64 {
        self.option_set_id
    }

    pub fn session(&self) -> ExperimentSession {
        self.session
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn experiment_started(&self) -> bool {
        self.experiment_started
    }

    pub fn last_reasoning(&self) -> Option<&str> {
        self.last_reasoning.as_deref()
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.option_set.is_some() {
            Phase::AwaitingLabel
        } else {
            Phase::NoPending
        }
    }

    /// Whether the chat input accepts a new message.
    pub fn input_enabled(&self) -> bool {
        self.experiment_started && !self.session.is_ended() && self.phase() == Phase::NoPending
    }

    /// Collect the participant name and enter the first working session.
    pub fn start(&mut self, raw_name: &str) -> Result<(), RejectReason> {
        if self.experiment_started {
            return Err(RejectReason::AlreadyStarted);
        }
        let name = normalize_participant_name(raw_name).ok_or(RejectReason::EmptyName)?;
        self.user_name = Some(name);
        self.experiment_started = true;
        self.session = ExperimentSession::First;
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), RejectReason> {
        if !self.experiment_started {
            return Err(RejectReason::NotStarted);
        }
        if self.session.is_ended() {
            return Err(RejectReason::ExperimentEnded);
        }
        Ok(())
    }

    /// Append the user message and stage a pending turn. Returns the trimmed text.
    pub fn begin_turn(&mut self, raw_text: &str) -> Result<String, RejectReason> {
        self.ensure_running()?;
        if self.option_set.is_some() {
            return Err(RejectReason::AwaitingLabels);
        }
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(RejectReason::EmptyMessage);
        }
        self.messages.push(ChatMessage::user(text));
        self.pending_turn = Some(PendingTurn {
            session: self.session,
            user_text: text.to_string(),
            assistant_candidates: Vec::new(),
            reasoning: None,
        });
        Ok(text.to_string())
    }

    /// Transcript before the message staged by [`Self::begin_turn`].
    pub fn history_before_pending(&self) -> &[ChatMessage] {
        let end = if self.pending_turn.is_some() {
            self.messages.len().saturating_sub(1)
        } else {
            self.messages.len()
        };
        &self.messages[..end]
    }

    /// Apply the completion outcome to the staged turn.
    pub fn apply_generation(
        &mut self,
        result: Result<Generation, GenerationFailure>,
    ) -> TurnResolution {
        let mut pending = self.pending_turn.take().unwrap_or_else(|| PendingTurn {
            session: self.session,
            user_text: String::new(),
            assistant_candidates: Vec::new(),
            reasoning: None,
        });
        match result {
            Ok(Generation::Options { options, reasoning }) => {
                self.remember_reasoning(reasoning.as_deref());
                self.option_set_id += 1;
                let id = self.option_set_id;
                let options = options.to_vec();
                self.option_set = Some(OptionSet {
                    id,
                    options: options.clone(),
                });
                self.feedback.insert(id, Feedback::default());
                pending.assistant_candidates = options;
                pending.reasoning = reasoning;
                self.pending_turn = Some(pending);
                TurnResolution::OptionsReady { option_set_id: id }
            }
            Ok(Generation::Direct { answer, reasoning }) => {
                self.remember_reasoning(reasoning.as_deref());
                self.messages.push(ChatMessage::assistant(answer.clone()));
                TurnResolution::Direct(TurnLogRecord {
                    user_name: self.user_name.clone().unwrap_or_default(),
                    session: pending.session,
                    user: pending.user_text,
                    assistant: TextOrList::Text(answer.clone()),
                    assistant_selected: answer,
                    good_idx: None,
                    bad_idx: None,
                    good_reason: String::new(),
                    bad_reason: String::new(),
                    reasoning: reasoning.unwrap_or_default(),
                })
            }
            Err(failure) => {
                self.remember_reasoning(failure.reasoning());
                self.messages.push(ChatMessage::assistant(FALLBACK_REPLY));
                TurnResolution::Failed(failure)
            }
        }
    }

    fn remember_reasoning(&mut self, reasoning: Option<&str>) {
        if let Some(reasoning) = reasoning {
            self.last_reasoning = Some(reasoning.to_string());
        }
    }

    fn active_feedback_mut(
        &mut self,
        index: Option<usize>,
    ) -> Result<&mut Feedback, RejectReason> {
        let set = self
            .option_set
            .as_ref()
            .ok_or(RejectReason::NoPendingOptions)?;
        if let Some(index) = index
            && index >= set.options.len()
        {
            return Err(RejectReason::IndexOutOfRange {
                index,
                len: set.options.len(),
            });
        }
        Ok(self.feedback.entry(set.id).or_default())
    }

    /// Mark option `index` as good or bad; see [`Feedback::mark`].
    pub fn mark(
        &mut self,
        side: LabelSide,
        index: usize,
        reason: Option<&str>,
    ) -> Result<(), RejectReason> {
        self.active_feedback_mut(Some(index))?
            .mark(side, index, reason);
        Ok(())
    }

    pub fn set_reason(&mut self, side: LabelSide, reason: &str) -> Result<(), RejectReason> {
        self.active_feedback_mut(None)?.set_reason(side, reason);
        Ok(())
    }

    /// Continue the transcript with option `choice` and produce the turn record.
    ///
    /// Requires both a good and a bad label; `choice` need not be the good one.
    pub fn finalize(&mut self, choice: usize) -> Result<TurnLogRecord, RejectReason> {
        let set = self
            .option_set
            .as_ref()
            .ok_or(RejectReason::NoPendingOptions)?;
        let feedback = self.feedback.get(&set.id).cloned().unwrap_or_default();
        if !feedback.is_complete() {
            return Err(RejectReason::LabelsIncomplete {
                missing_good: feedback.good_index.is_none(),
                missing_bad: feedback.bad_index.is_none(),
            });
        }
        let Some(selected) = set.options.get(choice).cloned() else {
            return Err(RejectReason::IndexOutOfRange {
                index: choice,
                len: set.options.len(),
            });
        };

        let set_id = set.id;
        let candidates = set.options.clone();
        let pending = self.pending_turn.take();
        let (session, user_text, candidates, reasoning) = match pending {
            Some(pending) => (
                pending.session,
                pending.user_text,
                if pending.assistant_candidates.is_empty() {
                    candidates
                } else {
                    pending.assistant_candidates
                },
                pending.reasoning,
            ),
            None => (self.session, String::new(), candidates, None),
        };

        self.messages.push(ChatMessage::assistant(selected.clone()));
        self.option_set = None;
        self.feedback.remove(&set_id);
        self.option_set_id += 1;

        Ok(TurnLogRecord {
            user_name: self.user_name.clone().unwrap_or_default(),
            session,
            user: user_text,
            assistant: TextOrList::List(candidates),
            assistant_selected: selected,
            good_idx: feedback.good_index,
            bad_idx: feedback.bad_index,
            good_reason: feedback.good_reason,
            bad_reason: feedback.bad_reason,
            reasoning: reasoning.unwrap_or_default(),
        })
    }

    /// Move to the next session with a cleared transcript.
    pub fn advance_session(&mut self) -> Result<ExperimentSession, RejectReason> {
        self.ensure_running()?;
        let next = self.session.next().ok_or(RejectReason::ExperimentEnded)?;
        *self = self.reset_for(next);
        Ok(next)
    }

    /// Fresh state for `session`: identity, counters and export path carry over.
    fn reset_for(&self, session: ExperimentSession) -> Self {
        Self {
            option_set_id: self.option_set_id + 1,
            session,
            user_name: self.user_name.clone(),
            experiment_started: self.experiment_started,
            export_path: self.export_path.clone(),
            ..Self::new()
        }
    }

    pub fn record_export_path(&mut self, path: impl Into<PathBuf>) {
        self.export_path = Some(path.into());
    }
}
