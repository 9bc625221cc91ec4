//! Lab controller: applies one participant interaction to one session state.
//!
//! Surfaces (HTTP gateway, stdio console) translate input into an
//! [`Interaction`], call [`Lab::handle`], and render the resulting state and
//! [`Outcome`] notices. No failure here ends a session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::LabConfig;
use crate::experiment::{ExperimentSession, ScenarioPrompts};
use crate::llm::{CompletionService, LlmClient};
use crate::observability::LabEvent;
use crate::record::{LogRecorder, RemoteTable, TurnLogRecord};
use crate::requester::{CompletionRequester, GenerationFailure};
use crate::turn::{LabelSide, RejectReason, SessionState, TurnResolution};

/// One participant action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Start { name: String },
    Message { text: String },
    Mark {
        side: LabelSide,
        index: usize,
        reason: Option<String>,
    },
    SetReason { side: LabelSide, reason: String },
    Finalize { choice: usize },
    Advance,
    /// Export the durable log; `None` uses the configured export path.
    Export { target: Option<PathBuf> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-visible message produced while handling an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// `false` when the interaction was rejected and state left unchanged.
    pub accepted: bool,
    pub notices: Vec<Notice>,
}

impl Outcome {
    fn accepted() -> Self {
        Self {
            accepted: true,
            notices: Vec::new(),
        }
    }

    fn rejected(reason: &RejectReason) -> Self {
        tracing::info!(
            event = LabEvent::InteractionRejected.as_str(),
            reason = %reason,
            "interaction rejected"
        );
        Self {
            accepted: false,
            notices: vec![Notice::warning(reason.to_string())],
        }
    }

    fn with(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn has_level(&self, level: NoticeLevel) -> bool {
        self.notices.iter().any(|n| n.level == level)
    }
}

/// Result of a message turn; `timed_out` carries the reason when the
/// completion was cut off and the fallback reply was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTurn {
    pub outcome: Outcome,
    pub timed_out: Option<String>,
}

impl MessageTurn {
    fn completed(outcome: Outcome) -> Self {
        Self {
            outcome,
            timed_out: None,
        }
    }
}

pub struct Lab {
    requester: CompletionRequester,
    recorder: LogRecorder,
    scenarios: ScenarioPrompts,
    export_path: PathBuf,
}

impl Lab {
    /// Build with the HTTP completion client.
    pub fn from_config(config: LabConfig) -> Self {
        let client = LlmClient::new(config.inference_url.clone(), config.model.clone());
        Self::with_service(config, Arc::new(client))
    }

    /// Build with an explicit completion service (tests, alternate backends).
    pub fn with_service(config: LabConfig, service: Arc<dyn CompletionService>) -> Self {
        let remote = config.remote.as_ref().map(RemoteTable::from_config);
        Self {
            requester: CompletionRequester::new(service, &config),
            recorder: LogRecorder::new(config.log_path.clone(), remote),
            scenarios: config.scenarios,
            export_path: config.export_path,
        }
    }

    pub fn recorder(&self) -> &LogRecorder {
        &self.recorder
    }

    pub fn export_path(&self) -> &std::path::Path {
        &self.export_path
    }

    /// Instructions for the participant's current session.
    pub fn instructions(&self, state: &SessionState) -> String {
        self.scenarios
            .instructions(state.session(), state.export_path())
    }

    pub async fn handle(&self, state: &mut SessionState, interaction: Interaction) -> Outcome {
        match interaction {
            Interaction::Start { name } => self.handle_start(state, &name),
            Interaction::Message { text } => self.handle_message(state, &text, None).await.outcome,
            Interaction::Mark {
                side,
                index,
                reason,
            } => match state.mark(side, index, reason.as_deref()) {
                Ok(()) => {
                    tracing::debug!(
                        event = LabEvent::TurnLabelMarked.as_str(),
                        side = side.as_str(),
                        index,
                        option_set_id = state.option_set_id(),
                        "option labeled"
                    );
                    Outcome::accepted()
                }
                Err(reason) => Outcome::rejected(&reason),
            },
            Interaction::SetReason { side, reason } => match state.set_reason(side, &reason) {
                Ok(()) => Outcome::accepted(),
                Err(reason) => Outcome::rejected(&reason),
            },
            Interaction::Finalize { choice } => self.handle_finalize(state, choice).await,
            Interaction::Advance => self.handle_advance(state),
            Interaction::Export { target } => self.handle_export(state, target).await,
        }
    }

    fn handle_start(&self, state: &mut SessionState, name: &str) -> Outcome {
        if let Err(reason) = state.start(name) {
            return Outcome::rejected(&reason);
        }
        tracing::info!(
            event = LabEvent::ExperimentStarted.as_str(),
            user_name = state.user_name().unwrap_or_default(),
            "experiment started"
        );
        Outcome::accepted()
    }

    /// Message turn whose completion step is cut off after `limit`.
    ///
    /// Only the completion call is timed; the fallback, the log write and the
    /// remote mirror run to completion either way.
    pub async fn submit_message_within(
        &self,
        state: &mut SessionState,
        text: &str,
        limit: Duration,
    ) -> MessageTurn {
        self.handle_message(state, text, Some(limit)).await
    }

    async fn handle_message(
        &self,
        state: &mut SessionState,
        raw_text: &str,
        limit: Option<Duration>,
    ) -> MessageTurn {
        let text = match state.begin_turn(raw_text) {
            Ok(text) => text,
            Err(reason) => return MessageTurn::completed(Outcome::rejected(&reason)),
        };
        tracing::info!(
            event = LabEvent::TurnSubmitted.as_str(),
            session = state.session().number(),
            transcript_messages = state.messages().len(),
            "turn submitted"
        );
        let generation = self
            .requester
            .generate(&text, state.history_before_pending());
        let (result, timed_out) = match limit {
            Some(limit) => match tokio::time::timeout(limit, generation).await {
                Ok(result) => (result, None),
                Err(_) => {
                    let reason = format!("turn timed out after {}s", limit.as_secs());
                    (Err(GenerationFailure::Upstream(reason.clone())), Some(reason))
                }
            },
            None => (generation.await, None),
        };
        let resolution = state.apply_generation(result);
        MessageTurn {
            outcome: self.settle(state, resolution).await,
            timed_out,
        }
    }

    async fn settle(&self, state: &SessionState, resolution: TurnResolution) -> Outcome {
        match resolution {
            TurnResolution::OptionsReady { option_set_id } => {
                tracing::info!(
                    event = LabEvent::TurnOptionsReady.as_str(),
                    option_set_id,
                    "options ready for labeling"
                );
                Outcome::accepted()
            }
            TurnResolution::Direct(record) => {
                tracing::info!(
                    event = LabEvent::TurnDirectAnswer.as_str(),
                    session = state.session().number(),
                    "single answer appended without labeling"
                );
                self.persist(record).await
            }
            TurnResolution::Failed(failure) => {
                tracing::warn!(
                    event = LabEvent::TurnGenerationFailed.as_str(),
                    config_missing = failure.is_config_missing(),
                    error = %failure,
                    "generation failed; fallback reply appended"
                );
                let notice = match failure {
                    GenerationFailure::MissingCredential { .. } => Notice::warning(failure.to_string()),
                    _ => Notice::error(format!("{failure}; switched to the fallback reply")),
                };
                Outcome::accepted().with(notice)
            }
        }
    }

    async fn handle_finalize(&self, state: &mut SessionState, choice: usize) -> Outcome {
        let record = match state.finalize(choice) {
            Ok(record) => record,
            Err(reason) => return Outcome::rejected(&reason),
        };
        tracing::info!(
            event = LabEvent::TurnFinalized.as_str(),
            choice,
            good_idx = ?record.good_idx,
            bad_idx = ?record.bad_idx,
            option_set_id = state.option_set_id(),
            "turn finalized"
        );
        self.persist(record).await
    }

    async fn persist(&self, record: TurnLogRecord) -> Outcome {
        let report = self.recorder.append(record).await;
        report.errors().fold(Outcome::accepted(), |outcome, error| {
            outcome.with(Notice::error(format!("could not save turn log: {error}")))
        })
    }

    fn handle_advance(&self, state: &mut SessionState) -> Outcome {
        let next = match state.advance_session() {
            Ok(next) => next,
            Err(reason) => return Outcome::rejected(&reason),
        };
        tracing::info!(
            event = LabEvent::SessionAdvanced.as_str(),
            session = next.number(),
            option_set_id = state.option_set_id(),
            "session advanced"
        );
        if next == ExperimentSession::Ended {
            tracing::info!(
                event = LabEvent::ExperimentEnded.as_str(),
                user_name = state.user_name().unwrap_or_default(),
                "experiment ended"
            );
            return Outcome::accepted().with(Notice::info(self.instructions(state)));
        }
        Outcome::accepted()
    }

    async fn handle_export(&self, state: &mut SessionState, target: Option<PathBuf>) -> Outcome {
        let target = target.unwrap_or_else(|| self.export_path.clone());
        match self.recorder.export(&target).await {
            Ok(Some(rows)) => {
                state.record_export_path(target.clone());
                Outcome::accepted().with(Notice::info(format!(
                    "Exported {rows} turn records to {}.",
                    target.display()
                )))
            }
            Ok(None) => Outcome::accepted().with(Notice::info("No turn records to export yet.")),
            Err(error) => Outcome::accepted().with(Notice::error(format!("export failed: {error}"))),
        }
    }
}
