//! Structured event names attached to `tracing` records as `event = ...`.

/// Lab lifecycle and turn events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabEvent {
    ExperimentStarted,
    ExperimentEnded,
    SessionAdvanced,
    TurnSubmitted,
    TurnOptionsReady,
    TurnDirectAnswer,
    TurnGenerationFailed,
    TurnLabelMarked,
    TurnFinalized,
    InteractionRejected,
    CompletionRequested,
    ReasoningLogWriteFailed,
    RecordAppended,
    RecordLocalWriteFailed,
    RecordRemoteMirrorFailed,
    RecordExported,
}

impl LabEvent {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::ExperimentStarted => "lab.experiment.started",
            Self::ExperimentEnded => "lab.experiment.ended",
            Self::SessionAdvanced => "lab.session.advanced",
            Self::TurnSubmitted => "lab.turn.submitted",
            Self::TurnOptionsReady => "lab.turn.options_ready",
            Self::TurnDirectAnswer => "lab.turn.direct_answer",
            Self::TurnGenerationFailed => "lab.turn.generation_failed",
            Self::TurnLabelMarked => "lab.turn.label_marked",
            Self::TurnFinalized => "lab.turn.finalized",
            Self::InteractionRejected => "lab.interaction.rejected",
            Self::CompletionRequested => "lab.completion.requested",
            Self::ReasoningLogWriteFailed => "lab.reasoning_log.write_failed",
            Self::RecordAppended => "lab.record.appended",
            Self::RecordLocalWriteFailed => "lab.record.local_write_failed",
            Self::RecordRemoteMirrorFailed => "lab.record.remote_mirror_failed",
            Self::RecordExported => "lab.record.exported",
        }
    }
}
