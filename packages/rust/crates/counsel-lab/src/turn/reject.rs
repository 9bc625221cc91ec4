//! Validation failures: the action is refused and state is left untouched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("enter your name to start the experiment")]
    EmptyName,
    #[error("the experiment has already started")]
    AlreadyStarted,
    #[error("the experiment has not started yet; enter your name first")]
    NotStarted,
    #[error("the experiment has ended; no further input is accepted")]
    ExperimentEnded,
    #[error("label the current options before sending a new message")]
    AwaitingLabels,
    #[error("message is empty")]
    EmptyMessage,
    #[error("there are no options to label")]
    NoPendingOptions,
    #[error("option index {index} is out of range (have {len} options)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("mark one option as good and a different one as bad before continuing")]
    LabelsIncomplete { missing_good: bool, missing_bad: bool },
}
