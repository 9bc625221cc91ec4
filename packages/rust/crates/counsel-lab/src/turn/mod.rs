//! Turn state machine: transcript, pending option set, labels, session progression.

mod feedback;
mod reject;
mod state;

pub use feedback::{Feedback, LabelSide};
pub use reject::RejectReason;
pub use state::{
    FALLBACK_REPLY, OptionSet, PendingTurn, Phase, SessionState, TurnResolution,
};
