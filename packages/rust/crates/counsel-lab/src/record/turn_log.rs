//! Persisted record, one per resolved turn.

use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentSession;
use crate::parser::TextOrList;

/// Immutable once written; the JSONL store never rewrites a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLogRecord {
    pub user_name: String,
    pub session: ExperimentSession,
    /// User message text.
    pub user: String,
    /// All candidates on the labeled path; the single reply on the direct path.
    pub assistant: TextOrList,
    /// Text that continued the transcript.
    pub assistant_selected: String,
    pub good_idx: Option<usize>,
    pub bad_idx: Option<usize>,
    pub good_reason: String,
    pub bad_reason: String,
    pub reasoning: String,
}
