//! Good/bad labels for one option set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    Good,
    Bad,
}

impl LabelSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

/// Labels for one option set. `good_index` and `bad_index` never hold the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub good_index: Option<usize>,
    pub bad_index: Option<usize>,
    pub good_reason: String,
    pub bad_reason: String,
}

impl Feedback {
    /// Mark `index` on `side`, clearing it from the other side. A given reason
    /// replaces the stored one for that side.
    pub fn mark(&mut self, side: LabelSide, index: usize, reason: Option<&str>) {
        let (this, other) = match side {
            LabelSide::Good => (&mut self.good_index, &mut self.bad_index),
            LabelSide::Bad => (&mut self.bad_index, &mut self.good_index),
        };
        *this = Some(index);
        if *other == Some(index) {
            *other = None;
        }
        if let Some(reason) = reason {
            self.set_reason(side, reason);
        }
    }

    pub fn set_reason(&mut self, side: LabelSide, reason: &str) {
        let slot = match side {
            LabelSide::Good => &mut self.good_reason,
            LabelSide::Bad => &mut self.bad_reason,
        };
        reason.trim().clone_into(slot);
    }

    pub fn index(&self, side: LabelSide) -> Option<usize> {
        match side {
            LabelSide::Good => self.good_index,
            LabelSide::Bad => self.bad_index,
        }
    }

    pub const fn is_complete(&self) -> bool {
        self.good_index.is_some() && self.bad_index.is_some()
    }
}
