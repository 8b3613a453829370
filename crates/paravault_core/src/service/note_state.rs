//! Per-note processing state machine.
//!
//! # Invariants
//! - `Succeeded` and `Failed` are terminal.
//! - Forward transitions follow the pipeline order exactly; any non-terminal
//!   state may fail.

use std::fmt::{Display, Formatter};

/// Pipeline stage of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Pending,
    Classifying,
    Transforming,
    Writing,
    Verifying,
    Succeeded,
    Failed,
}

impl NoteState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: NoteState) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Self::Failed)
                | (Self::Pending, Self::Classifying)
                | (Self::Classifying, Self::Transforming)
                | (Self::Transforming, Self::Writing)
                | (Self::Writing, Self::Verifying)
                | (Self::Verifying, Self::Succeeded)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Classifying => "classifying",
            Self::Transforming => "transforming",
            Self::Writing => "writing",
            Self::Verifying => "verifying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl Display for NoteState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
