//! Run state machine.
//!
//! Valid transitions for one run of a dictation:
//! - Idle -> InProgress (start)
//! - InProgress -> AwaitingAdvance (attempt recorded)
//! - AwaitingAdvance -> AwaitingAdvance (re-submission before advancing)
//! - InProgress | AwaitingAdvance -> InProgress (advance, sentences remain)
//! - InProgress | AwaitingAdvance -> Completed (advance past the last sentence)
//! - Completed -> Idle (finalize)

use std::fmt;

/// Lifecycle state of the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No active run.
    Idle,
    /// A sentence is shown and awaits its first submission.
    InProgress,
    /// At least one attempt was recorded for the current sentence.
    AwaitingAdvance,
    /// Every sentence has been passed; only finalize is allowed.
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "Idle"),
            RunState::InProgress => write!(f, "InProgress"),
            RunState::AwaitingAdvance => write!(f, "AwaitingAdvance"),
            RunState::Completed => write!(f, "Completed"),
        }
    }
}

impl RunState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &RunState) -> bool {
        matches!(
            (self, target),
            (RunState::Idle, RunState::InProgress)
                | (RunState::InProgress, RunState::AwaitingAdvance)
                | (RunState::AwaitingAdvance, RunState::AwaitingAdvance)
                | (RunState::InProgress, RunState::InProgress)
                | (RunState::AwaitingAdvance, RunState::InProgress)
                | (RunState::InProgress, RunState::Completed)
                | (RunState::AwaitingAdvance, RunState::Completed)
                | (RunState::Completed, RunState::Idle)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RunState; 4] = [
        RunState::Idle,
        RunState::InProgress,
        RunState::AwaitingAdvance,
        RunState::Completed,
    ];

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Idle.to_string(), "Idle");
        assert_eq!(RunState::InProgress.to_string(), "InProgress");
        assert_eq!(RunState::AwaitingAdvance.to_string(), "AwaitingAdvance");
        assert_eq!(RunState::Completed.to_string(), "Completed");
    }

    #[test]
    fn test_forward_path() {
        assert!(RunState::Idle.can_transition_to(&RunState::InProgress));
        assert!(RunState::InProgress.can_transition_to(&RunState::AwaitingAdvance));
        assert!(RunState::AwaitingAdvance.can_transition_to(&RunState::InProgress));
        assert!(RunState::AwaitingAdvance.can_transition_to(&RunState::Completed));
        assert!(RunState::Completed.can_transition_to(&RunState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!RunState::Idle.can_transition_to(&RunState::AwaitingAdvance));
        assert!(!RunState::Idle.can_transition_to(&RunState::Completed));
        assert!(!RunState::Idle.can_transition_to(&RunState::Idle));
        assert!(!RunState::InProgress.can_transition_to(&RunState::Idle));
        assert!(!RunState::AwaitingAdvance.can_transition_to(&RunState::Idle));
        assert!(!RunState::Completed.can_transition_to(&RunState::InProgress));
        assert!(!RunState::Completed.can_transition_to(&RunState::AwaitingAdvance));
        assert!(!RunState::Completed.can_transition_to(&RunState::Completed));
    }

    #[test]
    fn test_all_valid_transitions_count() {
        let valid = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (from, to)))
            .filter(|(from, to)| from.can_transition_to(to))
            .count();
        assert_eq!(valid, 8);
    }
}
