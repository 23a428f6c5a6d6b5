//! States reported by task nodes and outcomes reported by a run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of ticking a task once.
///
/// # Tick Semantics
///
/// Unlike a turn-based tree, a tick is allowed to leave work unfinished:
/// - Conditions evaluate immediately (e.g., "Has the scan finished?")
/// - Actions may finish in one tick or report `Running` and be ticked again
///   until work started elsewhere has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TaskState {
    /// The task has not finished yet and wants to be ticked again.
    Running,

    /// The task completed successfully.
    ///
    /// For conditions: The condition was met.
    /// For actions: The unit of work was carried out.
    Success,

    /// The task failed.
    ///
    /// This is an expected outcome routed by composites, not an error.
    Failure,
}

impl TaskState {
    /// Returns `true` if this state is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, TaskState::Success)
    }

    /// Returns `true` if this state is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, TaskState::Failure)
    }

    /// Returns `true` if this state is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, TaskState::Running)
    }

    /// Returns `true` for `Success` and `Failure`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Swaps `Success` and `Failure`; `Running` is returned unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            TaskState::Running => TaskState::Running,
            TaskState::Success => TaskState::Failure,
            TaskState::Failure => TaskState::Success,
        }
    }
}

/// How a run of a whole tree ended.
///
/// `Cancelled` is kept apart from `Failure` so callers can tell work that was
/// abandoned from work that genuinely failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunOutcome {
    Success,
    Failure,
    Cancelled,
}

impl RunOutcome {
    /// Maps a terminal task state to the matching outcome.
    ///
    /// Returns `None` for `Running`.
    pub fn from_terminal(state: TaskState) -> Option<Self> {
        match state {
            TaskState::Running => None,
            TaskState::Success => Some(RunOutcome::Success),
            TaskState::Failure => Some(RunOutcome::Failure),
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    #[inline]
    pub fn is_cancelled(self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_keeps_running() {
        assert_eq!(TaskState::Success.invert(), TaskState::Failure);
        assert_eq!(TaskState::Failure.invert(), TaskState::Success);
        assert_eq!(TaskState::Running.invert(), TaskState::Running);
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(TaskState::Success.is_terminal());
        assert!(TaskState::Failure.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn outcome_from_terminal_state() {
        assert_eq!(
            RunOutcome::from_terminal(TaskState::Success),
            Some(RunOutcome::Success)
        );
        assert_eq!(
            RunOutcome::from_terminal(TaskState::Failure),
            Some(RunOutcome::Failure)
        );
        assert_eq!(RunOutcome::from_terminal(TaskState::Running), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn states_serialize_by_name() {
        let json = serde_json::to_string(&RunOutcome::Cancelled).unwrap();
        assert_eq!(json, "\"Cancelled\"");
        let state: TaskState = serde_json::from_str("\"Running\"").unwrap();
        assert_eq!(state, TaskState::Running);
    }
}
