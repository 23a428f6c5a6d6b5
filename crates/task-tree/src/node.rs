//! Tree nodes and the per-node state machine.
//!
//! ```text
//! NotEntered --enter--> Running --update--> Running | Success | Failure
//!                                                      |
//!                                                    exit
//!                                                      v
//!                                                    Exited
//! ```
//!
//! `reset` brings a node back to `NotEntered` from any phase. A `Running` node
//! is exited first, which is how a subtree gets cancelled.

use std::fmt;

use crate::error::{Result, TaskError};
use crate::{Blackboard, Task, TaskState};

/// Where a node is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NotEntered,
    Running,
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::NotEntered => "not entered",
            Phase::Running => "running",
            Phase::Exited => "exited",
        };
        write!(f, "{}", label)
    }
}

/// A task together with its life-cycle bookkeeping.
///
/// Composites and decorators own their children as `Node`s, which gives the
/// tree strict single ownership: no node refers to its parent or siblings.
pub struct Node {
    task: Box<dyn Task>,
    name: String,
    phase: Phase,
    state: Option<TaskState>,
}

impl Node {
    /// Wraps `task`, naming the node after the task.
    pub fn new<T: Task + 'static>(task: T) -> Self {
        Self::from_boxed(Box::new(task))
    }

    pub fn from_boxed(task: Box<dyn Task>) -> Self {
        let name = task.name().to_owned();
        Self {
            task,
            name,
            phase: Phase::NotEntered,
            state: None,
        }
    }

    /// Overrides the label used in logs and errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The state reported by the most recent tick, cleared by reset.
    pub fn state(&self) -> Option<TaskState> {
        self.state
    }

    /// Returns `true` once the node has reported `Success` or `Failure` and
    /// been exited.
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Exited
    }

    /// Ticks the node once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTick`] if the node already exited and has
    /// not been reset, and forwards any error raised by the task.
    pub fn tick(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        match self.phase {
            Phase::Exited => {
                return Err(TaskError::InvalidTick {
                    task: self.name.clone(),
                    phase: self.phase,
                });
            }
            Phase::NotEntered => {
                tracing::trace!("enter `{}`", self.name);
                self.task.enter(blackboard);
                self.phase = Phase::Running;
            }
            Phase::Running => {}
        }

        let state = self.task.update(blackboard)?;
        self.state = Some(state);

        if state.is_terminal() {
            self.task.exit(blackboard);
            self.phase = Phase::Exited;
            tracing::trace!("exit `{}` with {:?}", self.name, state);
        }

        Ok(state)
    }

    /// Returns the node to `NotEntered`.
    ///
    /// A running node is exited before its task is reset. A node that was
    /// never entered is left alone, so calling this repeatedly is harmless.
    pub fn reset(&mut self, blackboard: &Blackboard) {
        match self.phase {
            Phase::NotEntered => return,
            Phase::Running => {
                tracing::debug!("cancelling running task `{}`", self.name);
                self.task.exit(blackboard);
            }
            Phase::Exited => {}
        }

        self.task.reset(blackboard);
        self.phase = Phase::NotEntered;
        self.state = None;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts hook invocations in the blackboard and finishes after `ticks`.
    struct Counting {
        ticks: u32,
        seen: u32,
    }

    impl Counting {
        fn bump(blackboard: &Blackboard, key: &str) {
            let mut entries = blackboard.lock();
            let count = entries.get_opt::<u32>(key).unwrap().unwrap_or(0);
            entries.set(key, count + 1);
        }
    }

    impl Task for Counting {
        fn enter(&mut self, blackboard: &Blackboard) {
            self.seen = 0;
            Self::bump(blackboard, "enter");
        }

        fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
            Self::bump(blackboard, "update");
            self.seen += 1;
            if self.seen >= self.ticks {
                Ok(TaskState::Success)
            } else {
                Ok(TaskState::Running)
            }
        }

        fn exit(&mut self, blackboard: &Blackboard) {
            Self::bump(blackboard, "exit");
        }

        fn reset(&mut self, blackboard: &Blackboard) {
            Self::bump(blackboard, "reset");
        }
    }

    fn count(blackboard: &Blackboard, key: &str) -> u32 {
        blackboard.get_opt(key).unwrap().unwrap_or(0)
    }

    #[test]
    fn enter_once_exit_once() {
        let blackboard = Blackboard::new();
        let mut node = Node::new(Counting { ticks: 3, seen: 0 });

        assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Running);
        assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Running);
        assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Success);

        assert_eq!(count(&blackboard, "enter"), 1);
        assert_eq!(count(&blackboard, "update"), 3);
        assert_eq!(count(&blackboard, "exit"), 1);
        assert_eq!(node.phase(), Phase::Exited);
        assert_eq!(node.state(), Some(TaskState::Success));
    }

    #[test]
    fn ticking_an_exited_node_fails_fast() {
        let blackboard = Blackboard::new();
        let mut node = Node::new(Counting { ticks: 1, seen: 0 }).named("probe");
        node.tick(&blackboard).unwrap();

        let err = node.tick(&blackboard).unwrap_err();
        assert!(matches!(
            err,
            TaskError::InvalidTick { ref task, phase: Phase::Exited } if task == "probe"
        ));
    }

    #[test]
    fn reset_of_running_node_exits_first() {
        let blackboard = Blackboard::new();
        let mut node = Node::new(Counting { ticks: 5, seen: 0 });
        node.tick(&blackboard).unwrap();

        node.reset(&blackboard);

        assert_eq!(count(&blackboard, "exit"), 1);
        assert_eq!(count(&blackboard, "reset"), 1);
        assert_eq!(node.phase(), Phase::NotEntered);
        assert_eq!(node.state(), None);
    }

    #[test]
    fn reset_is_idempotent() {
        let blackboard = Blackboard::new();
        let mut node = Node::new(Counting { ticks: 1, seen: 0 });
        node.tick(&blackboard).unwrap();

        node.reset(&blackboard);
        node.reset(&blackboard);

        assert_eq!(node.phase(), Phase::NotEntered);
        assert_eq!(count(&blackboard, "reset"), 1);
        assert_eq!(count(&blackboard, "exit"), 1);

        assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Success);
        assert_eq!(count(&blackboard, "enter"), 2);
    }

    #[test]
    fn errors_leave_the_node_running() {
        struct Broken;
        impl Task for Broken {
            fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
                let _: u8 = blackboard.get("missing")?;
                Ok(TaskState::Success)
            }
        }

        let blackboard = Blackboard::new();
        let mut node = Node::new(Broken);

        assert!(matches!(
            node.tick(&blackboard),
            Err(TaskError::Blackboard(_))
        ));
        assert_eq!(node.phase(), Phase::Running);
    }
}
