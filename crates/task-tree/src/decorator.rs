//! Decorator task nodes.
//!
//! Decorators wrap a single child and modify its result or its cadence.
//! This module provides [`Inverter`] (NOT logic), [`AlwaysSucceed`] (error
//! suppression), [`Repeater`], [`Guard`], and [`Timeout`].

use std::time::{Duration, Instant};

use crate::blackboard::Entries;
use crate::error::{BlackboardError, Result};
use crate::{Blackboard, Node, Task, TaskState};

/// Side-effect-free test evaluated while the blackboard lock is held.
pub type Predicate = Box<dyn Fn(&Entries) -> std::result::Result<bool, BlackboardError> + Send>;

/// Inverts the result of its child.
///
/// # Semantics
///
/// - If the child returns `Success`, the inverter returns `Failure`
/// - If the child returns `Failure`, the inverter returns `Success`
/// - `Running` passes through unchanged
pub struct Inverter {
    child: Node,
}

impl Inverter {
    /// Creates a new inverter that wraps the given child.
    pub fn new(child: Node) -> Self {
        Self { child }
    }
}

impl Task for Inverter {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        Ok(self.child.tick(blackboard)?.invert())
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        self.child.reset(blackboard);
    }
}

/// Returns `Success` once its child finishes, whatever the child reported.
///
/// Useful for optional pipeline steps that shouldn't cause a sequence to fail.
pub struct AlwaysSucceed {
    child: Node,
}

impl AlwaysSucceed {
    /// Creates a new always-succeed wrapper around the given child.
    pub fn new(child: Node) -> Self {
        Self { child }
    }
}

impl Task for AlwaysSucceed {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        match self.child.tick(blackboard)? {
            TaskState::Running => Ok(TaskState::Running),
            TaskState::Success | TaskState::Failure => Ok(TaskState::Success),
        }
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        self.child.reset(blackboard);
    }
}

/// Runs its child again every time it finishes.
///
/// # Semantics
///
/// - One child activation per tick at most; the child is re-entered on the
///   tick after it finished
/// - With a limit of `n`, returns `Running` until the child finished `n` times,
///   then returns the configured outcome (`Success` unless changed)
/// - With no limit, returns `Running` forever
/// - The child's own results are not inspected
pub struct Repeater {
    child: Node,
    limit: Option<u32>,
    completed: u32,
    outcome: TaskState,
}

impl Repeater {
    pub fn new(child: Node, limit: Option<u32>) -> Self {
        Self {
            child,
            limit,
            completed: 0,
            outcome: TaskState::Success,
        }
    }

    /// Sets the state reported once the limit is reached.
    ///
    /// # Panics
    ///
    /// Panics if `outcome` is `Running`.
    pub fn with_outcome(mut self, outcome: TaskState) -> Self {
        assert!(
            outcome.is_terminal(),
            "Repeater outcome must be Success or Failure"
        );
        self.outcome = outcome;
        self
    }

    fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.completed >= limit)
    }
}

impl Task for Repeater {
    fn enter(&mut self, _blackboard: &Blackboard) {
        self.completed = 0;
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        if self.exhausted() {
            return Ok(self.outcome);
        }

        if self.child.tick(blackboard)?.is_running() {
            return Ok(TaskState::Running);
        }

        self.completed += 1;
        if self.exhausted() {
            return Ok(self.outcome);
        }

        self.child.reset(blackboard);
        Ok(TaskState::Running)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        self.child.reset(blackboard);
        self.completed = 0;
    }
}

/// Enters its child only if a predicate over the blackboard holds.
///
/// # Semantics
///
/// - The predicate is evaluated once per activation, before the child is
///   entered, under the blackboard lock
/// - If it is false, returns `Failure` without entering the child
/// - If it is true, every later tick is delegated to the child
///
/// To poll a condition, wrap the guard in something that resets it, such as a
/// [`Repeater`] or a [`Selector`](crate::Selector) retried by the runner.
pub struct Guard {
    predicate: Predicate,
    child: Node,
    admitted: bool,
}

impl Guard {
    pub fn new<F>(predicate: F, child: Node) -> Self
    where
        F: Fn(&Entries) -> std::result::Result<bool, BlackboardError> + Send + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            child,
            admitted: false,
        }
    }
}

impl Task for Guard {
    fn enter(&mut self, _blackboard: &Blackboard) {
        self.admitted = false;
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        if !self.admitted {
            // The lock is released before the child runs.
            let admitted = (self.predicate)(&*blackboard.lock())?;
            if !admitted {
                return Ok(TaskState::Failure);
            }
            self.admitted = true;
        }
        self.child.tick(blackboard)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        self.child.reset(blackboard);
        self.admitted = false;
    }
}

/// Fails if its child has not finished within a wall-clock limit.
///
/// # Semantics
///
/// - The deadline is `limit` after this node is entered; a limit too large
///   to represent as an instant means no deadline
/// - A child that finishes in time has its result passed through
/// - On the first tick at or past the deadline with the child still running,
///   the child is reset and the timeout returns `Failure`
pub struct Timeout {
    child: Node,
    limit: Duration,
    /// `None` when the limit overflows the clock.
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn new(child: Node, limit: Duration) -> Self {
        Self {
            child,
            limit,
            deadline: None,
        }
    }
}

impl Task for Timeout {
    fn enter(&mut self, _blackboard: &Blackboard) {
        self.deadline = Instant::now().checked_add(self.limit);
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        let Some(deadline) = self.deadline else {
            return self.child.tick(blackboard);
        };

        if Instant::now() < deadline {
            let state = self.child.tick(blackboard)?;
            if state.is_terminal() || Instant::now() < deadline {
                return Ok(state);
            }
        }

        tracing::warn!(
            "`{}` did not finish within {:?}; cancelling",
            self.child.name(),
            self.limit
        );
        self.child.reset(blackboard);
        Ok(TaskState::Failure)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        self.child.reset(blackboard);
        self.deadline = None;
    }
}
