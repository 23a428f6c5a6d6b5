//! Composite task nodes.
//!
//! Composite nodes control the execution flow of multiple children.
//! This module provides [`Sequence`] (AND logic), [`Selector`] (OR logic), and
//! [`Parallel`] (threshold logic over concurrently ticked children).

use crate::error::Result;
use crate::{Blackboard, Node, Task, TaskState};

/// Ticks children in order until one fails.
///
/// # Semantics
///
/// A `Sequence` node evaluates its children from left to right:
/// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
/// - If a child returns `Running`, the sequence returns `Running` and resumes
///   at that same child on the next tick
/// - If a child returns `Success`, the sequence **continues** to the next child
/// - If all children return `Success`, the sequence returns `Success`
///
/// Children after the one that stopped the sequence are never entered.
pub struct Sequence {
    children: Vec<Node>,
    current: usize,
}

impl Sequence {
    /// Creates a new sequence with the given children.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty. A sequence with no children is
    /// meaningless and likely indicates a programming error.
    pub fn new(children: Vec<Node>) -> Self {
        assert!(
            !children.is_empty(),
            "Sequence must have at least one child"
        );
        Self {
            children,
            current: 0,
        }
    }
}

impl Task for Sequence {
    fn enter(&mut self, _blackboard: &Blackboard) {
        self.current = 0;
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        while let Some(child) = self.children.get_mut(self.current) {
            match child.tick(blackboard)? {
                TaskState::Success => self.current += 1,
                TaskState::Failure => return Ok(TaskState::Failure),
                TaskState::Running => return Ok(TaskState::Running),
            }
        }
        Ok(TaskState::Success)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        // Children past the cursor were never entered; Node::reset skips them.
        for child in &mut self.children {
            child.reset(blackboard);
        }
        self.current = 0;
    }
}

/// Ticks children in order until one succeeds.
///
/// # Semantics
///
/// A `Selector` node evaluates its children from left to right:
/// - If a child returns `Success`, the selector **stops immediately** and returns `Success`
/// - If a child returns `Running`, the selector returns `Running` and resumes
///   at that same child on the next tick
/// - If a child returns `Failure`, the selector **continues** to the next child
/// - If all children return `Failure`, the selector returns `Failure`
pub struct Selector {
    children: Vec<Node>,
    current: usize,
}

impl Selector {
    /// Creates a new selector with the given children.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty. A selector with no children is
    /// meaningless and likely indicates a programming error.
    pub fn new(children: Vec<Node>) -> Self {
        assert!(
            !children.is_empty(),
            "Selector must have at least one child"
        );
        Self {
            children,
            current: 0,
        }
    }
}

impl Task for Selector {
    fn enter(&mut self, _blackboard: &Blackboard) {
        self.current = 0;
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        while let Some(child) = self.children.get_mut(self.current) {
            match child.tick(blackboard)? {
                TaskState::Success => return Ok(TaskState::Success),
                TaskState::Failure => self.current += 1,
                TaskState::Running => return Ok(TaskState::Running),
            }
        }
        Ok(TaskState::Failure)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        for child in &mut self.children {
            child.reset(blackboard);
        }
        self.current = 0;
    }
}

/// Ticks every unfinished child on every tick and decides by thresholds.
///
/// # Semantics
///
/// - Children that already finished are not ticked again; their result keeps
///   counting towards the thresholds
/// - Once at least `success_threshold` children succeeded, returns `Success`
/// - Otherwise, once at least `failure_threshold` children failed, returns `Failure`
/// - If every child finished without meeting either threshold, returns `Failure`
/// - Otherwise returns `Running`
///
/// When the node finishes, children that are still running are reset, which
/// cancels them.
pub struct Parallel {
    children: Vec<Node>,
    success_threshold: usize,
    failure_threshold: usize,
}

impl Parallel {
    /// Creates a parallel node with explicit thresholds.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty or either threshold is outside
    /// `1..=children.len()`.
    pub fn new(children: Vec<Node>, success_threshold: usize, failure_threshold: usize) -> Self {
        assert!(
            !children.is_empty(),
            "Parallel must have at least one child"
        );
        let count = children.len();
        assert!(
            (1..=count).contains(&success_threshold),
            "Parallel success threshold {success_threshold} outside 1..={count}"
        );
        assert!(
            (1..=count).contains(&failure_threshold),
            "Parallel failure threshold {failure_threshold} outside 1..={count}"
        );
        Self {
            children,
            success_threshold,
            failure_threshold,
        }
    }

    /// Succeeds when every child succeeded, fails on the first failure.
    pub fn require_all(children: Vec<Node>) -> Self {
        let count = children.len();
        Self::new(children, count, 1)
    }

    /// Succeeds on the first success, fails when every child failed.
    pub fn require_one(children: Vec<Node>) -> Self {
        let count = children.len();
        Self::new(children, 1, count)
    }

    fn cancel_running(&mut self, blackboard: &Blackboard) {
        for child in self.children.iter_mut().filter(|c| !c.is_terminal()) {
            child.reset(blackboard);
        }
    }
}

impl Task for Parallel {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        let mut successes = 0;
        let mut failures = 0;

        for child in &mut self.children {
            let state = match child.state() {
                Some(state) if child.is_terminal() => state,
                _ => child.tick(blackboard)?,
            };
            match state {
                TaskState::Success => successes += 1,
                TaskState::Failure => failures += 1,
                TaskState::Running => {}
            }
        }

        let finished = successes + failures == self.children.len();
        let state = if successes >= self.success_threshold {
            TaskState::Success
        } else if failures >= self.failure_threshold || finished {
            TaskState::Failure
        } else {
            return Ok(TaskState::Running);
        };

        self.cancel_running(blackboard);
        Ok(state)
    }

    fn reset(&mut self, blackboard: &Blackboard) {
        for child in &mut self.children {
            child.reset(blackboard);
        }
    }
}
