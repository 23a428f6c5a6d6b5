//! Drives a tree to completion.
//!
//! The runner owns one root node and the blackboard of the current run. Ticks
//! are synchronous and happen on the caller's thread; the only thing that may
//! come from elsewhere is a cancellation request through a [`CancelToken`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::config::RunnerConfig;
use crate::error::{Result, TaskError};
use crate::{Blackboard, Node, Phase, RunOutcome, TaskState};

/// Shared flag used to cancel a run from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    requested: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the runner honours it before its next tick.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Clears the request, returning whether one was pending.
    fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

/// Ticks a root node until it finishes or is cancelled.
pub struct TreeRunner {
    root: Node,
    blackboard: Blackboard,
    config: RunnerConfig,
    cancel_token: CancelToken,
    ticks: u64,
}

impl TreeRunner {
    pub fn new(root: Node, blackboard: Blackboard) -> Self {
        Self {
            root,
            blackboard,
            config: RunnerConfig::default(),
            cancel_token: CancelToken::new(),
            ticks: 0,
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns a token that cancels this runner's in-flight run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel_token.clone()
    }

    /// Ticks taken by the current run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks the root once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTick`] if the previous run finished and the
    /// runner has not been reset, and forwards errors raised by tasks.
    pub fn tick(&mut self) -> Result<TaskState> {
        if self.root.phase() == Phase::NotEntered {
            tracing::debug!("starting run of `{}`", self.root.name());
        }
        let state = self.root.tick(&self.blackboard)?;
        self.ticks += 1;
        Ok(state)
    }

    /// Ticks the root until it reports `Success` or `Failure`.
    ///
    /// A pending cancellation request is honoured before each tick and makes
    /// the run end with [`RunOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// - [`TaskError::TickLimitExceeded`] when the configured tick budget runs
    ///   out; the tree is cancelled first
    /// - any contract violation raised while ticking, with the tree left as it
    ///   was for inspection
    pub fn run(&mut self) -> Result<RunOutcome> {
        loop {
            if self.cancel_token.take() {
                return Ok(self.cancel());
            }

            if let Some(limit) = self.config.max_ticks
                && self.ticks >= limit
            {
                self.cancel();
                return Err(TaskError::TickLimitExceeded { limit });
            }

            let state = self.tick()?;
            if let Some(outcome) = RunOutcome::from_terminal(state) {
                tracing::info!(
                    "`{}` finished with {:?} after {} ticks",
                    self.root.name(),
                    outcome,
                    self.ticks
                );
                return Ok(outcome);
            }

            if !self.config.tick_interval.is_zero() {
                thread::sleep(self.config.tick_interval);
            }
        }
    }

    /// Abandons the current run.
    ///
    /// Resets the whole tree, which exits every running node on the way, and
    /// reports [`RunOutcome::Cancelled`]. External work started by leaves is
    /// only told to stop through their own reset hooks.
    pub fn cancel(&mut self) -> RunOutcome {
        tracing::warn!(
            "cancelling `{}` after {} ticks",
            self.root.name(),
            self.ticks
        );
        self.reset();
        RunOutcome::Cancelled
    }

    /// Returns the tree to its initial condition so it can be run again.
    ///
    /// Blackboard contents are left untouched.
    pub fn reset(&mut self) {
        self.root.reset(&self.blackboard);
        self.ticks = 0;
    }

    /// Consumes the runner, returning the blackboard of the last run.
    pub fn into_blackboard(self) -> Blackboard {
        self.blackboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{action, sequence, set_value};

    fn countdown(ticks: u32) -> Node {
        let mut remaining = ticks;
        action(move |_| {
            if remaining == 0 {
                return Ok(TaskState::Success);
            }
            remaining -= 1;
            Ok(TaskState::Running)
        })
    }

    #[test]
    fn run_returns_terminal_state() {
        let mut runner = TreeRunner::new(countdown(3), Blackboard::new());

        assert_eq!(runner.run().unwrap(), RunOutcome::Success);
        assert_eq!(runner.ticks(), 4);
    }

    #[test]
    fn run_again_requires_reset() {
        let mut runner = TreeRunner::new(set_value("k", 1u8), Blackboard::new());
        runner.run().unwrap();

        assert!(matches!(runner.run(), Err(TaskError::InvalidTick { .. })));

        runner.reset();
        assert_eq!(runner.run().unwrap(), RunOutcome::Success);
    }

    #[test]
    fn pending_cancel_ends_run() {
        let mut runner = TreeRunner::new(countdown(10), Blackboard::new());
        runner.tick().unwrap();

        runner.cancel_token().cancel();

        assert_eq!(runner.run().unwrap(), RunOutcome::Cancelled);
        assert_eq!(runner.root().phase(), Phase::NotEntered);
        // The request was consumed.
        assert!(!runner.cancel_token().is_cancelled());
    }

    #[test]
    fn tick_budget_cancels_the_tree() {
        let root = sequence(vec![countdown(100), set_value("done", true)]);
        let mut runner = TreeRunner::new(root, Blackboard::new())
            .with_config(RunnerConfig::default().with_max_ticks(5));

        let err = runner.run().unwrap_err();

        assert!(matches!(err, TaskError::TickLimitExceeded { limit: 5 }));
        assert_eq!(runner.root().phase(), Phase::NotEntered);
        assert!(!runner.blackboard().has("done"));
    }

    #[test]
    fn cancel_outcome_differs_from_failure() {
        let mut runner = TreeRunner::new(countdown(1), Blackboard::new());
        runner.tick().unwrap();

        let outcome = runner.cancel();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_ne!(outcome, RunOutcome::Failure);
    }
}
