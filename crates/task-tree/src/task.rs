//! Core task trait.
//!
//! This module defines the [`Task`] trait, the life-cycle contract every node
//! in a tree implements. Tasks never tick themselves: a [`Node`] wraps each
//! task and calls these hooks in the order the state machine allows.
//!
//! [`Node`]: crate::Node

use crate::error::Result;
use crate::{Blackboard, TaskState};

/// A unit of work that can be ticked against a shared blackboard.
///
/// # Life Cycle
///
/// 1. [`enter`](Task::enter) once, on the first tick after construction or reset
/// 2. [`update`](Task::update) on that tick and on every later tick while it
///    keeps returning `Running`
/// 3. [`exit`](Task::exit) once, right after `update` returns `Success` or
///    `Failure`
/// 4. [`reset`](Task::reset) before the task may be entered again
///
/// None of the hooks may block. Long-running work is started elsewhere and
/// polled through the blackboard.
pub trait Task: Send {
    /// Initializes node-local state for a fresh activation.
    fn enter(&mut self, _blackboard: &Blackboard) {}

    /// Performs one bounded unit of work.
    ///
    /// # Returns
    ///
    /// - `Ok(TaskState::Running)` if the task should be ticked again
    /// - `Ok(TaskState::Success)` / `Ok(TaskState::Failure)` when it finished
    /// - `Err(_)` only for contract violations, never for ordinary failure
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState>;

    /// Releases anything acquired in [`enter`](Task::enter).
    fn exit(&mut self, _blackboard: &Blackboard) {}

    /// Returns the task to its pre-enter condition.
    ///
    /// Composites and decorators forward this to their children. For a leaf
    /// that started external work this is the hook to tell that work to stop.
    fn reset(&mut self, _blackboard: &Blackboard) {}

    /// Label used in logs and errors.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Blanket implementation for boxed tasks.
///
/// This allows `Box<dyn Task>` to also implement `Task`, so consumer code can
/// hand pre-boxed leaves to the builder functions.
impl Task for Box<dyn Task> {
    #[inline]
    fn enter(&mut self, blackboard: &Blackboard) {
        (**self).enter(blackboard)
    }

    #[inline]
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        (**self).update(blackboard)
    }

    #[inline]
    fn exit(&mut self, blackboard: &Blackboard) {
        (**self).exit(blackboard)
    }

    #[inline]
    fn reset(&mut self, blackboard: &Blackboard) {
        (**self).reset(blackboard)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// `task_tree::leaf::SetValue<alloc::string::String>` -> `SetValue`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Task for Noop {
        fn update(&mut self, _blackboard: &Blackboard) -> Result<TaskState> {
            Ok(TaskState::Success)
        }
    }

    #[test]
    fn default_name_is_the_bare_type_name() {
        assert_eq!(Noop.name(), "Noop");
        assert_eq!(
            short_type_name("task_tree::leaf::SetValue<alloc::string::String>"),
            "SetValue"
        );
    }

    #[test]
    fn boxed_task_forwards_to_inner() {
        let mut boxed: Box<dyn Task> = Box::new(Noop);
        let blackboard = Blackboard::new();

        assert_eq!(Task::name(&boxed), "Noop");
        assert_eq!(boxed.update(&blackboard).unwrap(), TaskState::Success);
    }
}
