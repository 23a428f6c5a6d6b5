//! Leaf tasks.
//!
//! Leaves do the actual work and never have children. Most pipelines define
//! their own leaves by implementing [`Task`]; the ones here cover writing a
//! value, checking a condition, and wrapping a closure.

use std::fmt;

use crate::blackboard::Entries;
use crate::decorator::Predicate;
use crate::error::{BlackboardError, Result};
use crate::{Blackboard, Task, TaskState};

/// Writes a fixed value under a fixed key and succeeds.
///
/// Always finishes in a single tick with `Success`. Any previous value under
/// the key is replaced, whatever its type.
pub struct SetValue<T> {
    key: String,
    value: T,
}

impl<T> SetValue<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<T: Clone + Send + 'static> Task for SetValue<T> {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        blackboard.lock().set(self.key.clone(), self.value.clone());
        Ok(TaskState::Success)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetValue")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Succeeds if a predicate over the blackboard holds, fails otherwise.
pub struct Condition {
    predicate: Predicate,
}

impl Condition {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Entries) -> std::result::Result<bool, BlackboardError> + Send + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Task for Condition {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        if (self.predicate)(&*blackboard.lock())? {
            Ok(TaskState::Success)
        } else {
            Ok(TaskState::Failure)
        }
    }
}

/// Leaf backed by a closure called on every update.
///
/// # Example
///
/// ```rust
/// use task_tree::{Action, Blackboard, Node, TaskState};
///
/// let mut node = Node::new(Action::new(|blackboard: &Blackboard| {
///     let done = blackboard.get_opt::<bool>("scan.done")?.unwrap_or(false);
///     Ok(if done { TaskState::Success } else { TaskState::Running })
/// }));
///
/// let blackboard = Blackboard::new();
/// assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Running);
/// blackboard.set("scan.done", true);
/// assert_eq!(node.tick(&blackboard).unwrap(), TaskState::Success);
/// ```
pub struct Action {
    body: Box<dyn FnMut(&Blackboard) -> Result<TaskState> + Send>,
}

impl Action {
    pub fn new<F>(body: F) -> Self
    where
        F: FnMut(&Blackboard) -> Result<TaskState> + Send + 'static,
    {
        Self {
            body: Box::new(body),
        }
    }
}

impl Task for Action {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        (self.body)(blackboard)
    }
}
