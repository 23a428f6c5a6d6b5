//! Builder utilities for ergonomic tree construction.
//!
//! Instead of writing verbose `Node::new(Sequence::new(vec![...]))`, you can
//! use shorter functions like `sequence(vec![...])`.
//!
//! ```rust
//! use std::time::Duration;
//! use task_tree::builder::*;
//! use task_tree::{Blackboard, RunOutcome, TreeRunner};
//!
//! let root = sequence(vec![
//!     set_value("stage", "prepare"),
//!     selector(vec![
//!         condition(|entries| Ok(entries.has("tool.path"))),
//!         set_value("tool.missing", true),
//!     ]),
//!     timeout(set_value("stage", "index"), Duration::from_secs(5)),
//! ]);
//!
//! let mut runner = TreeRunner::new(root, Blackboard::new());
//! assert_eq!(runner.run().unwrap(), RunOutcome::Success);
//! assert_eq!(runner.blackboard().get::<bool>("tool.missing"), Ok(true));
//! ```

use std::time::Duration;

use crate::blackboard::Entries;
use crate::error::{BlackboardError, Result};
use crate::{
    Action, AlwaysSucceed, Blackboard, Condition, Guard, Inverter, Node, Parallel, Repeater,
    Selector, Sequence, SetValue, TaskState, Timeout,
};

/// Creates a sequence node.
///
/// Shorthand for `Node::new(Sequence::new(children))`.
#[inline]
pub fn sequence(children: Vec<Node>) -> Node {
    Node::new(Sequence::new(children))
}

/// Creates a selector node.
///
/// Shorthand for `Node::new(Selector::new(children))`.
#[inline]
pub fn selector(children: Vec<Node>) -> Node {
    Node::new(Selector::new(children))
}

/// Creates a parallel node with explicit success and failure thresholds.
#[inline]
pub fn parallel(children: Vec<Node>, success_threshold: usize, failure_threshold: usize) -> Node {
    Node::new(Parallel::new(children, success_threshold, failure_threshold))
}

/// Creates an inverter node.
///
/// Shorthand for `Node::new(Inverter::new(child))`.
#[inline]
pub fn inverter(child: Node) -> Node {
    Node::new(Inverter::new(child))
}

/// Creates an always-succeed node.
///
/// Shorthand for `Node::new(AlwaysSucceed::new(child))`.
#[inline]
pub fn always_succeed(child: Node) -> Node {
    Node::new(AlwaysSucceed::new(child))
}

/// Repeats `child` `times` times, then succeeds.
#[inline]
pub fn repeat(child: Node, times: u32) -> Node {
    Node::new(Repeater::new(child, Some(times)))
}

/// Repeats `child` until the tree is reset or cancelled.
#[inline]
pub fn repeat_forever(child: Node) -> Node {
    Node::new(Repeater::new(child, None))
}

/// Runs `child` only if `predicate` holds when the guard is entered.
#[inline]
pub fn guard<F>(predicate: F, child: Node) -> Node
where
    F: Fn(&Entries) -> std::result::Result<bool, BlackboardError> + Send + 'static,
{
    Node::new(Guard::new(predicate, child))
}

/// Fails if `child` does not finish within `limit`.
#[inline]
pub fn timeout(child: Node, limit: Duration) -> Node {
    Node::new(Timeout::new(child, limit))
}

/// Creates a leaf that writes `value` under `key`.
#[inline]
pub fn set_value<T: Clone + Send + 'static>(key: impl Into<String>, value: T) -> Node {
    Node::new(SetValue::new(key, value))
}

/// Creates a leaf that checks `predicate`.
#[inline]
pub fn condition<F>(predicate: F) -> Node
where
    F: Fn(&Entries) -> std::result::Result<bool, BlackboardError> + Send + 'static,
{
    Node::new(Condition::new(predicate))
}

/// Creates a leaf from a closure.
#[inline]
pub fn action<F>(body: F) -> Node
where
    F: FnMut(&Blackboard) -> Result<TaskState> + Send + 'static,
{
    Node::new(Action::new(body))
}
