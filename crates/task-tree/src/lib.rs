//! Behavior-tree style task execution engine.
//!
//! Pipelines are expressed as trees of small tasks that are ticked to
//! completion against a shared, typed [`Blackboard`]. Ordering, conditions,
//! and parallel steps live in the tree shape instead of hand-written control
//! flow, and background work reports back through the blackboard.
//!
//! - **Cooperative ticks**: The tree is ticked by one thread; no task blocks
//! - **Running state**: Tasks may take many ticks, polling work started elsewhere
//! - **Strict ownership**: Every node owns its children; no back references
//! - **One shared channel**: Only the blackboard crosses thread boundaries
//!
//! # Architecture
//!
//! - [`Task`]: Life-cycle contract for all nodes (enter/update/exit/reset)
//! - [`Node`]: Wraps a task and enforces its state machine
//! - [`TaskState`]: Running, Success, or Failure
//! - Composite nodes: [`Sequence`], [`Selector`], [`Parallel`]
//! - Decorator nodes: [`Inverter`], [`AlwaysSucceed`], [`Repeater`], [`Guard`], [`Timeout`]
//! - Leaf nodes: [`SetValue`], [`Condition`], [`Action`]
//! - [`TreeRunner`]: Runs a root to completion, with cancellation

pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod config;
pub mod decorator;
pub mod error;
pub mod leaf;
pub mod node;
pub mod runner;
pub mod state;
pub mod task;

// Re-export core types for ergonomic API
pub use blackboard::{Blackboard, BlackboardGuard, Entries};
pub use composite::{Parallel, Selector, Sequence};
pub use config::RunnerConfig;
pub use decorator::{AlwaysSucceed, Guard, Inverter, Predicate, Repeater, Timeout};
pub use error::{BlackboardError, Result, TaskError};
pub use leaf::{Action, Condition, SetValue};
pub use node::{Node, Phase};
pub use runner::{CancelToken, TreeRunner};
pub use state::{RunOutcome, TaskState};
pub use task::Task;
