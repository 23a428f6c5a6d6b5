//! Error types for contract violations.
//!
//! A task that fails at its work reports [`TaskState::Failure`]; the errors in
//! this module are reserved for a malformed tree or an inconsistent leaf and
//! travel out of [`TreeRunner::run`] untouched.
//!
//! [`TaskState::Failure`]: crate::TaskState::Failure
//! [`TreeRunner::run`]: crate::TreeRunner::run

use thiserror::Error;

use crate::node::Phase;

pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors raised by typed blackboard access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard key `{key}` not found")]
    KeyNotFound { key: String },

    #[error("blackboard key `{key}` holds {found}, requested {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised while ticking a tree.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Blackboard(#[from] BlackboardError),

    #[error("task `{task}` ticked while {phase}; reset it before ticking again")]
    InvalidTick { task: String, phase: Phase },

    #[error("run exceeded the limit of {limit} ticks")]
    TickLimitExceeded { limit: u64 },

    #[error("task contract violated: {0}")]
    Contract(String),
}
