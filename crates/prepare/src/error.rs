//! Error types surfaced by the preparation pipeline.
//!
//! Wraps failures from the task tree, toolchain discovery, and source scans so
//! the binary can bubble them up with consistent context.
use std::path::PathBuf;

use thiserror::Error;

use task_tree::{BlackboardError, TaskError};

pub type Result<T> = std::result::Result<T, PrepareError>;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("preparation failed during {stage}: {reason}")]
    Failed { stage: String, reason: String },

    #[error("preparation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}

/// Errors raised while locating the external tool.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("configured tool {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("`{name}` was not found on PATH")]
    NotOnPath { name: String },
}

/// Errors raised by a background source scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("scan abandoned")]
    Aborted,
}
