//! Project preparation pipeline.
//!
//! Prepares a source tree for indexing: locates the external toolchain, scans
//! sources and dependency archives on background threads, derives source
//! roots from package declarations, and builds one indexer command per
//! source file. Every step is a task in a
//! [`task_tree`] tree; the steps talk to each other only through the
//! blackboard keys in [`keys`].

pub mod commands;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod pipeline;
pub mod roots;
pub mod scan;
pub mod toolchain;

pub use commands::IndexerCommand;
pub use config::PrepareConfig;
pub use error::{PrepareError, Result};
pub use pipeline::{Preparation, Preparer, Project, build_pipeline};
pub use toolchain::Toolchain;
