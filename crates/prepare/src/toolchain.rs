//! External tool discovery.
//!
//! A [`Toolchain`] is located once by the binary and handed to the leaves that
//! need it; nothing in the pipeline looks it up on its own.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use task_tree::{Blackboard, Result, Task, TaskState};

use crate::error::ToolchainError;
use crate::keys;

/// A located external tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    program: PathBuf,
}

impl Toolchain {
    /// Uses `configured` when given, otherwise searches `PATH` for `name`.
    pub fn locate(
        name: &str,
        configured: Option<&Path>,
    ) -> std::result::Result<Self, ToolchainError> {
        if let Some(path) = configured {
            return if path.is_file() {
                Ok(Self::at(path))
            } else {
                Err(ToolchainError::NotFound {
                    path: path.to_path_buf(),
                })
            };
        }

        let search = env::var_os("PATH").unwrap_or_default();
        env::split_paths(&search)
            .flat_map(|dir| candidates(&dir, name))
            .find(|candidate| candidate.is_file())
            .map(Self::at)
            .ok_or_else(|| ToolchainError::NotOnPath {
                name: name.to_string(),
            })
    }

    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(name), dir.join(format!("{name}.exe"))]
    } else {
        vec![dir.join(name)]
    }
}

/// Publishes the toolchain to the blackboard, failing when there is none.
pub struct RequireToolchain {
    toolchain: Option<Arc<Toolchain>>,
    hint: String,
}

impl RequireToolchain {
    /// `hint` is reported when `toolchain` is `None`.
    pub fn new(toolchain: Option<Arc<Toolchain>>, hint: impl Into<String>) -> Self {
        Self {
            toolchain,
            hint: hint.into(),
        }
    }
}

impl Task for RequireToolchain {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        let mut entries = blackboard.lock();
        match &self.toolchain {
            Some(toolchain) => {
                tracing::debug!("using tool at {}", toolchain.program().display());
                entries.set(keys::TOOLCHAIN_PROGRAM, toolchain.program().to_path_buf());
                Ok(TaskState::Success)
            }
            None => {
                entries.set(keys::ERROR, self.hint.clone());
                Ok(TaskState::Failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("javac");
        std::fs::write(&tool, b"").unwrap();

        assert_eq!(
            Toolchain::locate("javac", Some(&tool)).unwrap().program(),
            tool.as_path()
        );

        let missing = dir.path().join("missing");
        assert!(matches!(
            Toolchain::locate("javac", Some(&missing)),
            Err(ToolchainError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_tool_is_not_on_path() {
        assert!(matches!(
            Toolchain::locate("surely-not-an-installed-tool-3f9a", None),
            Err(ToolchainError::NotOnPath { .. })
        ));
    }

    #[test]
    fn require_toolchain_publishes_program() {
        let blackboard = Blackboard::new();
        let toolchain = Arc::new(Toolchain::at("/opt/jdk/bin/java"));
        let mut task = RequireToolchain::new(Some(toolchain), "");

        assert_eq!(task.update(&blackboard).unwrap(), TaskState::Success);
        assert_eq!(
            blackboard.get::<PathBuf>(keys::TOOLCHAIN_PROGRAM).unwrap(),
            PathBuf::from("/opt/jdk/bin/java")
        );
    }

    #[test]
    fn missing_toolchain_reports_hint() {
        let blackboard = Blackboard::new();
        let mut task = RequireToolchain::new(None, "set PREPARE_TOOL_PATH");

        assert_eq!(task.update(&blackboard).unwrap(), TaskState::Failure);
        assert_eq!(
            blackboard.get::<String>(keys::ERROR).unwrap(),
            "set PREPARE_TOOL_PATH"
        );
    }
}
