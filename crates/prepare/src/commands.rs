//! Indexer command construction.

use std::path::PathBuf;

use serde::Serialize;

use task_tree::{Blackboard, Result, Task, TaskState};

use crate::keys;
use crate::scan::ScanJob;

/// Everything an indexer needs to process one source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexerCommand {
    pub source_file: PathBuf,
    pub indexed_paths: Vec<PathBuf>,
    pub excluded_paths: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
}

/// Turns scan results into one [`IndexerCommand`] per source file.
///
/// The classpath is made of the configured entries that exist, every archive
/// found by the dependency scan (if one ran), and the package roots derived
/// by the source scan. Paths that do not exist are left out of the classpath
/// and the indexed and excluded paths.
pub struct BuildCommands {
    sources: ScanJob,
    dependencies: Option<ScanJob>,
    classpath: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
}

impl BuildCommands {
    pub fn new(
        sources: ScanJob,
        dependencies: Option<ScanJob>,
        classpath: Vec<PathBuf>,
        excluded: Vec<PathBuf>,
    ) -> Self {
        Self {
            sources,
            dependencies,
            classpath,
            excluded,
        }
    }
}

impl Task for BuildCommands {
    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        let mut entries = blackboard.lock();

        let mut classpath: Vec<PathBuf> = self
            .classpath
            .iter()
            .filter(|entry| entry.exists())
            .cloned()
            .collect();
        if let Some(dependencies) = &self.dependencies
            && let Some(archives) = entries.get_opt::<Vec<PathBuf>>(&dependencies.files_key())?
        {
            classpath.extend(archives);
        }

        if let Some(roots) = entries.get_opt::<Vec<PathBuf>>(&self.sources.roots_key())? {
            classpath.extend(roots.into_iter().filter(|root| root.exists()));
        }

        let root = self.sources.root();
        let indexed_paths = if root.exists() {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
        let excluded_paths: Vec<PathBuf> = self
            .excluded
            .iter()
            .filter(|path| path.exists())
            .cloned()
            .collect();

        let commands: Vec<IndexerCommand> = entries
            .get_ref::<Vec<PathBuf>>(&self.sources.files_key())?
            .iter()
            .map(|source_file| IndexerCommand {
                source_file: source_file.clone(),
                indexed_paths: indexed_paths.clone(),
                excluded_paths: excluded_paths.clone(),
                classpath: classpath.clone(),
            })
            .collect();

        tracing::info!("built {} indexer commands", commands.len());
        entries.set(keys::COMMANDS, commands);
        Ok(TaskState::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_command_per_source_with_shared_classpath() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        let target = dir.path().join("target");
        std::fs::create_dir_all(&target).unwrap();
        let java_root = dir.path().join("src/main/java");
        std::fs::create_dir_all(&java_root).unwrap();

        let sources = ScanJob::new(keys::SOURCES, dir.path());
        let dependencies = ScanJob::new(keys::DEPENDENCIES, dir.path().join("deps"));
        let blackboard = Blackboard::new();
        {
            let mut entries = blackboard.lock();
            entries.set(
                sources.files_key(),
                vec![dir.path().join("A.java"), dir.path().join("B.java")],
            );
            entries.set(
                dependencies.files_key(),
                vec![dir.path().join("deps/guava.jar")],
            );
            entries.set(
                sources.roots_key(),
                vec![java_root.clone(), dir.path().join("deleted")],
            );
        }

        let mut task = BuildCommands::new(
            sources,
            Some(dependencies),
            vec![lib.clone(), dir.path().join("missing")],
            vec![target.clone(), dir.path().join("never-created")],
        );
        assert_eq!(task.update(&blackboard).unwrap(), TaskState::Success);

        let commands: Vec<IndexerCommand> = blackboard.get(keys::COMMANDS).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].source_file, dir.path().join("A.java"));
        assert_eq!(
            commands[1].classpath,
            vec![lib, dir.path().join("deps/guava.jar"), java_root]
        );
        assert_eq!(commands[1].indexed_paths, vec![dir.path().to_path_buf()]);
        assert_eq!(commands[1].excluded_paths, vec![target]);
    }

    #[test]
    fn missing_scan_results_are_a_contract_violation() {
        let blackboard = Blackboard::new();
        let sources = ScanJob::new(keys::SOURCES, "/src");
        let mut task = BuildCommands::new(sources, None, vec![], vec![]);

        assert!(task.update(&blackboard).is_err());
    }
}
