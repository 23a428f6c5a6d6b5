//! The project preparation tree.
//!
//! ```text
//! sequence
//! ├── stage: locate-toolchain
//! ├── selector
//! │   ├── condition: toolchain already on the blackboard
//! │   └── RequireToolchain
//! ├── stage: scan
//! ├── timeout
//! │   └── parallel (all must succeed)
//! │       ├── ScanFiles (sources and their package roots)
//! │       └── always-succeed ── optional ScanFiles (dependency archives)
//! ├── stage: build-commands
//! ├── selector
//! │   ├── guard: at least one source file ── BuildCommands
//! │   └── report "no source files"
//! └── stage: done
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use task_tree::builder::{
    action, always_succeed, condition, guard, parallel, selector, sequence, set_value, timeout,
};
use task_tree::{Blackboard, CancelToken, Node, RunOutcome, TaskState, TreeRunner};

use crate::commands::{BuildCommands, IndexerCommand};
use crate::config::PrepareConfig;
use crate::error::{PrepareError, Result};
use crate::keys::{self, stage};
use crate::scan::{ScanFiles, ScanJob};
use crate::toolchain::{RequireToolchain, Toolchain};

/// The project being prepared for indexing.
#[derive(Clone, Debug, Default)]
pub struct Project {
    pub root: PathBuf,
    /// Directory of exported dependency archives.
    pub dependency_dir: Option<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub excluded: Vec<PathBuf>,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Result of a successful preparation.
#[derive(Clone, Debug)]
pub struct Preparation {
    pub commands: Vec<IndexerCommand>,
    pub ticks: u64,
}

/// Assembles the preparation tree for `project`.
pub fn build_pipeline(
    project: &Project,
    toolchain: Option<Arc<Toolchain>>,
    config: &PrepareConfig,
) -> Node {
    let sources = ScanJob::new(keys::SOURCES, &project.root)
        .with_extensions(config.source_extensions.clone())
        .excluding(project.excluded.clone())
        .with_package_roots();
    let dependencies = project.dependency_dir.as_ref().map(|dir| {
        ScanJob::new(keys::DEPENDENCIES, dir).with_extensions(vec!["jar".to_string()])
    });

    let mut scans = vec![Node::new(ScanFiles::new(sources.clone())).named("scan sources")];
    if let Some(job) = &dependencies {
        // Missing archives are not fatal; the classpath is just shorter.
        scans.push(always_succeed(
            Node::new(ScanFiles::optional(job.clone())).named("scan dependencies"),
        ));
    }
    let scan_count = scans.len();

    let hint = format!(
        "unable to locate `{}`; set PREPARE_TOOL_PATH to the tool's location",
        config.tool_name
    );
    let files_key = sources.files_key();
    let source_root = project.root.clone();

    sequence(vec![
        set_value(keys::STAGE, stage::LOCATE_TOOLCHAIN),
        selector(vec![
            condition(|entries| Ok(entries.has(keys::TOOLCHAIN_PROGRAM))),
            Node::new(RequireToolchain::new(toolchain, hint)),
        ]),
        set_value(keys::STAGE, stage::SCAN),
        timeout(parallel(scans, scan_count, 1), config.scan_timeout),
        set_value(keys::STAGE, stage::BUILD_COMMANDS),
        selector(vec![
            guard(
                move |entries| Ok(!entries.get_ref::<Vec<PathBuf>>(&files_key)?.is_empty()),
                Node::new(BuildCommands::new(
                    sources,
                    dependencies,
                    project.classpath.clone(),
                    project.excluded.clone(),
                )),
            ),
            action(move |blackboard: &Blackboard| {
                blackboard.set(
                    keys::ERROR,
                    format!("no source files found under {}", source_root.display()),
                );
                Ok(TaskState::Failure)
            }),
        ]),
        set_value(keys::STAGE, stage::DONE),
    ])
    .named("prepare project")
}

/// Runs the preparation tree for one project.
pub struct Preparer {
    runner: TreeRunner,
}

impl Preparer {
    pub fn new(
        project: &Project,
        toolchain: Option<Arc<Toolchain>>,
        config: &PrepareConfig,
    ) -> Self {
        let root = build_pipeline(project, toolchain, config);
        let runner = TreeRunner::new(root, Blackboard::new()).with_config(config.runner.clone());
        Self { runner }
    }

    /// Token that abandons the preparation from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.runner.cancel_token()
    }

    pub fn run(mut self) -> Result<Preparation> {
        let outcome = self.runner.run()?;
        let ticks = self.runner.ticks();
        let blackboard = self.runner.into_blackboard();

        match outcome {
            RunOutcome::Success => Ok(Preparation {
                commands: blackboard.get(keys::COMMANDS)?,
                ticks,
            }),
            RunOutcome::Failure => {
                let entries = blackboard.lock();
                let failed_stage = entries
                    .get_opt::<&'static str>(keys::STAGE)?
                    .unwrap_or(stage::LOCATE_TOOLCHAIN);
                let reason = match entries.get_opt::<String>(keys::ERROR)? {
                    Some(reason) => reason,
                    None if failed_stage == stage::SCAN => {
                        "scan did not finish in time".to_string()
                    }
                    None => "step reported failure".to_string(),
                };
                Err(PrepareError::Failed {
                    stage: failed_stage.to_string(),
                    reason,
                })
            }
            RunOutcome::Cancelled => Err(PrepareError::Cancelled),
        }
    }
}
