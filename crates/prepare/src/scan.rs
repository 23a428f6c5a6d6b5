//! Background file scans.
//!
//! [`ScanFiles`] starts a worker thread on its first update and then polls the
//! blackboard until the worker reports completion. The worker writes under the
//! scan's key prefix:
//!
//! - `<prefix>.progress` - `usize` files visited so far
//! - `<prefix>.files` - `Vec<PathBuf>` of matching files, sorted
//! - `<prefix>.roots` - `Vec<PathBuf>` of package roots, for jobs that ask
//! - `<prefix>.error` - `String` if the walk failed
//! - `<prefix>.done` - `true` once `files` or `error` is in place
//!
//! Results and the done flag are written under one lock, so a reader that sees
//! `done` also sees the results.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use walkdir::WalkDir;

use task_tree::{Blackboard, Result, Task, TaskError, TaskState};

use crate::error::ScanError;
use crate::keys;
use crate::roots::root_directories;

const PROGRESS_EVERY: usize = 64;

/// What to scan and where to report it.
#[derive(Clone, Debug)]
pub struct ScanJob {
    prefix: String,
    root: PathBuf,
    extensions: Vec<String>,
    excluded: Vec<PathBuf>,
    package_roots: bool,
}

impl ScanJob {
    pub fn new(prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            root: root.into(),
            extensions: Vec::new(),
            excluded: Vec::new(),
            package_roots: false,
        }
    }

    /// Only files with one of these extensions are collected; empty keeps all.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Directories and files under these paths are skipped.
    pub fn excluding(mut self, excluded: Vec<PathBuf>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Also derive source roots from the package declarations of the files.
    pub fn with_package_roots(mut self) -> Self {
        self.package_roots = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn progress_key(&self) -> String {
        format!("{}.progress", self.prefix)
    }

    pub fn files_key(&self) -> String {
        format!("{}.files", self.prefix)
    }

    pub fn roots_key(&self) -> String {
        format!("{}.roots", self.prefix)
    }

    pub fn error_key(&self) -> String {
        format!("{}.error", self.prefix)
    }

    pub fn done_key(&self) -> String {
        format!("{}.done", self.prefix)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|excluded| path.starts_with(excluded))
    }

    fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}

/// Walks `job.root`, returning the matching files in sorted order.
///
/// `progress` receives the number of files visited so far. The walk stops
/// with [`ScanError::Aborted`] as soon as `abort` is set. Only a failure to
/// read the root itself is an error; entries below it that cannot be read,
/// such as dangling links, are logged and skipped.
pub fn scan_tree(
    job: &ScanJob,
    abort: &AtomicBool,
    mut progress: impl FnMut(usize),
) -> std::result::Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let mut visited = 0usize;

    let walker = WalkDir::new(&job.root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !job.is_excluded(entry.path()));

    for entry in walker {
        if abort.load(Ordering::Relaxed) {
            return Err(ScanError::Aborted);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        visited += 1;
        if job.matches(entry.path()) {
            files.push(entry.into_path());
        }
        if visited % PROGRESS_EVERY == 0 {
            progress(visited);
        }
    }

    progress(visited);
    files.sort();
    Ok(files)
}

struct Worker {
    abort: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Leaf that runs a [`ScanJob`] on a background thread.
///
/// Reports `Running` until the worker is done, then `Success`, or `Failure`
/// with the reason under [`keys::ERROR`]. Exiting or resetting the leaf tells
/// an unfinished worker to stop and stops listening to it.
pub struct ScanFiles {
    job: ScanJob,
    worker: Option<Worker>,
    required: bool,
}

impl ScanFiles {
    pub fn new(job: ScanJob) -> Self {
        Self {
            job,
            worker: None,
            required: true,
        }
    }

    /// A scan whose failure is not the pipeline's failure.
    ///
    /// The reason stays under `<prefix>.error` and [`keys::ERROR`] is left
    /// alone.
    pub fn optional(job: ScanJob) -> Self {
        Self {
            required: false,
            ..Self::new(job)
        }
    }

    fn spawn(&self, blackboard: &Blackboard) -> std::io::Result<Worker> {
        let abort = Arc::new(AtomicBool::new(false));
        let job = self.job.clone();
        let board = blackboard.clone();
        let flag = Arc::clone(&abort);

        let handle = thread::Builder::new()
            .name(format!("scan-{}", self.job.prefix))
            .spawn(move || run_worker(job, board, flag))?;

        Ok(Worker { abort, handle })
    }

    fn release_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort.store(true, Ordering::SeqCst);
            if worker.handle.is_finished() {
                let _ = worker.handle.join();
            } else {
                tracing::debug!("detaching unfinished scan of {}", self.job.root.display());
            }
        }
    }
}

fn run_worker(job: ScanJob, blackboard: Blackboard, abort: Arc<AtomicBool>) {
    let progress_key = job.progress_key();
    let outcome = scan_tree(&job, &abort, |visited| {
        let mut entries = blackboard.lock();
        if !abort.load(Ordering::SeqCst) {
            entries.set(progress_key.as_str(), visited);
        }
    })
    .and_then(|files| {
        let roots = if job.package_roots {
            Some(root_directories(&files, &abort)?)
        } else {
            None
        };
        Ok((files, roots))
    });

    // Checked under the lock: once the leaf moved on, nothing more is written.
    let mut entries = blackboard.lock();
    if abort.load(Ordering::SeqCst) {
        return;
    }
    match outcome {
        Ok((files, roots)) => {
            tracing::debug!("scan of {} found {} files", job.root.display(), files.len());
            entries.set(job.files_key(), files);
            if let Some(roots) = roots {
                entries.set(job.roots_key(), roots);
            }
        }
        Err(err) => entries.set(job.error_key(), err.to_string()),
    }
    entries.set(job.done_key(), true);
}

impl Task for ScanFiles {
    fn enter(&mut self, blackboard: &Blackboard) {
        let mut entries = blackboard.lock();
        entries.remove(&self.job.files_key());
        entries.remove(&self.job.roots_key());
        entries.remove(&self.job.error_key());
        entries.remove(&self.job.done_key());
        entries.set(self.job.progress_key(), 0usize);
    }

    fn update(&mut self, blackboard: &Blackboard) -> Result<TaskState> {
        if self.worker.is_none() {
            match self.spawn(blackboard) {
                Ok(worker) => {
                    tracing::info!("scanning {}", self.job.root.display());
                    self.worker = Some(worker);
                    return Ok(TaskState::Running);
                }
                Err(err) => {
                    let reason = format!("failed to start scan: {err}");
                    if self.required {
                        blackboard.set(keys::ERROR, reason);
                    } else {
                        tracing::warn!("{}", reason);
                    }
                    return Ok(TaskState::Failure);
                }
            }
        }

        let mut entries = blackboard.lock();
        if !entries.get_opt::<bool>(&self.job.done_key())?.unwrap_or(false) {
            return Ok(TaskState::Running);
        }

        match entries.get_opt::<String>(&self.job.error_key())? {
            Some(reason) => {
                let reason = format!("scan of {} failed: {reason}", self.job.root.display());
                if self.required {
                    entries.set(keys::ERROR, reason);
                } else {
                    tracing::warn!("{}", reason);
                }
                Ok(TaskState::Failure)
            }
            None if entries.has(&self.job.files_key()) => Ok(TaskState::Success),
            None => Err(TaskError::Contract(format!(
                "scan of {} reported done without results",
                self.job.root.display()
            ))),
        }
    }

    fn exit(&mut self, _blackboard: &Blackboard) {
        self.release_worker();
    }

    fn reset(&mut self, _blackboard: &Blackboard) {
        self.release_worker();
    }
}
