//! Preparation configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use task_tree::RunnerConfig;

/// Configuration for a preparation run.
#[derive(Clone, Debug)]
pub struct PrepareConfig {
    /// Executable looked up on `PATH` when no explicit path is configured.
    pub tool_name: String,
    pub tool_path: Option<PathBuf>,
    pub scan_timeout: Duration,
    /// File extensions, without the dot, that count as sources.
    pub source_extensions: Vec<String>,
    pub log_dir: Option<PathBuf>,
    pub runner: RunnerConfig,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            tool_name: "java".to_string(),
            tool_path: None,
            scan_timeout: Duration::from_secs(30),
            source_extensions: vec!["java".to_string()],
            log_dir: None,
            runner: RunnerConfig::default().with_tick_interval(DEFAULT_TICK_INTERVAL),
        }
    }
}

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

impl PrepareConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PREPARE_TOOL_NAME` - Tool searched on PATH (default: java)
    /// - `PREPARE_TOOL_PATH` - Explicit tool location (default: search PATH)
    /// - `PREPARE_SCAN_TIMEOUT_MS` - Limit for the source scan (default: 30000)
    /// - `PREPARE_SOURCE_EXTENSIONS` - Comma-separated extensions (default: java)
    /// - `PREPARE_LOG_DIR` - Also write logs to `prepare.log` in this directory
    /// - `TASK_TREE_TICK_INTERVAL_MS` - Pause between ticks (default: 10)
    /// - `TASK_TREE_MAX_TICKS` - Tick budget per run (default: unbounded)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var("PREPARE_TOOL_NAME")
            && !name.trim().is_empty()
        {
            config.tool_name = name.trim().to_string();
        }

        config.tool_path = env::var("PREPARE_TOOL_PATH").ok().map(PathBuf::from);

        if let Some(millis) = read_env::<u64>("PREPARE_SCAN_TIMEOUT_MS") {
            config.scan_timeout = Duration::from_millis(millis);
        }

        if let Ok(extensions) = env::var("PREPARE_SOURCE_EXTENSIONS") {
            let extensions = parse_extensions(&extensions);
            if !extensions.is_empty() {
                config.source_extensions = extensions;
            }
        }

        config.log_dir = env::var("PREPARE_LOG_DIR").ok().map(PathBuf::from);

        // Keep the polling pause unless the runner variables say otherwise.
        let runner = RunnerConfig::from_env();
        if env::var_os("TASK_TREE_TICK_INTERVAL_MS").is_some() {
            config.runner.tick_interval = runner.tick_interval;
        }
        config.runner.max_ticks = runner.max_ticks;

        config
    }
}

/// `".java, kt,,"` -> `["java", "kt"]`
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
