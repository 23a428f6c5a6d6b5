//! `prepare` binary entry point.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use prepare::{PrepareConfig, Preparer, Project, Toolchain, logging};

/// Prepare a project for indexing and print the resulting indexer commands.
#[derive(Debug, Parser)]
#[command(name = "prepare", version, about)]
struct Args {
    /// Root directory of the project sources
    root: PathBuf,

    /// Directory holding exported dependency archives
    #[arg(long)]
    dependencies: Option<PathBuf>,

    /// Extra classpath entry (repeatable)
    #[arg(long = "classpath", value_name = "PATH")]
    classpath: Vec<PathBuf>,

    /// Path to leave out of the scan (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    exclude: Vec<PathBuf>,

    /// Print the commands as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = PrepareConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Preparing {}", args.root.display());
    tracing::debug!("Configuration: {:?}", config);

    let toolchain = match Toolchain::locate(&config.tool_name, config.tool_path.as_deref()) {
        Ok(toolchain) => {
            tracing::info!("Toolchain: {}", toolchain.program().display());
            Some(Arc::new(toolchain))
        }
        Err(e) => {
            tracing::warn!("Toolchain not available: {}", e);
            None
        }
    };

    let project = Project {
        root: args.root,
        dependency_dir: args.dependencies,
        classpath: args.classpath,
        excluded: args.exclude,
    };

    let preparation = Preparer::new(&project, toolchain, &config)
        .run()
        .context("project preparation failed")?;

    tracing::info!(
        "Prepared {} indexer commands in {} ticks",
        preparation.commands.len(),
        preparation.ticks
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preparation.commands)?);
    } else {
        for command in &preparation.commands {
            println!("{}", command.source_file.display());
        }
    }

    Ok(())
}
