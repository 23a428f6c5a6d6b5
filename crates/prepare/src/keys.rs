//! Blackboard keys shared by the preparation leaves.

/// Name of the step currently running, one of the [`stage`] labels.
pub const STAGE: &str = "prepare.stage";
/// Human-readable reason written by the leaf that failed.
pub const ERROR: &str = "prepare.error";
/// `PathBuf` of the located external tool.
pub const TOOLCHAIN_PROGRAM: &str = "toolchain.program";
/// `Vec<IndexerCommand>` produced by the last step.
pub const COMMANDS: &str = "indexer.commands";

/// Key prefix of the source scan.
pub const SOURCES: &str = "sources";
/// Key prefix of the dependency archive scan.
pub const DEPENDENCIES: &str = "dependencies";

pub mod stage {
    pub const LOCATE_TOOLCHAIN: &str = "locate-toolchain";
    pub const SCAN: &str = "scan";
    pub const BUILD_COMMANDS: &str = "build-commands";
    pub const DONE: &str = "done";
}
