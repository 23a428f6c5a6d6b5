use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use prepare::keys::stage;
use prepare::{PrepareConfig, PrepareError, Preparer, Project, Toolchain};
use task_tree::RunnerConfig;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn config() -> PrepareConfig {
    PrepareConfig {
        runner: RunnerConfig::default()
            .with_tick_interval(Duration::from_millis(1))
            .with_max_ticks(100_000),
        ..PrepareConfig::default()
    }
}

fn fake_tool(dir: &Path) -> Option<Arc<Toolchain>> {
    let program = dir.join("java");
    fs::write(&program, b"#!/bin/sh\n").unwrap();
    Some(Arc::new(Toolchain::at(program)))
}

fn write(path: PathBuf) {
    write_text(path, "");
}

fn write_text(path: PathBuf, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn java_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_text(dir.path().join("src/io/example/App.java"), "package io.example;\n");
    write_text(dir.path().join("src/io/example/Model.java"), "package io.example;\n");
    write(dir.path().join("src/README.md"));
    write(dir.path().join("build/Stale.java"));
    dir
}

#[test]
fn prepares_one_command_per_source_file() {
    init_tracing();
    let project_dir = java_project();
    let tools = tempfile::tempdir().unwrap();
    let src = project_dir.path().join("src");

    let mut project = Project::new(&src);
    project.excluded = vec![
        src.join("io/example/Model.java"),
        src.join("not-there"),
    ];

    let preparation = Preparer::new(&project, fake_tool(tools.path()), &config())
        .run()
        .unwrap();

    let files: Vec<_> = preparation
        .commands
        .iter()
        .map(|command| command.source_file.clone())
        .collect();
    assert_eq!(files, vec![src.join("io/example/App.java")]);
    assert_eq!(preparation.commands[0].indexed_paths, vec![src.clone()]);
    assert_eq!(preparation.commands[0].classpath, vec![src.clone()]);
    assert_eq!(
        preparation.commands[0].excluded_paths,
        vec![src.join("io/example/Model.java")]
    );
    assert!(preparation.ticks > 0);
}

#[test]
fn dependency_archives_join_the_classpath() {
    init_tracing();
    let project_dir = java_project();
    let tools = tempfile::tempdir().unwrap();
    let deps = project_dir.path().join("deps");
    write(deps.join("guava.jar"));
    write(deps.join("nested/junit.jar"));
    write(deps.join("LICENSE"));

    let mut project = Project::new(project_dir.path().join("src"));
    project.dependency_dir = Some(deps.clone());

    let preparation = Preparer::new(&project, fake_tool(tools.path()), &config())
        .run()
        .unwrap();

    assert_eq!(preparation.commands.len(), 2);
    assert_eq!(
        preparation.commands[0].classpath,
        vec![
            deps.join("guava.jar"),
            deps.join("nested/junit.jar"),
            project_dir.path().join("src"),
        ]
    );
}

#[test]
fn missing_dependency_directory_is_not_fatal() {
    let project_dir = java_project();
    let tools = tempfile::tempdir().unwrap();

    let mut project = Project::new(project_dir.path().join("src"));
    project.dependency_dir = Some(project_dir.path().join("no-such-dir"));

    let preparation = Preparer::new(&project, fake_tool(tools.path()), &config())
        .run()
        .unwrap();

    assert_eq!(preparation.commands.len(), 2);
    assert_eq!(
        preparation.commands[0].classpath,
        vec![project_dir.path().join("src")]
    );
}

#[test]
fn package_roots_join_the_classpath() {
    let project_dir = tempfile::tempdir().unwrap();
    let root = project_dir.path();
    write_text(
        root.join("src/main/java/io/example/App.java"),
        "// App\npackage io.example;\n\npublic class App {}\n",
    );
    write_text(
        root.join("src/test/java/io/example/AppTest.java"),
        "package io.example;\n",
    );
    write_text(root.join("src/main/java/io/Misplaced.java"), "package io.example;\n");
    write(root.join("src/main/java/Default.java"));
    let tools = tempfile::tempdir().unwrap();

    let preparation = Preparer::new(&Project::new(root), fake_tool(tools.path()), &config())
        .run()
        .unwrap();

    assert_eq!(preparation.commands.len(), 4);
    assert_eq!(
        preparation.commands[0].classpath,
        vec![root.join("src/main/java"), root.join("src/test/java")]
    );
    assert_eq!(preparation.commands[0].indexed_paths, vec![root.to_path_buf()]);
}

#[test]
fn failed_optional_scan_does_not_mask_source_failure() {
    let project_dir = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let mut project = Project::new(project_dir.path().join("missing-src"));
    project.dependency_dir = Some(project_dir.path().join("missing-deps"));

    for _ in 0..5 {
        let err = Preparer::new(&project, fake_tool(tools.path()), &config())
            .run()
            .unwrap_err();

        match err {
            PrepareError::Failed { stage: failed, reason } => {
                assert_eq!(failed, stage::SCAN);
                assert!(reason.contains("missing-src"), "{reason}");
                assert!(!reason.contains("missing-deps"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn missing_toolchain_fails_first_stage() {
    let project_dir = java_project();
    let project = Project::new(project_dir.path().join("src"));

    let err = Preparer::new(&project, None, &config()).run().unwrap_err();

    match err {
        PrepareError::Failed { stage: failed, reason } => {
            assert_eq!(failed, stage::LOCATE_TOOLCHAIN);
            assert!(reason.contains("PREPARE_TOOL_PATH"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn project_without_sources_fails_to_build_commands() {
    let project_dir = tempfile::tempdir().unwrap();
    write(project_dir.path().join("src/notes.txt"));
    let tools = tempfile::tempdir().unwrap();
    let project = Project::new(project_dir.path().join("src"));

    let err = Preparer::new(&project, fake_tool(tools.path()), &config())
        .run()
        .unwrap_err();

    match err {
        PrepareError::Failed { stage: failed, reason } => {
            assert_eq!(failed, stage::BUILD_COMMANDS);
            assert!(reason.starts_with("no source files"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn expired_scan_timeout_fails_scan_stage() {
    let project_dir = java_project();
    let tools = tempfile::tempdir().unwrap();
    let project = Project::new(project_dir.path().join("src"));
    let config = PrepareConfig {
        scan_timeout: Duration::ZERO,
        ..config()
    };

    let err = Preparer::new(&project, fake_tool(tools.path()), &config)
        .run()
        .unwrap_err();

    match err {
        PrepareError::Failed { stage: failed, reason } => {
            assert_eq!(failed, stage::SCAN);
            assert_eq!(reason, "scan did not finish in time");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cancel_before_run_reports_cancelled() {
    let project_dir = java_project();
    let tools = tempfile::tempdir().unwrap();
    let project = Project::new(project_dir.path().join("src"));

    let preparer = Preparer::new(&project, fake_tool(tools.path()), &config());
    preparer.cancel_token().cancel();

    assert!(matches!(preparer.run(), Err(PrepareError::Cancelled)));
}
