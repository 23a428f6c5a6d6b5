//! Source root discovery from package declarations.
//!
//! A file `src/main/java/io/example/App.java` that declares
//! `package io.example;` lives under the root `src/main/java`. Files without a
//! declaration, or whose directories do not spell out their package, add no
//! root.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ScanError;

/// Returns the package declared by `source`, if any.
///
/// Only comments and blank lines may precede the declaration.
pub fn package_name(source: &str) -> Option<String> {
    let mut in_block_comment = false;

    for line in source.lines() {
        let mut rest = line.trim();

        loop {
            if in_block_comment {
                match rest.find("*/") {
                    Some(end) => {
                        rest = rest[end + 2..].trim_start();
                        in_block_comment = false;
                    }
                    None => break,
                }
            } else if let Some(after) = rest.strip_prefix("/*") {
                rest = after;
                in_block_comment = true;
            } else {
                break;
            }
        }

        if in_block_comment || rest.is_empty() || rest.starts_with("//") {
            continue;
        }

        let declaration = rest.strip_prefix("package")?;
        if !declaration.starts_with(char::is_whitespace) {
            return None;
        }
        let (name, _) = declaration.split_once(';')?;
        let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        let valid = !name.is_empty()
            && name.split('.').all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        return valid.then_some(name);
    }

    None
}

/// Walks up from `file` past one directory per package segment.
///
/// Returns `None` when a directory name does not match its segment.
pub fn package_root(file: &Path, package: &str) -> Option<PathBuf> {
    let mut root = file.parent()?;
    for segment in package.rsplit('.') {
        if root.file_name()? != segment {
            return None;
        }
        root = root.parent()?;
    }
    Some(root.to_path_buf())
}

/// Derives the distinct source roots of `files`, sorted.
///
/// Unreadable files are skipped. Stops with [`ScanError::Aborted`] as soon as
/// `abort` is set.
pub fn root_directories(
    files: &[PathBuf],
    abort: &AtomicBool,
) -> std::result::Result<Vec<PathBuf>, ScanError> {
    let mut roots = BTreeSet::new();

    for file in files {
        if abort.load(Ordering::Relaxed) {
            return Err(ScanError::Aborted);
        }

        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("skipping unreadable source {}: {}", file.display(), err);
                continue;
            }
        };

        let Some(package) = package_name(&String::from_utf8_lossy(&bytes)) else {
            continue;
        };
        match package_root(file, &package) {
            Some(root) => {
                roots.insert(root);
            }
            None => tracing::debug!(
                "{} declares package {} outside a matching directory",
                file.display(),
                package
            ),
        }
    }

    Ok(roots.into_iter().collect())
}
