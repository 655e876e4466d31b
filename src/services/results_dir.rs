//! Locating the results directory of the most recent run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Marker file written by the test runner naming the active run folder.
pub const CURRENT_RUN_MARKER: &str = ".current-run";

/// Prefix of timestamped run folders.
pub const RUN_DIR_PREFIX: &str = "run-";

/// Resolve the directory holding the latest run's results.
///
/// Checks, in order:
/// 1. `.current-run` naming an existing sub-directory
/// 2. The latest `run-*` folder by name (names embed a timestamp)
/// 3. `base` itself (legacy flat layout, or nothing there yet)
pub fn find_latest_run(base: &Path) -> PathBuf {
    if !base.is_dir() {
        return base.to_path_buf();
    }

    let marker = base.join(CURRENT_RUN_MARKER);
    if let Ok(contents) = fs::read_to_string(&marker) {
        let run_id = contents.trim();
        if !run_id.is_empty() {
            let run_dir = base.join(run_id);
            if run_dir.is_dir() {
                debug!("Using run from {}: {}", CURRENT_RUN_MARKER, run_dir.display());
                return run_dir;
            }
        }
    }

    let latest = fs::read_dir(base)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(RUN_DIR_PREFIX))
        })
        .map(|entry| entry.path())
        .max();

    match latest {
        Some(run_dir) => {
            debug!("Using latest run folder: {}", run_dir.display());
            run_dir
        }
        None => base.to_path_buf(),
    }
}

/// Results directory from a CLI argument, else the latest run under `default_base`.
///
/// An explicit directory may itself hold `run-*` folders.
pub fn resolve(explicit: Option<PathBuf>, default_base: &Path) -> PathBuf {
    match explicit {
        Some(path) if path.is_dir() => find_latest_run(&path),
        Some(path) => path,
        None => find_latest_run(default_base),
    }
}

/// Files in `dir` matching a file-name glob such as `*-result.json`, sorted.
pub fn find_files(dir: &Path, file_pattern: &str) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        file_pattern
    );

    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Invalid file pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    files.sort();
    files
}
