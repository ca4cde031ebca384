//! # File Collector Module
//!
//! This module turns the user's `SRC` arguments into a de-duplicated list of
//! files to process.
//!
//! - An existing file is taken as is and marked as explicitly named
//! - An existing directory is walked recursively, skipping hidden directories
//!   such as `.git`
//! - Anything else containing glob metacharacters is expanded as a glob
//! - Anything else is kept as an explicitly named (missing) file so that
//!   processing can report it

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
  /// Absolute path of the file
  pub path: PathBuf,
  /// Whether the file was named directly rather than found by traversal
  pub explicit: bool,
}

/// File collector for pattern matching and directory traversal.
#[derive(Debug, Clone)]
pub struct FileCollector {
  /// Directory relative patterns are resolved against
  current_dir: PathBuf,
}

impl FileCollector {
  /// Creates a new FileCollector resolving relative patterns against
  /// `current_dir`.
  pub const fn new(current_dir: PathBuf) -> Self {
    Self { current_dir }
  }

  /// Collects files for the given patterns.
  ///
  /// The result is sorted by path and free of duplicates. A file reached both
  /// explicitly and by traversal counts as explicit.
  ///
  /// # Errors
  ///
  /// Returns an error if a glob pattern is invalid.
  pub fn collect(&self, patterns: &[String]) -> Result<Vec<CollectedFile>> {
    let mut files: BTreeMap<PathBuf, bool> = BTreeMap::new();
    let mut add = |path: PathBuf, explicit: bool| {
      let entry = files.entry(normalize(&path)).or_insert(explicit);
      *entry |= explicit;
    };

    for pattern in patterns {
      let path = self.resolve(Path::new(pattern));

      if path.is_file() {
        add(path, true);
      } else if path.is_dir() {
        for file in traverse_directory(&path) {
          add(file, false);
        }
      } else if is_glob(pattern) {
        let glob_source = path.to_string_lossy().to_string();
        let entries = glob::glob(&glob_source).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

        for entry in entries {
          match entry {
            Ok(matched) if matched.is_file() => add(matched, false),
            Ok(matched) if matched.is_dir() => {
              for file in traverse_directory(&matched) {
                add(file, false);
              }
            }
            Ok(_) => {}
            Err(e) => warn!("Error with glob pattern {}: {}", pattern, e),
          }
        }
      } else {
        add(path, true);
      }
    }

    Ok(
      files
        .into_iter()
        .map(|(path, explicit)| CollectedFile { path, explicit })
        .collect(),
    )
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.current_dir.join(path)
    }
  }
}

/// Traverses a directory recursively and collects all regular files.
///
/// Hidden directories below `dir` are not entered. Unreadable entries are
/// logged and skipped.
pub fn traverse_directory(dir: &Path) -> Vec<PathBuf> {
  debug!("Scanning directory: {}", dir.display());
  let start_time = std::time::Instant::now();

  let files: Vec<PathBuf> = WalkDir::new(dir)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!("Error reading directory entry: {}", e);
        None
      }
    })
    .filter(|e| e.file_type().is_file())
    .map(DirEntry::into_path)
    .collect();

  debug!("Found {} files in {}ms", files.len(), start_time.elapsed().as_millis());

  files
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
  entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_glob(pattern: &str) -> bool {
  pattern.contains(['*', '?', '['])
}

/// Removes `.` components so the same file is not collected twice.
fn normalize(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|component| !matches!(component, std::path::Component::CurDir))
    .collect()
}
