//! # Processor Module
//!
//! This module drives a conhead run over a set of files: it collects them,
//! reconciles each one against the header definition for its extension, logs
//! the outcome and, unless checking, writes the updated content back.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - Asynchronous file reading and writing
//! - [`file_collector`] - Pattern resolution and directory traversal
//!
//! Files are processed concurrently. Nothing is shared between file tasks
//! except the read-only [`HeaderCatalog`], [`FieldContext`] and
//! [`DiffManager`].

mod file_collector;
mod file_io;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
pub use file_collector::{CollectedFile, FileCollector, traverse_directory};
pub use file_io::FileIO;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, trace, warn};

use crate::catalog::HeaderCatalog;
use crate::diff::DiffManager;
use crate::fields::FieldContext;
use crate::output::make_relative_path;
use crate::reconcile::{HeaderStatus, Mode, reconcile};
use crate::report::{FileAction, FileReport};

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub catalog: Arc<HeaderCatalog>,
  pub context: FieldContext,
  /// Directory relative patterns are resolved against and paths are shown
  /// relative to
  pub root: PathBuf,

  // Behavior flags
  pub mode: Mode,
  pub check_only: bool,

  // Optional components
  pub diff_manager: DiffManager,
  /// Maximum number of files in flight; defaults to the number of CPUs
  pub concurrency: usize,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     check_only: true,
  ///     ..ProcessorConfig::new(catalog, context, root)
  /// }
  /// ```
  pub fn new(catalog: Arc<HeaderCatalog>, context: FieldContext, root: PathBuf) -> Self {
    Self {
      catalog,
      context,
      root,
      mode: Mode::Maintain,
      check_only: false,
      diff_manager: DiffManager::default(),
      concurrency: num_cpus::get(),
    }
  }
}

/// Processor for maintaining headers in files.
///
/// The `Processor` is responsible for:
/// - Resolving files, directories and globs into a file list
/// - Selecting the header definition for each file
/// - Inserting, updating or deleting headers
/// - Showing diffs of the changes
/// - Collecting a report for every file
pub struct Processor {
  catalog: Arc<HeaderCatalog>,
  context: FieldContext,
  root: PathBuf,
  mode: Mode,
  check_only: bool,
  diff_manager: DiffManager,
  concurrency: usize,
  file_collector: FileCollector,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  pub fn new(config: ProcessorConfig) -> Self {
    let file_collector = FileCollector::new(config.root.clone());

    Self {
      catalog: config.catalog,
      context: config.context,
      root: config.root,
      mode: config.mode,
      check_only: config.check_only,
      diff_manager: config.diff_manager,
      concurrency: config.concurrency.max(1),
      file_collector,
    }
  }

  /// Collects the files named by `patterns`.
  pub fn collect(&self, patterns: &[String]) -> Result<Vec<CollectedFile>> {
    self.file_collector.collect(patterns)
  }

  /// Processes every file named by `patterns`.
  ///
  /// Per-file failures are reported, never returned as errors.
  ///
  /// # Returns
  ///
  /// One report per collected file, sorted by path.
  ///
  /// # Errors
  ///
  /// Returns an error if a pattern is an invalid glob.
  pub async fn process(&self, patterns: &[String]) -> Result<Vec<FileReport>> {
    let files = self.collect(patterns)?;
    Ok(self.process_files(files).await)
  }

  /// Processes already collected files concurrently.
  pub async fn process_files(&self, files: Vec<CollectedFile>) -> Vec<FileReport> {
    debug!("Processing {} files with up to {} in flight", files.len(), self.concurrency);

    let mut reports: Vec<FileReport> = stream::iter(files)
      .map(|file| self.process_file(file))
      .buffer_unordered(self.concurrency)
      .collect()
      .await;

    reports.sort_by(|a, b| a.path.cmp(&b.path));
    reports
  }

  /// Processes a single file.
  pub async fn process_file(&self, file: CollectedFile) -> FileReport {
    let CollectedFile { path, explicit } = file;
    let shown = self.relative(&path);
    debug!("process: {}", shown);

    let header = self.catalog.for_path(&path);
    if header.is_none() && !explicit {
      trace!("skipping {}: no header definition", shown);
      return FileReport::skipped(path);
    }

    let content = match FileIO::read_content(&path).await {
      Ok(content) => content,
      Err(e) => {
        let reason = FileIO::describe_read_error(&e);
        error!("{}: {}", reason, shown);
        return FileReport::failed(path, reason);
      }
    };

    let Some(header) = header else {
      error!("no header def: {}", shown);
      return FileReport::failed(path, "no header def");
    };

    let result = reconcile(header, &content, &self.context, self.mode);
    let action = FileAction::from(&result);

    match (result.status(), self.mode) {
      (HeaderStatus::HeaderUnchanged, Mode::Delete) => info!("no header: {}", shown),
      (HeaderStatus::HeaderUnchanged, Mode::Maintain) => info!("up to date: {}", shown),
      (status, _) => warn!("{}: {}", status, shown),
    }

    if result.is_unchanged() {
      return FileReport::new(path, action, false);
    }

    let updated = result.apply(&content);

    if let Err(e) = self.diff_manager.display_diff(Path::new(&shown), &content, &updated) {
      warn!("Failed to record diff for {}: {:#}", shown, e);
    }

    if self.check_only {
      return FileReport::new(path, action, false);
    }

    info!("rewriting: {}", shown);
    match FileIO::write_content(&path, &updated).await {
      Ok(()) => FileReport::new(path, action, true),
      Err(e) => {
        let reason = FileIO::describe_write_error(&e);
        error!("{}: {}", reason, shown);
        FileReport::failed(path, reason)
      }
    }
  }

  fn relative(&self, path: &Path) -> String {
    make_relative_path(path, Some(&self.root))
  }
}
