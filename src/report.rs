//! # Report Module
//!
//! Records what happened to every file of a run and aggregates the records
//! into a [`ProcessingSummary`] used for terminal output and the exit status.

use std::path::PathBuf;
use std::time::Duration;

use crate::reconcile::ReconcileResult;

/// Information about a processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
  /// Path to the file
  pub path: PathBuf,
  /// Outcome for the file
  pub action: FileAction,
  /// Whether new content was written back to the file
  pub written: bool,
  /// Error description for failed files
  pub error: Option<String>,
}

impl FileReport {
  /// Creates a report for a file that was reconciled.
  pub fn new(path: PathBuf, action: FileAction, written: bool) -> Self {
    Self {
      path,
      action,
      written,
      error: None,
    }
  }

  /// Creates a report for a file that could not be processed.
  pub fn failed(path: PathBuf, error: impl Into<String>) -> Self {
    Self {
      path,
      action: FileAction::Failed,
      written: false,
      error: Some(error.into()),
    }
  }

  /// Creates a report for a file without a header definition.
  pub const fn skipped(path: PathBuf) -> Self {
    Self {
      path,
      action: FileAction::Skipped,
      written: false,
      error: None,
    }
  }
}

/// Possible outcomes for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
  /// Header already current, or absent in delete mode
  UpToDate,
  /// Header was missing (and was added unless checking)
  Added,
  /// Header was out of date (and was updated unless checking)
  Updated,
  /// Header was present in delete mode (and was removed unless checking)
  Removed,
  /// No header definition applies to the file
  Skipped,
  /// The file could not be read or written
  Failed,
}

impl From<&ReconcileResult> for FileAction {
  fn from(result: &ReconcileResult) -> Self {
    match result {
      ReconcileResult::Unchanged => FileAction::UpToDate,
      ReconcileResult::Inserted(_) => FileAction::Added,
      ReconcileResult::Updated { .. } => FileAction::Updated,
      ReconcileResult::Deleted(_) => FileAction::Removed,
    }
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingSummary {
  /// Total number of files looked at
  pub total_files: usize,
  /// Files that needed no change
  pub up_to_date: usize,
  /// Files missing a header
  pub added: usize,
  /// Files with a stale header
  pub updated: usize,
  /// Files whose header is to be removed
  pub removed: usize,
  /// Files without a header definition
  pub skipped: usize,
  /// Files that failed
  pub failed: usize,
  /// Files actually rewritten
  pub written: usize,
  /// Total processing time
  pub processing_time: Duration,
}

impl ProcessingSummary {
  /// Create a ProcessingSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      ..Self::default()
    };

    for file in files {
      match file.action {
        FileAction::UpToDate => summary.up_to_date += 1,
        FileAction::Added => summary.added += 1,
        FileAction::Updated => summary.updated += 1,
        FileAction::Removed => summary.removed += 1,
        FileAction::Skipped => summary.skipped += 1,
        FileAction::Failed => summary.failed += 1,
      }
      if file.written {
        summary.written += 1;
      }
    }

    summary
  }

  /// Number of files whose header did not match the expected state.
  pub const fn dirty(&self) -> usize {
    self.added + self.updated + self.removed
  }

  /// True when every file was already in the expected state and none failed.
  pub const fn is_clean(&self) -> bool {
    self.dirty() == 0 && self.failed == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report(path: &str, action: FileAction, written: bool) -> FileReport {
    FileReport::new(PathBuf::from(path), action, written)
  }

  #[test]
  fn test_action_from_result() {
    assert_eq!(FileAction::from(&ReconcileResult::Unchanged), FileAction::UpToDate);
    assert_eq!(
      FileAction::from(&ReconcileResult::Inserted("x".to_string())),
      FileAction::Added
    );
    assert_eq!(
      FileAction::from(&ReconcileResult::Updated {
        span: 0..1,
        text: "x".to_string()
      }),
      FileAction::Updated
    );
    assert_eq!(FileAction::from(&ReconcileResult::Deleted(0..1)), FileAction::Removed);
  }

  #[test]
  fn test_summary_counts() {
    let reports = vec![
      report("a.py", FileAction::UpToDate, false),
      report("b.py", FileAction::Added, true),
      report("c.py", FileAction::Updated, true),
      report("d.md", FileAction::Skipped, false),
      FileReport::failed(PathBuf::from("e.py"), "unreadable"),
    ];

    let summary = ProcessingSummary::from_reports(&reports, Duration::from_millis(5));

    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.up_to_date, 1);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.dirty(), 2);
    assert!(!summary.is_clean());
  }

  #[test]
  fn test_summary_clean() {
    let reports = vec![
      report("a.py", FileAction::UpToDate, false),
      report("b.md", FileAction::Skipped, false),
    ];
    assert!(ProcessingSummary::from_reports(&reports, Duration::ZERO).is_clean());
    assert!(ProcessingSummary::from_reports(&[], Duration::ZERO).is_clean());
  }

  #[test]
  fn test_failure_is_not_clean() {
    let reports = vec![FileReport::failed(PathBuf::from("a.py"), "file not found")];
    let summary = ProcessingSummary::from_reports(&reports, Duration::ZERO);
    assert_eq!(summary.dirty(), 0);
    assert!(!summary.is_clean());
  }
}
