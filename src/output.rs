//! # Output Module
//!
//! This module centralizes all user-facing output for conhead.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! Per-file diagnostics are logged through `tracing` on stderr while they
//! happen; this module prints the grouped results and the summary to stdout
//! after the run.
//!
//! - Lists are truncated unless `-v` is given
//! - With `-q` only the paths of files needing attention are printed, one per
//!   line, so stdout stays scriptable

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::reconcile::Mode;
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/header current
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing header/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Header updated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
  /// Header removed
  pub const REMOVED: &str = "-";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Checking N files..." or "Processing N files..." message.
pub fn print_start_message(file_count: usize, check_only: bool) {
  if !is_verbose() {
    return;
  }

  let verb = if check_only { "Checking" } else { "Processing" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Files grouped by outcome for output.
#[derive(Debug, Default)]
pub struct CategorizedReports<'a> {
  /// Files that were missing a header
  pub added: Vec<&'a FileReport>,
  /// Files whose header was out of date
  pub updated: Vec<&'a FileReport>,
  /// Files whose header was (or is to be) removed
  pub removed: Vec<&'a FileReport>,
  /// Files that could not be processed
  pub failed: Vec<&'a FileReport>,
  /// Files that needed nothing
  pub ok: Vec<&'a FileReport>,
  /// Files without a header definition
  pub skipped: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports. Each group is sorted by path.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self::default();

    for report in reports {
      let group = match report.action {
        FileAction::Added => &mut categorized.added,
        FileAction::Updated => &mut categorized.updated,
        FileAction::Removed => &mut categorized.removed,
        FileAction::Failed => &mut categorized.failed,
        FileAction::UpToDate => &mut categorized.ok,
        FileAction::Skipped => &mut categorized.skipped,
      };
      group.push(report);
    }

    for group in [
      &mut categorized.added,
      &mut categorized.updated,
      &mut categorized.removed,
      &mut categorized.failed,
      &mut categorized.ok,
      &mut categorized.skipped,
    ] {
      group.sort_by(|a, b| a.path.cmp(&b.path));
    }

    categorized
  }
}

/// Print grouped per-file results followed by the summary.
pub fn print_results(reports: &[FileReport], summary: &ProcessingSummary, mode: Mode, check_only: bool, root: &Path) {
  let categorized = CategorizedReports::from_reports(reports);

  if is_quiet() {
    // In quiet mode, just print the file paths (for scripting)
    for report in categorized
      .added
      .iter()
      .chain(&categorized.updated)
      .chain(&categorized.removed)
      .chain(&categorized.failed)
    {
      println!("{}", make_relative_path(&report.path, Some(root)));
    }
    return;
  }

  let (added, updated, removed) = if check_only {
    ("missing header", "with out of date header", "with a header to remove")
  } else {
    ("header added", "header updated", "header removed")
  };

  print_file_list(
    &symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    added,
    &categorized.added,
    root,
  );
  print_file_list(
    &symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
    updated,
    &categorized.updated,
    root,
  );
  print_file_list(
    &symbols::REMOVED.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
    removed,
    &categorized.removed,
    root,
  );
  print_file_list(
    &symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    "could not be processed",
    &categorized.failed,
    root,
  );

  if summary.total_files > 0 && summary.is_clean() {
    let message = match mode {
      Mode::Maintain => "All files have up to date headers.",
      Mode::Delete => "No headers to remove.",
    };
    println!("{} {}", symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()), message);
  }

  print_summary(summary);
}

fn print_file_list(symbol: &str, description: &str, files: &[&FileReport], root: &Path) {
  if files.is_empty() {
    return;
  }

  let count = files.len();
  println!("{} {} {} {}:", symbol, count, plural(count), description);

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    let display_path = make_relative_path(&file.path, Some(root));
    match &file.error {
      Some(error) => println!("  {} ({})", display_path, error),
      None => println!("  {}", display_path),
    }
  }

  if count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

/// Print the processing summary.
///
/// Format: "Summary: X OK, Y added, Z updated, W removed, F failed, S skipped"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let attention = |count: usize| {
    if count > 0 {
      count.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
    } else {
      count.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
    }
  };

  let mut summary_line = format!(
    "Summary: {} OK, {} missing, {} outdated, {} removable, {} failed, {} skipped",
    summary.up_to_date.if_supports_color(Stream::Stdout, |s| s.cyan()),
    attention(summary.added),
    attention(summary.updated),
    attention(summary.removed),
    attention(summary.failed),
    summary.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed()),
  );

  if summary.written > 0 {
    summary_line.push_str(&format!("; {} rewritten", summary.written));
  }

  // Show timing in verbose mode
  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{}", summary_line);
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to `root` for display.
///
/// Paths outside `root` are shown with `..` components; paths that cannot be
/// related to it are shown unchanged.
pub fn make_relative_path(path: &Path, root: Option<&Path>) -> String {
  match root {
    Some(root) if path.is_absolute() == root.is_absolute() => pathdiff::diff_paths(path, root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|| path.to_string_lossy().to_string()),
    _ => path.to_string_lossy().to_string(),
  }
}
