//! # Diff Module
//!
//! This module renders the difference between a file's current content and
//! the content conhead would write, for `--show-diff` and `--save-diff`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Number of unchanged lines shown around each change.
const CONTEXT_LINES: usize = 3;

/// Manages diff creation and rendering for header changes.
///
/// This struct handles:
/// - Generating unified diffs between original and modified content
/// - Displaying diffs to stderr with colorization
/// - Appending diffs to a file
#[derive(Debug, Clone, Default)]
pub struct DiffManager {
  /// Whether to show diffs on stderr
  pub show_diff: bool,

  /// Path to append diffs to
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  /// Creates a new DiffManager with the specified configuration.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to show diffs on stderr
  /// * `save_diff_path` - Path to append diffs to
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether any diff output was requested.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Renders a unified diff for one file.
  ///
  /// Returns an empty string when the contents are equal.
  pub fn render(path: &Path, original: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(original, new);
    let name = path.display().to_string();
    let mut rendered = diff
      .unified_diff()
      .context_radius(CONTEXT_LINES)
      .header(&format!("a/{name}"), &format!("b/{name}"))
      .to_string();

    if !rendered.is_empty() && !rendered.ends_with('\n') {
      rendered.push('\n');
    }
    rendered
  }

  /// Displays and/or saves the diff between the original and new content.
  ///
  /// Diffs from different files are appended to the same save file, creating
  /// a single consolidated patch.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file being processed
  /// * `original` - Original file content
  /// * `new` - Content with the header inserted, updated or removed
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    if self.show_diff {
      print_colored(original, new, path);
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let rendered = Self::render(path, original, new);
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file {}", diff_path.display()))?;
      file
        .write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write diff file {}", diff_path.display()))?;
    }

    Ok(())
  }
}

fn print_colored(original: &str, new: &str, path: &Path) {
  let diff = TextDiff::from_lines(original, new);
  let mut out = String::new();
  out.push_str(&format!("--- a/{}\n+++ b/{}\n", path.display(), path.display()));

  for group in diff.grouped_ops(CONTEXT_LINES) {
    for op in group {
      for change in diff.iter_changes(&op) {
        let line = change.to_string_lossy();
        let line = line.trim_end_matches('\n');
        match change.tag() {
          ChangeTag::Delete => {
            out.push_str(&format!("{}\n", format!("-{line}").if_supports_color(Stream::Stderr, |l| l.red())));
          }
          ChangeTag::Insert => {
            out.push_str(&format!("{}\n", format!("+{line}").if_supports_color(Stream::Stderr, |l| l.green())));
          }
          ChangeTag::Equal => out.push_str(&format!(" {line}\n")),
        }
      }
    }
  }

  eprint!("{out}");
}
