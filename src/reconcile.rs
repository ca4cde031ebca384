//! # Reconcile Module
//!
//! Decides what has to happen to one file's content so that it carries an
//! up-to-date header. The decision is returned as a [`ReconcileResult`];
//! nothing here touches the file system, so the caller is free to apply,
//! display or discard the result.

use std::fmt;
use std::ops::Range;

use crate::fields::FieldContext;
use crate::header::Header;

/// What the caller wants done with headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  /// Insert missing headers and bring existing ones up to date
  #[default]
  Maintain,
  /// Remove existing headers
  Delete,
}

/// The edit recommended for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileResult {
  /// Content already has the expected header (or, in delete mode, has none)
  Unchanged,
  /// Content has no header; the text goes at the start of the file
  Inserted(String),
  /// The header at `span` is stale and should be replaced by `text`
  Updated { span: Range<usize>, text: String },
  /// The header at the span should be removed
  Deleted(Range<usize>),
}

/// Condition reported to the user for a reconciled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
  /// The content does not start with the header
  NoHeaderPresent,
  /// The header is present but a field needs a new value
  HeaderUpdated,
  /// Nothing to do
  HeaderUnchanged,
  /// The header is present and is being deleted
  HeaderRemoved,
}

impl fmt::Display for HeaderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Self::NoHeaderPresent => "missing header",
      Self::HeaderUpdated => "out of date",
      Self::HeaderUnchanged => "up to date",
      Self::HeaderRemoved => "header present",
    };
    f.write_str(text)
  }
}

impl ReconcileResult {
  /// Whether applying this result would leave the content as it is.
  pub const fn is_unchanged(&self) -> bool {
    matches!(self, Self::Unchanged)
  }

  /// The status to report for this result.
  pub const fn status(&self) -> HeaderStatus {
    match self {
      Self::Unchanged => HeaderStatus::HeaderUnchanged,
      Self::Inserted(_) => HeaderStatus::NoHeaderPresent,
      Self::Updated { .. } => HeaderStatus::HeaderUpdated,
      Self::Deleted(_) => HeaderStatus::HeaderRemoved,
    }
  }

  /// Applies the edit to `content`, which must be the content this result was
  /// computed from.
  pub fn apply(&self, content: &str) -> String {
    match self {
      Self::Unchanged => content.to_string(),
      Self::Inserted(text) => {
        let mut updated = String::with_capacity(text.len() + content.len());
        updated.push_str(text);
        updated.push_str(content);
        updated
      }
      Self::Updated { span, text } => {
        let mut updated = String::with_capacity(content.len() + text.len());
        updated.push_str(&content[..span.start]);
        updated.push_str(text);
        updated.push_str(&content[span.end..]);
        updated
      }
      Self::Deleted(span) => {
        let mut updated = String::with_capacity(content.len());
        updated.push_str(&content[..span.start]);
        updated.push_str(&content[span.end..]);
        updated
      }
    }
  }
}

/// Reconciles `content` against `header`.
///
/// Without an existing header every field takes its default value and the
/// rendered text is returned as [`ReconcileResult::Inserted`]. With one, each
/// field slot is merged with the value it previously held. Delete mode removes
/// a matched header and leaves headerless content alone.
///
/// Header text is written with `\r\n` line breaks when the content's first
/// line ends in `\r\n`.
pub fn reconcile(header: &Header, content: &str, context: &FieldContext, mode: Mode) -> ReconcileResult {
  let found = header.find(content);
  let crlf = starts_with_crlf_line(content);

  match (mode, found) {
    (Mode::Delete, Some(found)) => ReconcileResult::Deleted(found.span),
    (Mode::Delete, None) => ReconcileResult::Unchanged,
    (Mode::Maintain, None) => ReconcileResult::Inserted(with_line_endings(header.render_default(context), crlf)),
    (Mode::Maintain, Some(found)) => {
      let text = header.render_with(|slot, field| {
        let prior = found.captures.get(slot).map_or("", |capture| capture.value.as_str());
        field.kind.merge(prior, context)
      });
      let text = with_line_endings(text, crlf);

      if text == found.text(content) {
        ReconcileResult::Unchanged
      } else {
        ReconcileResult::Updated { span: found.span, text }
      }
    }
  }
}

fn starts_with_crlf_line(content: &str) -> bool {
  content
    .find('\n')
    .is_some_and(|end| content[..end].ends_with('\r'))
}

fn with_line_endings(text: String, crlf: bool) -> String {
  if crlf {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
  } else {
    text
  }
}
