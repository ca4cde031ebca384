//! # File I/O Module
//!
//! This module provides asynchronous file reading and writing for the
//! processor, plus the short descriptions used when an operation fails.

use std::io::{self, ErrorKind};
use std::path::Path;

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Read full file content as UTF-8 text.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to read
  pub async fn read_content(path: &Path) -> io::Result<String> {
    tokio::fs::read_to_string(path).await
  }

  /// Write file content, replacing what was there.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to write
  /// * `content` - Content to write to the file
  pub async fn write_content(path: &Path, content: &str) -> io::Result<()> {
    tokio::fs::write(path, content).await
  }

  /// Describes a read failure.
  pub fn describe_read_error(error: &io::Error) -> String {
    match error.kind() {
      ErrorKind::NotFound => "file not found".to_string(),
      ErrorKind::PermissionDenied => "unreadable".to_string(),
      ErrorKind::InvalidData => "not valid UTF-8 text".to_string(),
      _ => error.to_string(),
    }
  }

  /// Describes a write failure.
  pub fn describe_write_error(error: &io::Error) -> String {
    match error.kind() {
      ErrorKind::PermissionDenied => "unwritable".to_string(),
      _ => error.to_string(),
    }
  }
}
