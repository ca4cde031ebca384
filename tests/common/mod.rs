#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use assert_cmd::prelude::*;

/// A `.conhead.toml` with a Python header carrying a year range and a
/// Rust header with a literal owner field.
pub const BASIC_CONFIG: &str = r#"
[header.py]
template = """
    # Copyright {{YEARS}} Acme Corp
    # SPDX-License-Identifier: Apache-2.0
"""

[header.rust]
extensions = ["rs"]
template = """
    // Copyright {{YEARS}} {{OWNER}}
"""

[header.rust.fields]
OWNER = "Example Ltd"
"#;

/// Writes `content` to `rel` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, content: &str) -> Result<PathBuf> {
  let path = dir.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Reads `rel` under `dir`.
pub fn read_file(dir: &Path, rel: &str) -> Result<String> {
  let path = dir.join(rel);
  fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Writes a `.conhead.toml` into `dir`.
pub fn write_config(dir: &Path, content: &str) -> Result<PathBuf> {
  write_file(dir, ".conhead.toml", content)
}

/// Builds a conhead command running in `dir` with a fixed date, no colors and
/// no influence from the caller's environment.
pub fn conhead(dir: &Path, date: &str) -> Result<Command> {
  let mut cmd = Command::cargo_bin("conhead")?;
  cmd
    .current_dir(dir)
    .env_remove("CONHEAD_CONFIG")
    .env_remove("RUST_LOG")
    .arg("--colors=never")
    .arg("--date")
    .arg(date);
  Ok(cmd)
}
