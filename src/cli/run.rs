//! # Run Command
//!
//! This module implements the conhead command: load configuration, build the
//! header catalog, process the requested files and report the outcome.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use tracing::{debug, error};

use crate::catalog::HeaderCatalog;
use crate::config::load_config;
use crate::diff::DiffManager;
use crate::fields::{DATE_FORMAT, FieldContext};
use crate::logging::{ColorMode, init_tracing};
use crate::output::{print_hint, print_results, print_start_message};
use crate::processor::{Processor, ProcessorConfig};
use crate::reconcile::Mode;
use crate::report::ProcessingSummary;

/// Arguments for the conhead command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
  /// Files, directories or glob patterns to process. Directories are
  /// processed recursively.
  #[arg(value_name = "SRC")]
  pub patterns: Vec<String>,

  /// Runs check without adding headers or re-writing. Will still exit with a
  /// non-zero status for files that are missing headers or are out of date.
  #[arg(long, conflicts_with = "delete")]
  pub check: bool,

  /// Deletes any existing header from files. If no header is found, the file
  /// is left unchanged.
  #[arg(long)]
  pub delete: bool,

  /// Increase log verbosity. May be used more than once.
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Decrease log verbosity. May be used more than once.
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub quiet: u8,

  /// Path to config file (default: nearest .conhead.toml or pyproject.toml)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Date used for header fields instead of today
  #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
  pub date: Option<NaiveDate>,

  /// Show a diff of the changes on stderr
  #[arg(long)]
  pub show_diff: bool,

  /// Append a diff of the changes to a file
  #[arg(long, value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| format!("invalid date '{value}': {e}"))
}

impl RunArgs {
  const fn mode(&self) -> Mode {
    if self.delete { Mode::Delete } else { Mode::Maintain }
  }
}

/// Run conhead with the given arguments.
///
/// Exits the process with status 1 when any file was missing its header, had
/// a stale header, had a header removed or failed, even if it was rewritten.
pub async fn run(args: RunArgs) -> Result<()> {
  // Initialize tracing subscriber and output modes
  init_tracing(args.verbose, args.quiet, args.colors);
  args.colors.apply();

  let current_dir = std::env::current_dir().context("Failed to get current directory")?;

  let config = load_config(args.config.as_deref(), &current_dir)?;
  let Some(config) = config.filter(|config| !config.is_empty()) else {
    error!("no header configuration defined");
    process::exit(1);
  };

  let catalog = HeaderCatalog::build(&config.definitions()).context("Invalid header configuration")?;
  debug!("Loaded {} header definitions", catalog.len());

  let context = match args.date {
    Some(date) => FieldContext::for_date(date),
    None => FieldContext::today(),
  };
  debug!("Using date {}", context.current_date);

  let mode = args.mode();
  let processor = Processor::new(ProcessorConfig {
    mode,
    check_only: args.check,
    diff_manager: DiffManager::new(args.show_diff, args.save_diff.clone()),
    ..ProcessorConfig::new(Arc::new(catalog), context, current_dir.clone())
  });

  let files = processor.collect(&args.patterns)?;
  print_start_message(files.len(), args.check);

  let start_time = Instant::now();
  let reports = processor.process_files(files).await;
  let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());

  print_results(&reports, &summary, mode, args.check, &current_dir);

  if summary.is_clean() {
    return Ok(());
  }

  if args.check && summary.dirty() > 0 {
    print_hint("Run without --check to add missing headers and update stale ones.");
  }

  process::exit(1);
}
