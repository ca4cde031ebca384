//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod run;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use run::{RunArgs, parse_date, run};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Consistent header manager
///
/// Maintains consistent headers across files. Adds headers to files that are
/// missing them and keeps the information in existing headers up to date.
#[derive(Parser, Debug)]
#[command(
  name = "conhead",
  version,
  about,
  long_about = None,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Add missing headers and update stale ones
  conhead src/ tests/

  # Report files with missing or stale headers without modifying them
  conhead --check src/

  # Show what would change
  conhead --check --show-diff src/**/*.py

  # Remove headers
  conhead --delete src/

  # Use an explicit configuration file and a fixed date
  conhead --config ci/conhead.toml --date 2024-01-01 src/
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub args: RunArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;
  use crate::logging::ColorMode;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_flags() {
    let cli = Cli::try_parse_from(["conhead", "--check", "-vv", "-q", "--date", "2024-02-29", "src"])
      .expect("valid arguments");

    assert!(cli.args.check);
    assert!(!cli.args.delete);
    assert_eq!(cli.args.verbose, 2);
    assert_eq!(cli.args.quiet, 1);
    assert_eq!(cli.args.patterns, vec!["src".to_string()]);
    assert_eq!(cli.args.colors, ColorMode::Auto);
    assert!(cli.args.date.is_some());
  }

  #[test]
  fn test_check_and_delete_conflict() {
    assert!(Cli::try_parse_from(["conhead", "--check", "--delete", "a.py"]).is_err());
  }

  #[test]
  fn test_invalid_date_rejected() {
    assert!(Cli::try_parse_from(["conhead", "--date", "2024-02-30", "a.py"]).is_err());
    assert!(Cli::try_parse_from(["conhead", "--date", "yesterday", "a.py"]).is_err());
  }
}
