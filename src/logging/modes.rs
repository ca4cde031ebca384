use std::cmp;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU8, Ordering};

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Global output mode (normal, quiet or verbose).
///
/// This is initialized to `0` (Normal) by default and changed by
/// [`set_verbose`], [`set_quiet`] or [`init_tracing`].
static OUTPUT_MODE: AtomicU8 = AtomicU8::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
  Normal = 0,
  Quiet = 1,
  Verbose = 2,
}

impl OutputMode {
  const fn from_u8(value: u8) -> Self {
    match value {
      1 => OutputMode::Quiet,
      2 => OutputMode::Verbose,
      _ => OutputMode::Normal,
    }
  }
}

/// Global atomic value to control color mode.
///
/// This is initialized to `0` (Auto) by default.
static COLOR_MODE: AtomicU8 = AtomicU8::new(0);

/// Enum representing the color mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
  /// Automatically determine whether to use colors based on TTY detection
  #[default]
  Auto = 0,
  /// Never use colors
  Never = 1,
  /// Always use colors
  Always = 2,
}

impl ColorMode {
  const fn from_u8(value: u8) -> Self {
    match value {
      1 => ColorMode::Never,
      2 => ColorMode::Always,
      _ => ColorMode::Auto,
    }
  }

  /// Makes this the global color mode and overrides owo-colors' terminal
  /// detection accordingly.
  pub fn apply(self) {
    COLOR_MODE.store(self as u8, Ordering::SeqCst);
    match self {
      ColorMode::Auto => owo_colors::unset_override(),
      ColorMode::Never => owo_colors::set_override(false),
      ColorMode::Always => owo_colors::set_override(true),
    }
  }

  /// Whether diagnostics written to stderr should carry ANSI colors.
  pub fn stderr_ansi(self) -> bool {
    match self {
      ColorMode::Auto => std::io::stderr().is_terminal(),
      ColorMode::Never => false,
      ColorMode::Always => true,
    }
  }
}

/// Sets the global verbose logging flag.
///
/// When verbose logging is enabled, the [`verbose_log!`](crate::verbose_log)
/// macro will output messages to stderr.
pub fn set_verbose() {
  OUTPUT_MODE.store(OutputMode::Verbose as u8, Ordering::SeqCst);
}

/// Sets the global quiet flag, reducing result output to bare paths.
pub fn set_quiet() {
  OUTPUT_MODE.store(OutputMode::Quiet as u8, Ordering::SeqCst);
}

/// Gets the current color mode.
pub fn get_color_mode() -> ColorMode {
  ColorMode::from_u8(COLOR_MODE.load(Ordering::SeqCst))
}

/// Checks if verbose logging is currently enabled.
pub fn is_verbose() -> bool {
  matches!(OutputMode::from_u8(OUTPUT_MODE.load(Ordering::SeqCst)), OutputMode::Verbose)
}

/// Checks if quiet mode is currently enabled.
pub fn is_quiet() -> bool {
  matches!(OutputMode::from_u8(OUTPUT_MODE.load(Ordering::SeqCst)), OutputMode::Quiet)
}

/// Maps `-v`/`-q` counts onto a log level.
///
/// The default is `WARN`; each `-v` raises it one step and each `-q` lowers
/// it one step.
pub fn level_for(verbose: u8, quiet: u8) -> LevelFilter {
  match i16::from(verbose) - i16::from(quiet) {
    i16::MIN..=-2 => LevelFilter::OFF,
    -1 => LevelFilter::ERROR,
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  }
}

/// Installs the global tracing subscriber and sets the output mode.
///
/// More `-v` than `-q` turns on verbose output and more `-q` than `-v` turns
/// on quiet output.
///
/// Diagnostics go to stderr as `LEVEL message` lines. `RUST_LOG`, when set,
/// takes precedence over the level derived from `verbose` and `quiet`.
/// Calling this more than once keeps the first subscriber.
pub fn init_tracing(verbose: u8, quiet: u8, color: ColorMode) {
  let level = level_for(verbose, quiet);

  match verbose.cmp(&quiet) {
    cmp::Ordering::Greater => set_verbose(),
    cmp::Ordering::Less => set_quiet(),
    cmp::Ordering::Equal => {}
  }

  let filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(color.stderr_ansi())
    .without_time()
    .with_target(false)
    .try_init();
}
