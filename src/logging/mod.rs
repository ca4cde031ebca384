//! # Logging Module
//!
//! Diagnostics for a conhead run come in two flavours:
//! - per-file outcomes ("missing header: a.py", "out of date: b.rs") are
//!   `tracing` events written to stderr by the subscriber from [`init_tracing`]
//! - configuration discovery chatter goes through [`verbose_log!`], which only
//!   prints with `-v`
//!
//! The `-v`/`-q` counts also set a process-wide output mode that the `output`
//! module consults when printing results.
//!
//! ```rust
//! use conhead::logging::{is_verbose, level_for, set_verbose};
//! use conhead::verbose_log;
//! use tracing::level_filters::LevelFilter;
//!
//! assert_eq!(level_for(1, 0), LevelFilter::INFO);
//!
//! set_verbose();
//! assert!(is_verbose());
//! verbose_log!("Using config from {}", ".conhead.toml");
//! ```

mod modes;

pub use modes::{ColorMode, get_color_mode, init_tracing, is_quiet, is_verbose, level_for, set_quiet, set_verbose};

/// Prints to stderr when verbose mode is on.
///
/// Takes the same arguments as [`eprintln!`].
#[macro_export]
macro_rules! verbose_log {
  ($($arg:tt)*) => {
    if $crate::logging::is_verbose() {
      eprintln!($($arg)*);
    }
  };
}
