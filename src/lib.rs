//! # conhead
//!
//! A tool that keeps consistent headers at the top of source files.
//!
//! Headers are described by templates bound to file extensions. Templates are
//! literal text with `{{FIELD}}` placeholders whose values change over time,
//! such as the `{{YEARS}}` of a copyright notice. conhead adds headers to files
//! missing them and brings existing headers up to date, widening `2020` to
//! `2020-2024` once the year changes, without disturbing the rest of the file.
//!
//! ## Features
//!
//! * Field-aware templates with `YEARS`, `DATE` and configurable literal fields
//! * Check-only mode that reports missing and stale headers
//! * Delete mode that removes existing headers
//! * Configuration in `.conhead.toml` or `pyproject.toml`
//!
//! ## Usage as a Library
//!
//! ```rust
//! use conhead::catalog::{HeaderCatalog, HeaderDefinition};
//! use conhead::fields::FieldContext;
//! use conhead::reconcile::{Mode, ReconcileResult, reconcile};
//!
//! fn main() -> anyhow::Result<()> {
//!     let catalog = HeaderCatalog::build(&[HeaderDefinition::new(
//!         "python",
//!         &["py"],
//!         "# Copyright {{YEARS}} Acme\n",
//!     )])?;
//!     let header = catalog
//!         .for_path(std::path::Path::new("src/app.py"))
//!         .expect("python files have a header");
//!
//!     let context = FieldContext::new(2024, "2024-03-01");
//!     let content = "# Copyright 2021 Acme\nprint('hi')\n";
//!
//!     let result = reconcile(header, content, &context, Mode::Maintain);
//!     assert!(matches!(result, ReconcileResult::Updated { .. }));
//!     assert_eq!(result.apply(content), "# Copyright 2021-2024 Acme\nprint('hi')\n");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`template`] - Template compilation
//! * [`fields`] - Field kinds, defaults and merging
//! * [`header`] - Rendering and matching headers
//! * [`reconcile`] - Deciding what to do with one file's content
//! * [`catalog`] - Header definitions indexed by extension
//! * [`processor`] - Processing files on disk
//! * [`logging`] - Logging utilities for verbose output

pub mod catalog;
pub mod cli;
pub mod config;
pub mod diff;
pub mod fields;
pub mod header;
pub mod logging;
pub mod output;
pub mod processor;
pub mod reconcile;
pub mod report;
pub mod template;
