//! # Fields Module
//!
//! This module defines the fields that may appear inside a header template and
//! how each kind of field computes its value.
//!
//! Every field has a [`FieldKind`]:
//! - [`FieldKind::Years`] holds a copyright year or year range and widens the range when the current year moves
//!   past it
//! - [`FieldKind::Date`] records a point in time and is never advanced once written
//! - [`FieldKind::Literal`] is a named capture point (an organization name, for example) that is preserved verbatim
//!   after it is first written
//!
//! Field values are computed against a [`FieldContext`] which carries the
//! current year and date, so every computation is a pure function of its
//! inputs.
//!
//! ## Example
//!
//! ```rust
//! use conhead::fields::{FieldContext, FieldKind};
//!
//! let context = FieldContext::new(2024, "2024-03-01");
//! assert_eq!(FieldKind::Years.merge("2020", &context), "2020-2024");
//! assert_eq!(FieldKind::Years.merge("2020-2024", &context), "2020-2024");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

/// Name of the builtin copyright years field.
pub const YEARS_FIELD: &str = "YEARS";

/// Name of the builtin date field.
pub const DATE_FIELD: &str = "DATE";

/// Format used when rendering the current date into a `DATE` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The current time as seen by field computations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
  /// The current year
  pub current_year: i32,
  /// The current date formatted as `YYYY-MM-DD`
  pub current_date: String,
}

impl FieldContext {
  /// Creates a context from an explicit year and date string.
  pub fn new(current_year: i32, current_date: impl Into<String>) -> Self {
    Self {
      current_year,
      current_date: current_date.into(),
    }
  }

  /// Creates a context for a calendar date.
  pub fn for_date(date: NaiveDate) -> Self {
    Self {
      current_year: date.year(),
      current_date: date.format(DATE_FORMAT).to_string(),
    }
  }

  /// Creates a context for today's date according to the local clock.
  pub fn today() -> Self {
    Self::for_date(Local::now().date_naive())
  }
}

/// The kinds of field a template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
  /// Copyright year or year range, e.g. `2020` or `2020-2024`
  Years,
  /// A calendar date in `YYYY-MM-DD` form
  Date,
  /// Free text on a single line, preserved once written
  Literal,
}

impl FieldKind {
  /// Regular expression describing the lexical shape of a rendered value.
  ///
  /// Values never span a line break.
  pub const fn pattern(self) -> &'static str {
    match self {
      Self::Years => r"\d{4}(?:-\d{4})?",
      Self::Date => r"\d{4}-\d{2}-\d{2}",
      Self::Literal => r"[^\r\n]*",
    }
  }

  /// Computes a field's new value from the value captured in an existing
  /// header.
  ///
  /// `Years` widens a stale year or range to end at the current year. A prior
  /// value in the future is left alone; clock skew is never "fixed" backwards.
  /// `Date` and `Literal` values are returned unchanged.
  pub fn merge(self, prior: &str, context: &FieldContext) -> String {
    match self {
      Self::Years => match Years::parse(prior) {
        Some(years) => years.advance_to(context.current_year).to_string(),
        None => prior.to_string(),
      },
      Self::Date | Self::Literal => prior.to_string(),
    }
  }
}

impl fmt::Display for FieldKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Years => write!(f, "years"),
      Self::Date => write!(f, "date"),
      Self::Literal => write!(f, "literal"),
    }
  }
}

/// A named field as referenced by a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
  /// Name used inside `{{...}}`
  pub name: String,
  /// Kind resolved through the [`FieldRegistry`]
  pub kind: FieldKind,
}

/// A year or year range as written into a `YEARS` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Years {
  /// A single year, e.g. `2022`
  Single(i32),
  /// An inclusive range, e.g. `2020-2022`
  Range(i32, i32),
}

impl Years {
  /// Parses `YYYY` or `YYYY-YYYY`.
  pub fn parse(value: &str) -> Option<Self> {
    match value.split_once('-') {
      Some((start, end)) => Some(Self::Range(parse_year(start)?, parse_year(end)?)),
      None => Some(Self::Single(parse_year(value)?)),
    }
  }

  /// Extends the value so that it ends at `current_year`.
  ///
  /// Values that already reach `current_year`, or lie beyond it, are returned
  /// unchanged.
  pub const fn advance_to(self, current_year: i32) -> Self {
    match self {
      Self::Single(year) if current_year > year => Self::Range(year, current_year),
      Self::Range(start, end) if current_year > end => Self::Range(start, current_year),
      other => other,
    }
  }
}

impl fmt::Display for Years {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Single(year) => write!(f, "{year:04}"),
      Self::Range(start, end) => write!(f, "{start:04}-{end:04}"),
    }
  }
}

fn parse_year(value: &str) -> Option<i32> {
  if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
    value.parse().ok()
  } else {
    None
  }
}

/// Error raised when declaring a literal field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
  /// The name is not a valid identifier.
  #[error("invalid field name '{0}': expected [A-Za-z_][A-Za-z0-9_]*")]
  InvalidName(String),

  /// The name is already taken by a builtin field.
  #[error("field name '{0}' is reserved for a builtin field")]
  ReservedName(String),

  /// The default value spans more than one line.
  #[error("default value of field '{0}' must not contain a line break")]
  MultilineDefault(String),
}

/// The set of fields known to a template compiler.
///
/// Every registry knows the builtin `YEARS` and `DATE` fields. Literal fields
/// are declared per header definition along with their default value, so one
/// definition's literal fields are never visible to another's templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
  literals: BTreeMap<String, String>,
}

impl FieldRegistry {
  /// Creates a registry containing only the builtin fields.
  pub fn new() -> Self {
    Self::default()
  }

  /// Declares a literal field and the value written when no header exists yet.
  ///
  /// Redeclaring a literal replaces its default. Defaults are single-line, as
  /// are all field values.
  pub fn declare_literal(&mut self, name: &str, default: impl Into<String>) -> Result<(), FieldError> {
    if !is_identifier(name) {
      return Err(FieldError::InvalidName(name.to_string()));
    }
    if builtin_kind(name).is_some() {
      return Err(FieldError::ReservedName(name.to_string()));
    }
    let default = default.into();
    if default.contains(['\n', '\r']) {
      return Err(FieldError::MultilineDefault(name.to_string()));
    }
    self.literals.insert(name.to_string(), default);
    Ok(())
  }

  /// Looks up the kind of a field by name.
  pub fn lookup(&self, name: &str) -> Option<FieldKind> {
    builtin_kind(name).or_else(|| self.literals.contains_key(name).then_some(FieldKind::Literal))
  }

  /// Computes the value written for a field when the file has no header.
  pub fn default_value(&self, field: &Field, context: &FieldContext) -> String {
    match field.kind {
      FieldKind::Years => Years::Single(context.current_year).to_string(),
      FieldKind::Date => context.current_date.clone(),
      FieldKind::Literal => self.literals.get(&field.name).cloned().unwrap_or_default(),
    }
  }
}

fn builtin_kind(name: &str) -> Option<FieldKind> {
  match name {
    YEARS_FIELD => Some(FieldKind::Years),
    DATE_FIELD => Some(FieldKind::Date),
    _ => None,
  }
}

/// Returns true if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '_' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn context(year: i32) -> FieldContext {
    FieldContext::new(year, format!("{year}-06-15"))
  }

  #[test]
  fn test_years_merge_same_year_unchanged() {
    assert_eq!(FieldKind::Years.merge("2020", &context(2020)), "2020");
  }

  #[test]
  fn test_years_merge_single_year_widens() {
    assert_eq!(FieldKind::Years.merge("2020", &context(2022)), "2020-2022");
  }

  #[test]
  fn test_years_merge_current_range_unchanged() {
    assert_eq!(FieldKind::Years.merge("2020-2022", &context(2022)), "2020-2022");
  }

  #[test]
  fn test_years_merge_stale_range_widens() {
    assert_eq!(FieldKind::Years.merge("2020-2022", &context(2024)), "2020-2024");
  }

  #[test]
  fn test_years_merge_clock_skew_is_noop() {
    assert_eq!(FieldKind::Years.merge("2020-2022", &context(2021)), "2020-2022");
    assert_eq!(FieldKind::Years.merge("2024", &context(2021)), "2024");
  }

  #[test]
  fn test_years_merge_unparseable_value_is_preserved() {
    assert_eq!(FieldKind::Years.merge("20x0", &context(2024)), "20x0");
  }

  #[test]
  fn test_date_and_literal_merge_preserve_prior() {
    let ctx = context(2030);
    assert_eq!(FieldKind::Date.merge("2019-01-02", &ctx), "2019-01-02");
    assert_eq!(FieldKind::Literal.merge("Acme Corp", &ctx), "Acme Corp");
    assert_eq!(FieldKind::Literal.merge("", &ctx), "");
  }

  #[test]
  fn test_years_parse() {
    assert_eq!(Years::parse("2019"), Some(Years::Single(2019)));
    assert_eq!(Years::parse("2014-2019"), Some(Years::Range(2014, 2019)));
    assert_eq!(Years::parse("19"), None);
    assert_eq!(Years::parse("2014-"), None);
    assert_eq!(Years::parse("2014-2019-2020"), None);
  }

  #[test]
  fn test_years_display_pads_to_four_digits() {
    assert_eq!(Years::Single(999).to_string(), "0999");
    assert_eq!(Years::Range(2014, 2019).to_string(), "2014-2019");
  }

  #[test]
  fn test_context_for_date() {
    let date = NaiveDate::from_ymd_opt(2022, 5, 30).expect("valid date");
    let ctx = FieldContext::for_date(date);
    assert_eq!(ctx.current_year, 2022);
    assert_eq!(ctx.current_date, "2022-05-30");
  }

  #[test]
  fn test_registry_builtins() {
    let registry = FieldRegistry::new();
    assert_eq!(registry.lookup("YEARS"), Some(FieldKind::Years));
    assert_eq!(registry.lookup("DATE"), Some(FieldKind::Date));
    assert_eq!(registry.lookup("OWNER"), None);
    assert_eq!(registry.lookup("years"), None);
  }

  #[test]
  fn test_registry_literal_defaults() {
    let mut registry = FieldRegistry::new();
    registry.declare_literal("OWNER", "Acme Corp").expect("valid literal");
    registry.declare_literal("TEAM", "").expect("valid literal");

    assert_eq!(registry.lookup("OWNER"), Some(FieldKind::Literal));

    let ctx = context(2022);
    let owner = Field {
      name: "OWNER".to_string(),
      kind: FieldKind::Literal,
    };
    let team = Field {
      name: "TEAM".to_string(),
      kind: FieldKind::Literal,
    };
    assert_eq!(registry.default_value(&owner, &ctx), "Acme Corp");
    assert_eq!(registry.default_value(&team, &ctx), "");
  }

  #[test]
  fn test_registry_builtin_defaults() {
    let registry = FieldRegistry::new();
    let ctx = context(2022);
    let years = Field {
      name: YEARS_FIELD.to_string(),
      kind: FieldKind::Years,
    };
    let date = Field {
      name: DATE_FIELD.to_string(),
      kind: FieldKind::Date,
    };
    assert_eq!(registry.default_value(&years, &ctx), "2022");
    assert_eq!(registry.default_value(&date, &ctx), "2022-06-15");
  }

  #[test]
  fn test_registry_rejects_bad_literal_names() {
    let mut registry = FieldRegistry::new();
    assert_eq!(
      registry.declare_literal("1ST", ""),
      Err(FieldError::InvalidName("1ST".to_string()))
    );
    assert_eq!(
      registry.declare_literal("has space", ""),
      Err(FieldError::InvalidName("has space".to_string()))
    );
    assert_eq!(
      registry.declare_literal("YEARS", ""),
      Err(FieldError::ReservedName("YEARS".to_string()))
    );
  }

  #[test]
  fn test_registry_rejects_multiline_defaults() {
    let mut registry = FieldRegistry::new();
    assert_eq!(
      registry.declare_literal("OWNER", "Acme\nCorp"),
      Err(FieldError::MultilineDefault("OWNER".to_string()))
    );
    assert_eq!(
      registry.declare_literal("OWNER", "Acme\r"),
      Err(FieldError::MultilineDefault("OWNER".to_string()))
    );
    assert_eq!(registry.lookup("OWNER"), None);
  }

  #[test]
  fn test_is_identifier() {
    assert!(is_identifier("YEARS"));
    assert!(is_identifier("_private"));
    assert!(is_identifier("a1_b2"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier("dash-name"));
  }
}
