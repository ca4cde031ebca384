//! # Template Module
//!
//! This module compiles raw header templates, as written in configuration, into
//! a [`CompiledTemplate`]: an ordered sequence of literal text and field
//! tokens.
//!
//! Template syntax:
//! - `{{NAME}}` inserts the field `NAME`, which must be known to the
//!   [`FieldRegistry`] used for compilation
//! - `\{`, `\}` and `\\` produce a literal `{`, `}` and `\`
//! - any other `{`, `}` or `\` is an error
//!
//! Templates are de-indented before scanning so they can be written as
//! indented blocks inside a configuration file.
//!
//! ## Example
//!
//! ```rust
//! use conhead::fields::FieldRegistry;
//! use conhead::template::{CompiledTemplate, Token};
//!
//! # fn main() -> Result<(), conhead::template::TemplateSyntaxError> {
//! let template = CompiledTemplate::compile("# Copyright {{YEARS}} \\{Acme\\}\n", &FieldRegistry::new())?;
//! assert_eq!(template.tokens().len(), 3);
//! assert!(matches!(&template.tokens()[2], Token::Literal(text) if text == " {Acme}\n"));
//! # Ok(())
//! # }
//! ```

use crate::fields::{Field, FieldRegistry, is_identifier};

/// Error raised when a template cannot be compiled.
///
/// Positions are 1-based line and column numbers within the de-indented
/// template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateSyntaxError {
  /// The template has no content.
  #[error("template is empty")]
  Empty,

  /// A `{` or `}` that is neither escaped nor part of a `{{NAME}}` field.
  #[error("invalid character '{ch}' found at {line}:{column}")]
  InvalidCharacter { ch: char, line: usize, column: usize },

  /// A backslash followed by something other than `{`, `}` or `\`.
  #[error("unknown escape '\\{ch}' found at {line}:{column}")]
  UnknownEscape { ch: char, line: usize, column: usize },

  /// A backslash at the very end of the template.
  #[error("dangling escape found at {line}:{column}")]
  DanglingEscape { line: usize, column: usize },

  /// A `{{` with no closing `}}`.
  #[error("unterminated field found at {line}:{column}")]
  UnterminatedField { line: usize, column: usize },

  /// A field whose name is not an identifier.
  #[error("invalid field name '{name}' at {line}:{column}")]
  InvalidFieldName { name: String, line: usize, column: usize },

  /// A well formed field that the registry does not know.
  #[error("unknown field type '{name}' at {line}:{column}")]
  UnknownField { name: String, line: usize, column: usize },
}

/// A single piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  /// Text copied to the header as is, escapes already resolved
  Literal(String),
  /// A placeholder replaced by a field value
  Field(Field),
}

/// A header template ready for rendering and matching.
///
/// Adjacent literal runs are always merged, so two [`Token::Literal`] values
/// are never neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
  tokens: Vec<Token>,
}

impl CompiledTemplate {
  /// Compiles a raw template.
  ///
  /// The template is de-indented first (see [`deindent`]) and then scanned
  /// left to right in a single pass.
  ///
  /// # Errors
  ///
  /// Returns a [`TemplateSyntaxError`] for unbalanced braces, unknown escapes,
  /// unknown fields, or an empty template.
  pub fn compile(raw: &str, registry: &FieldRegistry) -> Result<Self, TemplateSyntaxError> {
    let source = deindent(raw);
    let mut scanner = Scanner::new(&source);
    let mut tokens = Vec::new();
    let mut literal = String::new();

    while let Some(ch) = scanner.peek() {
      let (line, column) = scanner.position();
      match ch {
        '\\' => {
          scanner.bump();
          match scanner.bump() {
            Some(escaped @ ('{' | '}' | '\\')) => literal.push(escaped),
            Some(other) => {
              return Err(TemplateSyntaxError::UnknownEscape {
                ch: other,
                line,
                column,
              });
            }
            None => return Err(TemplateSyntaxError::DanglingEscape { line, column }),
          }
        }
        '{' if scanner.rest().starts_with("{{") => {
          let field = scanner.field(registry)?;
          if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
          }
          tokens.push(Token::Field(field));
        }
        '{' | '}' => return Err(TemplateSyntaxError::InvalidCharacter { ch, line, column }),
        _ => {
          literal.push(ch);
          scanner.bump();
        }
      }
    }

    if !literal.is_empty() {
      tokens.push(Token::Literal(literal));
    }

    if tokens.is_empty() {
      return Err(TemplateSyntaxError::Empty);
    }

    Ok(Self { tokens })
  }

  /// The template's tokens in order.
  pub fn tokens(&self) -> &[Token] {
    &self.tokens
  }

  /// Every field slot in order, including repeated names.
  pub fn fields(&self) -> impl Iterator<Item = &Field> {
    self.tokens.iter().filter_map(|token| match token {
      Token::Field(field) => Some(field),
      Token::Literal(_) => None,
    })
  }
}

/// Character scanner that keeps track of line and column.
struct Scanner<'a> {
  source: &'a str,
  offset: usize,
  line: usize,
  column: usize,
}

impl<'a> Scanner<'a> {
  const fn new(source: &'a str) -> Self {
    Self {
      source,
      offset: 0,
      line: 1,
      column: 1,
    }
  }

  fn rest(&self) -> &'a str {
    &self.source[self.offset..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  const fn position(&self) -> (usize, usize) {
    (self.line, self.column)
  }

  fn bump(&mut self) -> Option<char> {
    let ch = self.peek()?;
    self.offset += ch.len_utf8();
    if ch == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
    Some(ch)
  }

  /// Consumes a `{{NAME}}` field. The scanner must be positioned on `{{`.
  fn field(&mut self, registry: &FieldRegistry) -> Result<Field, TemplateSyntaxError> {
    let (line, column) = self.position();
    let body = &self.rest()[2..];
    let Some(end) = body.find("}}") else {
      return Err(TemplateSyntaxError::UnterminatedField { line, column });
    };

    let name = &body[..end];
    if !is_identifier(name) {
      return Err(TemplateSyntaxError::InvalidFieldName {
        name: name.to_string(),
        line,
        column,
      });
    }
    let Some(kind) = registry.lookup(name) else {
      return Err(TemplateSyntaxError::UnknownField {
        name: name.to_string(),
        line,
        column,
      });
    };

    // Identifiers are ASCII, so the field never spans a line break.
    self.offset += end + 4;
    self.column += end + 4;

    Ok(Field {
      name: name.to_string(),
      kind,
    })
  }
}

/// De-indents a multi-line string.
///
/// The shortest leading-whitespace run among non-blank lines is removed from
/// every line, so relative indentation survives. Whitespace-only lines lose at
/// most that many characters.
///
/// ```rust
/// use conhead::template::deindent;
///
/// assert_eq!(deindent("    a\n      b\n    "), "a\n  b\n");
/// ```
pub fn deindent(text: &str) -> String {
  let indent = text
    .split('\n')
    .filter(|line| !line.trim().is_empty())
    .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
    .min()
    .unwrap_or(0);

  if indent == 0 {
    return text.to_string();
  }

  text
    .split('\n')
    .map(|line| {
      let skip: usize = line
        .chars()
        .take(indent)
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
      &line[skip..]
    })
    .collect::<Vec<_>>()
    .join("\n")
}
