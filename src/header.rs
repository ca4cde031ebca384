//! # Header Module
//!
//! A [`Header`] pairs a [`CompiledTemplate`] with the [`FieldRegistry`] it was
//! compiled against and a regular expression derived from the template. It
//! can:
//! - render header text from field values ([`Header::render`],
//!   [`Header::render_with`])
//! - recognize a previously rendered header at the very start of file content
//!   and capture its field values ([`Header::find`])
//!
//! The pattern reproduces every literal token exactly, except that a line
//! break also matches `\r\n`, and turns every field into a capture group
//! restricted to the field kind's lexical shape. It is anchored at byte 0 and
//! never searches further into the file.

use std::collections::HashMap;
use std::ops::Range;

use regex::Regex;

use crate::fields::{Field, FieldContext, FieldRegistry};
use crate::template::{CompiledTemplate, TemplateSyntaxError, Token};

/// Error raised while building a [`Header`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum HeaderError {
  /// The template text is malformed.
  #[error(transparent)]
  Syntax(#[from] TemplateSyntaxError),

  /// The matching pattern could not be built (typically too large).
  #[error("failed to build header pattern: {0}")]
  Pattern(#[from] regex::Error),
}

/// Error raised when rendering with caller supplied values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
  /// No value was supplied for a field used by the template.
  #[error("missing value for field '{0}'")]
  MissingFieldValue(String),
}

/// A field value captured from an existing header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCapture {
  /// The template field this value was captured for
  pub field: Field,
  /// The captured text
  pub value: String,
}

/// A header found at the start of file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
  /// Byte range of the whole header; always starts at 0
  pub span: Range<usize>,
  /// One capture per field slot, in template order
  pub captures: Vec<FieldCapture>,
}

impl HeaderMatch {
  /// Returns the captured value of the first slot named `name`.
  pub fn capture(&self, name: &str) -> Option<&str> {
    self
      .captures
      .iter()
      .find(|capture| capture.field.name == name)
      .map(|capture| capture.value.as_str())
  }

  /// Returns the matched header text from the content it was found in.
  pub fn text<'a>(&self, content: &'a str) -> &'a str {
    &content[self.span.clone()]
  }
}

/// A compiled header definition, ready to render and match.
///
/// `Header` is immutable once built and is shared read-only between
/// concurrently processed files.
#[derive(Debug, Clone)]
pub struct Header {
  name: String,
  template: CompiledTemplate,
  registry: FieldRegistry,
  pattern: Regex,
}

impl Header {
  /// Compiles a raw template into a header.
  ///
  /// # Parameters
  ///
  /// * `name` - Name of the header definition, used in diagnostics
  /// * `raw` - Template text as written in configuration
  /// * `registry` - Fields available to the template
  ///
  /// # Errors
  ///
  /// Returns [`HeaderError::Syntax`] if the template is malformed.
  pub fn compile(name: impl Into<String>, raw: &str, registry: FieldRegistry) -> Result<Self, HeaderError> {
    let template = CompiledTemplate::compile(raw, &registry)?;
    Self::from_template(name, template, registry)
  }

  /// Builds a header from an already compiled template.
  pub fn from_template(
    name: impl Into<String>,
    template: CompiledTemplate,
    registry: FieldRegistry,
  ) -> Result<Self, HeaderError> {
    let pattern = Regex::new(&build_pattern(&template))?;
    Ok(Self {
      name: name.into(),
      template,
      registry,
      pattern,
    })
  }

  /// Name of the header definition.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The compiled template.
  pub const fn template(&self) -> &CompiledTemplate {
    &self.template
  }

  /// The regular expression used by [`find`](Self::find).
  pub fn pattern(&self) -> &str {
    self.pattern.as_str()
  }

  /// Renders the header with values computed per field slot.
  ///
  /// `value` is called once per field slot, in template order, with the slot
  /// index and the field.
  pub fn render_with<F>(&self, mut value: F) -> String
  where
    F: FnMut(usize, &Field) -> String,
  {
    let mut rendered = String::new();
    let mut slot = 0;
    for token in self.template.tokens() {
      match token {
        Token::Literal(text) => rendered.push_str(text),
        Token::Field(field) => {
          rendered.push_str(&value(slot, field));
          slot += 1;
        }
      }
    }
    rendered
  }

  /// Renders the header with one value per field name.
  ///
  /// Every slot of a repeated field receives the same value.
  ///
  /// # Errors
  ///
  /// Returns [`RenderError::MissingFieldValue`] if a field used by the
  /// template has no value.
  pub fn render(&self, values: &HashMap<String, String>) -> Result<String, RenderError> {
    if let Some(missing) = self.template.fields().find(|field| !values.contains_key(&field.name)) {
      return Err(RenderError::MissingFieldValue(missing.name.clone()));
    }
    Ok(self.render_with(|_, field| values.get(&field.name).cloned().unwrap_or_default()))
  }

  /// Renders the header as it would be written into a file that has none.
  pub fn render_default(&self, context: &FieldContext) -> String {
    self.render_with(|_, field| self.registry.default_value(field, context))
  }

  /// Looks for this header at the very start of `content`.
  ///
  /// Returns `None` when the content does not begin with the header, including
  /// when a field's prior value does not have the expected shape.
  pub fn find(&self, content: &str) -> Option<HeaderMatch> {
    let captures = self.pattern.captures(content)?;
    let whole = captures.get(0)?;

    let fields = self
      .template
      .fields()
      .enumerate()
      .map(|(slot, field)| FieldCapture {
        field: field.clone(),
        value: captures
          .get(slot + 1)
          .map(|m| m.as_str().to_string())
          .unwrap_or_default(),
      })
      .collect();

    Some(HeaderMatch {
      span: whole.range(),
      captures: fields,
    })
  }
}

fn build_pattern(template: &CompiledTemplate) -> String {
  let mut pattern = String::from(r"\A");
  for token in template.tokens() {
    match token {
      Token::Literal(text) => {
        let lines: Vec<String> = text.split('\n').map(regex::escape).collect();
        pattern.push_str(&lines.join(r"\r?\n"));
      }
      Token::Field(field) => {
        pattern.push('(');
        pattern.push_str(field.kind.pattern());
        pattern.push(')');
      }
    }
  }
  pattern
}
