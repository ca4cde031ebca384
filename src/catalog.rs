//! # Catalog Module
//!
//! This module holds every configured header definition in compiled form and
//! selects the one that applies to a given file by its extension.
//!
//! The catalog is built once, before any file is processed, and is read-only
//! afterwards so it can be shared between concurrent file tasks.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::fields::{FieldError, FieldRegistry};
use crate::header::{Header, HeaderError};

/// A named header template bound to one or more file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDefinition {
  /// Name of the definition
  pub name: String,

  /// Extensions (without the leading dot) whose files receive this header
  pub extensions: Vec<String>,

  /// Raw template text
  pub template: String,

  /// Literal fields and their default values
  pub fields: BTreeMap<String, String>,
}

impl HeaderDefinition {
  /// Creates a definition without literal fields.
  pub fn new(name: impl Into<String>, extensions: &[&str], template: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      extensions: extensions.iter().map(|ext| (*ext).to_string()).collect(),
      template: template.into(),
      fields: BTreeMap::new(),
    }
  }

  /// Adds a literal field with its default value.
  #[must_use]
  pub fn with_field(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
    self.fields.insert(name.into(), default.into());
    self
  }

  /// Compiles this definition into a [`Header`].
  pub fn compile(&self) -> Result<Header, CatalogError> {
    let mut registry = FieldRegistry::new();
    for (field, default) in &self.fields {
      registry
        .declare_literal(field, default.as_str())
        .map_err(|source| CatalogError::Field {
          name: self.name.clone(),
          source,
        })?;
    }

    Header::compile(&self.name, &self.template, registry).map_err(|source| CatalogError::Header {
      name: self.name.clone(),
      source,
    })
  }
}

/// Error raised while building a [`HeaderCatalog`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
  /// A definition's template could not be compiled
  #[error("header definition '{name}': {source}")]
  Header {
    name: String,
    #[source]
    source: HeaderError,
  },

  /// A definition declares an unusable literal field
  #[error("header definition '{name}': {source}")]
  Field {
    name: String,
    #[source]
    source: FieldError,
  },

  /// Two definitions claim the same extension
  #[error("extension '{extension}' is claimed by both '{first}' and '{second}'")]
  AmbiguousExtensionMapping {
    extension: String,
    first: String,
    second: String,
  },
}

/// Compiled headers indexed by extension.
#[derive(Debug, Clone, Default)]
pub struct HeaderCatalog {
  headers: Vec<Header>,
  by_extension: HashMap<String, usize>,
}

impl HeaderCatalog {
  /// Compiles every definition and indexes its extensions.
  ///
  /// Extensions are compared case-insensitively.
  pub fn build(definitions: &[HeaderDefinition]) -> Result<Self, CatalogError> {
    let mut catalog = Self::default();

    for definition in definitions {
      let index = catalog.headers.len();
      catalog.headers.push(definition.compile()?);

      for extension in &definition.extensions {
        let key = extension.to_lowercase();
        if let Some(&existing) = catalog.by_extension.get(&key) {
          return Err(CatalogError::AmbiguousExtensionMapping {
            extension: key,
            first: catalog.headers[existing].name().to_string(),
            second: definition.name.clone(),
          });
        }
        catalog.by_extension.insert(key, index);
      }
    }

    Ok(catalog)
  }

  /// Returns true if the catalog holds no definitions.
  pub fn is_empty(&self) -> bool {
    self.headers.is_empty()
  }

  /// Number of compiled definitions.
  pub fn len(&self) -> usize {
    self.headers.len()
  }

  /// Iterates the compiled headers in definition order.
  pub fn headers(&self) -> impl Iterator<Item = &Header> {
    self.headers.iter()
  }

  /// Returns the header bound to `extension`, ignoring case.
  pub fn for_extension(&self, extension: &str) -> Option<&Header> {
    self
      .by_extension
      .get(&extension.to_lowercase())
      .map(|&index| &self.headers[index])
  }

  /// Selects the header for a file.
  ///
  /// The longest `.<extension>` suffix of the file name wins, so `d.ts` can be
  /// configured separately from `ts`.
  pub fn for_path(&self, path: &Path) -> Option<&Header> {
    let file_name = path.file_name()?.to_string_lossy().to_lowercase();

    file_name
      .match_indices('.')
      .map(|(dot, _)| &file_name[dot + 1..])
      .filter(|suffix| !suffix.is_empty())
      .find_map(|suffix| self.by_extension.get(suffix))
      .map(|&index| &self.headers[index])
  }
}
