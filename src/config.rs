//! # Configuration Module
//!
//! This module loads header definitions for conhead.
//!
//! Definitions live either in a `.conhead.toml` file:
//!
//! ```toml
//! [header.python]
//! extensions = ["py", "pyi"]
//! template = """
//!     # Copyright {{YEARS}} {{OWNER}}
//! """
//!
//! [header.python.fields]
//! OWNER = "Acme Corp"
//! ```
//!
//! or in the `[tool.conhead.header.<name>]` tables of a `pyproject.toml`.
//! The file is chosen by `--config`, the `CONHEAD_CONFIG` environment
//! variable, or by searching upwards from the current directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::HeaderDefinition;
use crate::verbose_log;

/// The dedicated config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".conhead.toml";

/// Python project file that may carry a `[tool.conhead]` table.
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "CONHEAD_CONFIG";

/// A single header definition as written in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
  /// Template text. Common indentation is removed before compiling.
  pub template: String,

  /// Extensions without the leading dot. Defaults to the definition name.
  #[serde(default)]
  pub extensions: Option<Vec<String>>,

  /// Literal fields usable in the template, mapped to their values.
  #[serde(default)]
  pub fields: BTreeMap<String, String>,
}

/// Main configuration struct for conhead.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
  /// Header definitions keyed by name.
  #[serde(default)]
  pub header: BTreeMap<String, HeaderConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct PyProject {
  #[serde(default)]
  tool: PyProjectTools,
}

#[derive(Debug, Default, Deserialize)]
struct PyProjectTools {
  #[serde(default)]
  conhead: Option<Config>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML or unexpected keys.
  #[error("Failed to parse config file '{path}': {source}")]
  Parse { path: PathBuf, source: toml::de::Error },

  /// An extension entry is unusable.
  #[error("header.{header}: invalid extension '{extension}': {message}")]
  InvalidExtension {
    header: String,
    extension: String,
    message: String,
  },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// A file named `pyproject.toml` is read through its `[tool.conhead]`
  /// table; any other file is read as a `.conhead.toml`.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read,
  /// parsed or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let is_pyproject = path.file_name().is_some_and(|name| name == PYPROJECT_FILENAME);
    let config = if is_pyproject {
      Self::from_pyproject_str(&content)
    } else {
      Self::from_toml_str(&content)
    }
    .map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config = config.normalize();
    config.validate()?;

    verbose_log!("Loaded {} header definitions", config.header.len());

    Ok(config)
  }

  /// Parse the contents of a `.conhead.toml` file.
  pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  /// Parse the contents of a `pyproject.toml` file.
  ///
  /// A project without a `[tool.conhead]` table yields an empty config.
  pub fn from_pyproject_str(content: &str) -> Result<Self, toml::de::Error> {
    let project: PyProject = toml::from_str(content)?;
    Ok(project.tool.conhead.unwrap_or_default())
  }

  /// Returns true if no header definitions are configured.
  pub fn is_empty(&self) -> bool {
    self.header.is_empty()
  }

  /// Validate the configuration.
  ///
  /// Checks that extensions are non-empty and don't include the leading dot.
  /// Duplicate extensions and literal field declarations are checked when the
  /// definitions are compiled into a [`HeaderCatalog`](crate::catalog::HeaderCatalog).
  fn validate(&self) -> Result<(), ConfigError> {
    for (name, header) in &self.header {
      for ext in header.extensions(name) {
        if ext.is_empty() {
          return Err(ConfigError::InvalidExtension {
            header: name.clone(),
            extension: ext.to_string(),
            message: "extension cannot be empty".to_string(),
          });
        }

        if ext.starts_with('.') {
          return Err(ConfigError::InvalidExtension {
            header: name.clone(),
            extension: ext.to_string(),
            message: "extension should not include leading dot".to_string(),
          });
        }
      }
    }

    Ok(())
  }

  /// Normalize extensions to lowercase for case-insensitive matching.
  fn normalize(self) -> Self {
    let header = self
      .header
      .into_iter()
      .map(|(name, mut header)| {
        if let Some(extensions) = header.extensions.as_mut() {
          for ext in extensions.iter_mut() {
            *ext = ext.to_lowercase();
          }
        }
        (name, header)
      })
      .collect();

    Self { header }
  }

  /// Convert into header definitions for building a catalog.
  pub fn definitions(&self) -> Vec<HeaderDefinition> {
    self
      .header
      .iter()
      .map(|(name, header)| HeaderDefinition {
        name: name.clone(),
        extensions: header.extensions(name).map(str::to_string).collect(),
        template: header.template.clone(),
        fields: header.fields.clone(),
      })
      .collect()
  }
}

impl HeaderConfig {
  /// Configured extensions, falling back to the definition name.
  pub fn extensions<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    match &self.extensions {
      Some(extensions) => Box::new(extensions.iter().map(String::as_str)),
      None => Box::new(std::iter::once(name)),
    }
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `CONHEAD_CONFIG` environment variable
/// 3. `.conhead.toml`, then `pyproject.toml`, in `start_dir` and each of its
///    ancestors
///
/// An explicit path is returned even if it does not exist so that loading
/// reports the problem.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `start_dir` - Directory the upward search begins in
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, start_dir: &Path) -> Option<PathBuf> {
  // 1. Explicit path from CLI takes highest priority
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  // 2. Check environment variable
  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.is_file() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  // 3. Search upwards
  for dir in start_dir.ancestors() {
    for filename in [DEFAULT_CONFIG_FILENAME, PYPROJECT_FILENAME] {
      let candidate = dir.join(filename);
      if candidate.is_file() {
        verbose_log!("Using discovered config: {}", candidate.display());
        return Some(candidate);
      }
    }
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `start_dir` - Directory the upward search begins in
///
/// # Returns
///
/// The loaded configuration, or `None` if no config file is found.
pub fn load_config(explicit_path: Option<&Path>, start_dir: &Path) -> Result<Option<Config>> {
  match discover_config_path(explicit_path, start_dir) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::catalog::{CatalogError, HeaderCatalog};
  use crate::fields::FieldError;

  fn load_str(content: &str) -> Result<Config, ConfigError> {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&config_path, content).expect("write config");
    Config::load(&config_path)
  }

  #[test]
  fn test_parse_valid_config() {
    let config_content = concat!(
      "[header.py]\n",
      "template = \"# Copyright {{YEARS}}\\n\"\n",
      "\n",
      "[header.typescript]\n",
      "extensions = [\"ts\", \"tsx\"]\n",
      "template = \"// {{YEARS}} {{OWNER}}\\n\"\n",
      "\n",
      "[header.typescript.fields]\n",
      "OWNER = \"Acme\"\n",
    );

    let config = Config::from_toml_str(config_content).expect("valid config should parse");
    assert_eq!(config.header.len(), 2);

    let py = config.header.get("py").expect("py should exist");
    assert_eq!(py.template, "# Copyright {{YEARS}}\n");
    assert!(py.extensions.is_none());
    assert!(py.fields.is_empty());

    let ts = config.header.get("typescript").expect("typescript should exist");
    assert_eq!(ts.extensions, Some(vec!["ts".to_string(), "tsx".to_string()]));
    assert_eq!(ts.fields.get("OWNER").map(String::as_str), Some("Acme"));
  }

  #[test]
  fn test_parse_empty_config() {
    let config = Config::from_toml_str("").expect("empty config should parse");
    assert!(config.is_empty());
  }

  #[test]
  fn test_default_extensions() {
    let config = load_str("[header.py]\ntemplate = \"# {{YEARS}}\\n\"\n").expect("load should succeed");
    let definitions = config.definitions();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name, "py");
    assert_eq!(definitions[0].extensions, vec!["py".to_string()]);
  }

  #[test]
  fn test_template_required() {
    let result = load_str("[header.py]\nextensions = [\"py\"]\n");
    assert!(matches!(result.expect_err("should fail"), ConfigError::Parse { .. }));
  }

  #[test]
  fn test_unexpected_options_rejected() {
    let result = load_str("[header.py]\ntemplate = \"x\"\ncolour = \"blue\"\n");
    assert!(matches!(result.expect_err("should fail"), ConfigError::Parse { .. }));

    let result = load_str("unexpected = 1\n");
    assert!(matches!(result.expect_err("should fail"), ConfigError::Parse { .. }));
  }

  #[test]
  fn test_extensions_must_be_strings() {
    let result = load_str("[header.py]\ntemplate = \"x\"\nextensions = [\"py\", 20]\n");
    assert!(matches!(result.expect_err("should fail"), ConfigError::Parse { .. }));
  }

  #[test]
  fn test_validate_leading_dot() {
    let result = load_str("[header.py]\ntemplate = \"x\"\nextensions = [\".py\"]\n");
    assert!(matches!(
      result.expect_err("should fail"),
      ConfigError::InvalidExtension { .. }
    ));
  }

  #[test]
  fn test_validate_empty_extension() {
    let result = load_str("[header.py]\ntemplate = \"x\"\nextensions = [\"\"]\n");
    assert!(matches!(
      result.expect_err("should fail"),
      ConfigError::InvalidExtension { .. }
    ));
  }

  #[test]
  fn test_ambiguous_extension_rejected_by_catalog() {
    let config = load_str(concat!(
      "[header.one]\n",
      "template = \"x\"\n",
      "extensions = [\"py\"]\n",
      "[header.two]\n",
      "template = \"y\"\n",
      "extensions = [\"PY\"]\n",
    ))
    .expect("load should succeed");

    match HeaderCatalog::build(&config.definitions()).expect_err("should fail") {
      CatalogError::AmbiguousExtensionMapping {
        extension,
        first,
        second,
      } => {
        assert_eq!(extension, "py");
        assert_eq!(first, "one");
        assert_eq!(second, "two");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_bad_fields_rejected_by_catalog() {
    let cases = [
      ("YEARS = \"2020\"", FieldError::ReservedName("YEARS".to_string())),
      ("\"NOT-VALID\" = \"\"", FieldError::InvalidName("NOT-VALID".to_string())),
      ("OWNER = \"Acme\\nCorp\"", FieldError::MultilineDefault("OWNER".to_string())),
    ];

    for (field, expected) in cases {
      let config = load_str(&format!("[header.py]\ntemplate = \"x\"\n[header.py.fields]\n{field}\n"))
        .expect("load should succeed");

      match HeaderCatalog::build(&config.definitions()).expect_err("should fail") {
        CatalogError::Field { name, source } => {
          assert_eq!(name, "py");
          assert_eq!(source, expected);
        }
        other => panic!("unexpected error: {other}"),
      }
    }
  }

  #[test]
  fn test_load_normalizes_extensions_to_lowercase() {
    let config = load_str("[header.c]\ntemplate = \"x\"\nextensions = [\"C\", \"H\"]\n").expect("load should succeed");
    let definitions = config.definitions();
    assert_eq!(definitions[0].extensions, vec!["c".to_string(), "h".to_string()]);
  }

  #[test]
  fn test_load_pyproject() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(PYPROJECT_FILENAME);
    std::fs::write(
      &config_path,
      concat!(
        "[project]\n",
        "name = \"example\"\n",
        "\n",
        "[tool.black]\n",
        "line-length = 88\n",
        "\n",
        "[tool.conhead.header.py]\n",
        "template = \"# {{YEARS}}\\n\"\n",
      ),
    )
    .expect("write config");

    let config = Config::load(&config_path).expect("load should succeed");
    assert_eq!(config.header.len(), 1);
    assert!(config.header.contains_key("py"));
  }

  #[test]
  fn test_load_pyproject_without_conhead() {
    let config = Config::from_pyproject_str("[project]\nname = \"example\"\n").expect("should parse");
    assert!(config.is_empty());
  }

  #[test]
  fn test_load_pyproject_rejects_unknown_conhead_keys() {
    let result = Config::from_pyproject_str("[tool.conhead]\nverbose = true\n");
    assert!(result.is_err());
  }

  #[test]
  fn test_load_config_file_not_found() {
    let result = Config::load(Path::new("/nonexistent/path/.conhead.toml"));
    assert!(matches!(result.expect_err("should fail"), ConfigError::Read { .. }));
  }

  #[test]
  fn test_discover_config_explicit_path() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join("custom-config.toml");

    let result = discover_config_path(Some(&config_path), temp_dir.path());

    assert_eq!(result, Some(config_path));
  }

  #[test]
  fn test_discover_config_in_ancestor() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&config_path, "").expect("write config");
    let nested = temp_dir.path().join("src").join("pkg");
    std::fs::create_dir_all(&nested).expect("create dirs");

    let result = discover_config_path(None, &nested);

    assert_eq!(result, Some(config_path));
  }

  #[test]
  fn test_discover_prefers_dedicated_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(PYPROJECT_FILENAME), "").expect("write pyproject");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&config_path, "").expect("write config");

    let result = discover_config_path(None, temp_dir.path());

    assert_eq!(result, Some(config_path));
  }

  #[test]
  fn test_discover_nearest_pyproject_wins() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILENAME), "").expect("write config");
    let nested = temp_dir.path().join("sub");
    std::fs::create_dir(&nested).expect("create dir");
    let pyproject = nested.join(PYPROJECT_FILENAME);
    std::fs::write(&pyproject, "").expect("write pyproject");

    assert_eq!(discover_config_path(None, &nested), Some(pyproject));
  }

  #[test]
  fn test_load_config_none_found() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let result = load_config(None, temp_dir.path()).expect("no error");

    assert!(result.is_none());
  }
}
