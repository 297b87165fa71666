//! Parser configuration.
//!
//! Every field has a default, so a partial YAML (or `.json`) file only needs
//! the settings it changes.
//!
//! # Example YAML
//!
//! ```yaml
//! option_prefixes: ["--", "-", "/"]
//! argument_separators: [":", "="]
//! enable_directives: true
//! response_files: true
//! max_response_file_depth: 8
//! enable_posix_bundling: true
//! allow_abbreviations: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or saving a configuration or schema file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_prefixes() -> Vec<String> {
    vec!["--".to_string(), "-".to_string()]
}

fn default_separators() -> Vec<char> {
    vec![':', '=']
}

fn default_true() -> bool {
    true
}

fn default_depth() -> usize {
    8
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Settings that change how input is tokenized and matched.
///
/// # Examples
///
/// ```
/// use command_line_core::ParserConfig;
///
/// let config: ParserConfig = serde_yaml::from_str("allow_abbreviations: false").unwrap();
/// assert!(!config.allow_abbreviations);
/// assert_eq!(config.option_prefixes, vec!["--", "-"]);
/// assert!(config.is_option_like("-x"));
/// assert!(!config.is_option_like("/x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Prefixes that mark a token as option-shaped, longest first.
    #[serde(default = "default_prefixes")]
    pub option_prefixes: Vec<String>,
    /// Characters splitting `-x:value` into an option and its value.
    #[serde(default = "default_separators")]
    pub argument_separators: Vec<char>,
    /// Recognize a leading `[name]` / `[name:value]` sequence.
    #[serde(default = "default_true")]
    pub enable_directives: bool,
    /// Expand `@file` tokens.
    #[serde(default = "default_true")]
    pub response_files: bool,
    /// Maximum nesting of response files.
    #[serde(default = "default_depth")]
    pub max_response_file_depth: usize,
    /// Split `-abc` into `-a -b -c`.
    #[serde(default = "default_true")]
    pub enable_posix_bundling: bool,
    /// Resolve unambiguous alias prefixes (`--verb` for `--verbose`).
    #[serde(default = "default_true")]
    pub allow_abbreviations: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            option_prefixes: default_prefixes(),
            argument_separators: default_separators(),
            enable_directives: true,
            response_files: true,
            max_response_file_depth: default_depth(),
            enable_posix_bundling: true,
            allow_abbreviations: true,
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a file: JSON when the extension is `.json`,
    /// YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`] / [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(config)
    }

    /// Saves configuration to a file, in the format [`ParserConfig::load`]
    /// picks for its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Json`] / [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// The configured prefix `token` starts with, longest match first.
    pub fn option_prefix<'a>(&'a self, token: &str) -> Option<&'a str> {
        self.option_prefixes
            .iter()
            .filter(|p| !p.is_empty() && token.starts_with(p.as_str()))
            .max_by_key(|p| p.len())
            .map(String::as_str)
    }

    /// A prefix followed by at least one non-whitespace character.
    pub fn is_option_like(&self, token: &str) -> bool {
        self.option_prefix(token).is_some_and(|prefix| {
            token[prefix.len()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.argument_separators, vec![':', '=']);
        assert_eq!(config.max_response_file_depth, 8);
        assert!(config.enable_directives);
        assert!(config.enable_posix_bundling);
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: ParserConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.yml");
        let config = ParserConfig {
            option_prefixes: vec!["--".into(), "-".into(), "/".into()],
            allow_abbreviations: false,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ParserConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_json_config_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.json");
        let config = ParserConfig {
            enable_directives: false,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('{'));
        assert_eq!(ParserConfig::load(&path).unwrap(), config);

        std::fs::write(&path, "enable_directives: false").unwrap();
        let err = ParserConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ParserConfig::load("/nonexistent/parser.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_option_prefix_prefers_longest() {
        let config = ParserConfig::default();
        assert_eq!(config.option_prefix("--verbose"), Some("--"));
        assert_eq!(config.option_prefix("-v"), Some("-"));
        assert_eq!(config.option_prefix("verbose"), None);
        assert!(!config.is_option_like("-"));
        assert!(config.is_option_like("--"));
    }
}
