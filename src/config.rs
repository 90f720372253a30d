//! Pipeline description (`shaping.toml`) parsing.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::processor::{
    aggregator::Aggregation,
    normalizer::{CategoryRule, RuleSet},
    table::LoaderOptions,
};

/// Errors that can occur when reading a pipeline description.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config at {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// A parsed pipeline description.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapingConfig {
    /// Where the table comes from.
    pub source: SourceSection,

    /// Normalization steps, applied in order.
    #[serde(default)]
    pub normalize: Vec<NormalizeSection>,

    /// Optional grouped summary over the shaped table.
    #[serde(default)]
    pub aggregate: Option<AggregateSection>,
}

/// The `[source]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Delimited text file; relative paths resolve against the config file.
    pub path: PathBuf,

    /// Single-character field separator (default: `,`).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Columns kept as text.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Columns that must be numeric.
    #[serde(default)]
    pub measurements: Vec<String>,
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// One `[[normalize]]` step.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeSection {
    /// Raw column to read labels from.
    pub column: String,

    /// Name of the derived column.
    pub output: String,

    /// Label for values no rule claims (default: `Unknown`).
    #[serde(default = "default_label")]
    pub default: String,

    #[serde(default)]
    pub ignore_case: bool,

    #[serde(default)]
    pub trim: bool,

    #[serde(default)]
    pub rules: Vec<CategoryRule>,
}

fn default_label() -> String {
    "Unknown".to_string()
}

impl NormalizeSection {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(self.rules.clone(), self.default.clone())
            .ignore_case(self.ignore_case)
            .trim(self.trim)
    }
}

/// The `[aggregate]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateSection {
    pub group_by: Vec<String>,
    pub stats: Vec<Aggregation>,
}

impl SourceSection {
    /// Loader settings for this source.
    ///
    /// Only valid after [`ShapingConfig::validate`] has checked the delimiter.
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            delimiter: self.delimiter.as_bytes().first().copied().unwrap_or(b','),
            categories: self.categories.clone(),
            measurements: self.measurements.clone(),
        }
    }
}

impl ShapingConfig {
    /// Load a pipeline description from a file path.
    ///
    /// A relative `source.path` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: e,
        })?;

        let mut config = Self::from_str(&content, path)?;
        if config.source.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.source.path = dir.join(&config.source.path);
            }
        }
        Ok(config)
    }

    /// Parse a pipeline description from a string.
    pub fn from_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ShapingConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_owned(),
            message,
        };

        let delim = self.source.delimiter.as_bytes();
        if delim.len() != 1
            || !delim[0].is_ascii()
            || matches!(delim[0], b'"' | b'\n' | b'\r')
        {
            return Err(invalid(format!(
                "delimiter must be one ASCII character other than a quote or line break, got {:?}",
                self.source.delimiter
            )));
        }

        for step in &self.normalize {
            if step.output.is_empty() {
                return Err(invalid(format!(
                    "normalize step for '{}' has an empty output name",
                    step.column
                )));
            }
            if step.default.is_empty() {
                return Err(invalid(format!(
                    "normalize step for '{}' has an empty default label",
                    step.column
                )));
            }
            if step.rules.iter().any(|r| r.label.is_empty()) {
                return Err(invalid(format!(
                    "normalize step for '{}' has a rule with an empty label",
                    step.column
                )));
            }
        }

        if let Some(agg) = &self.aggregate {
            if agg.group_by.is_empty() {
                return Err(invalid("aggregate.group_by must not be empty".into()));
            }
            if agg.stats.is_empty() {
                return Err(invalid("aggregate.stats must not be empty".into()));
            }
        }
        Ok(())
    }
}
