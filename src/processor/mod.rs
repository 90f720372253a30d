use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub mod aggregator;
pub mod column;
pub mod export;
pub mod normalizer;
pub mod table;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The delimited source is missing, unreadable or malformed.
    #[error("data source {}: {message}", path.display())]
    DataSource { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' must be {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("Sum of column '{column}' overflows i64")]
    SumOverflow { column: String },

    #[error("Schema/parse error: {0}")]
    Parse(String),
}

impl ProcessorError {
    pub(crate) fn data_source(path: &std::path::Path, message: impl Into<String>) -> Self {
        ProcessorError::DataSource {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// A single cell, owned
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer column
    Int(i64),
    /// Float column
    Float(f64),
    /// String column
    Str(String),
}

impl Value {
    /// Numeric view of the value, `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Per-group statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Arithmetic mean of a numeric column
    #[serde(alias = "avg", alias = "average")]
    Mean,
    /// Number of records in the group
    Count,
    /// Sum of a numeric column
    Sum,
}

impl AggregateOp {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOp::Mean => "mean",
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateResult {
    Int(i64),
    Float(f64),
}

impl AggregateResult {
    pub fn as_f64(&self) -> f64 {
        match self {
            AggregateResult::Int(v) => *v as f64,
            AggregateResult::Float(v) => *v,
        }
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateResult::Int(v) => write!(f, "{v}"),
            AggregateResult::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_names_accept_aliases() {
        #[derive(Deserialize)]
        struct Wrap {
            op: AggregateOp,
        }

        let w: Wrap = toml::from_str("op = \"avg\"").unwrap();
        assert_eq!(w.op, AggregateOp::Mean);
        let w: Wrap = toml::from_str("op = \"count\"").unwrap();
        assert_eq!(w.op, AggregateOp::Count);
        assert!(toml::from_str::<Wrap>("op = \"median\"").is_err());
    }

    #[test]
    fn data_source_error_mentions_path() {
        let err = ProcessorError::data_source(std::path::Path::new("plants.csv"), "no data rows");
        assert_eq!(err.to_string(), "data source plants.csv: no data rows");
    }
}
