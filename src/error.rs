//! Error types for run parsing, aggregation and label resolution.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by the aggregation core.
///
/// Nothing here is retried or skipped internally: a directory either
/// aggregates completely or not at all.
#[derive(Debug, Error)]
pub enum DataError {
    /// Malformed header or a non-numeric / wrongly sized row.
    #[error("{}{}: {message}", .path.display(), line_suffix(.line))]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number, when known
        line: Option<u64>,
        message: String,
    },

    /// Runs in one directory disagree on the generation count of a quantity.
    #[error(
        "shape mismatch in '{label}' for quantity '{quantity}': expected {expected} generations, {} has {found}",
        .path.display()
    )]
    Shape {
        label: String,
        quantity: String,
        expected: usize,
        found: usize,
        /// First run file that disagreed
        path: PathBuf,
    },

    /// Query for a configuration, quantity or statistic that was never aggregated.
    #[error("not found: {0}")]
    NotFound(String),

    /// Two distinct directories resolved to the same short label.
    #[error(
        "ambiguous label '{label}' for {} and {}",
        .first.display(),
        .second.display()
    )]
    AmbiguousLabel {
        label: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Reading a directory or run file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DataError {
    /// Create a Parse error.
    pub fn parse(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an Io error.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Missing (label, quantity, statistic) combination.
    pub fn series_not_found(label: &str, quantity: &str, statistic: &str) -> Self {
        Self::NotFound(format!(
            "no '{statistic}' series for quantity '{quantity}' in configuration '{label}'"
        ))
    }

    /// Label that was never resolved or aggregated.
    pub fn configuration_not_found(label: &str) -> Self {
        Self::NotFound(format!("unknown configuration '{label}'"))
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(":{l}")).unwrap_or_default()
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;
