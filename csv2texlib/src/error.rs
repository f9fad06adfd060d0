//! Error types for csv2texlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a conversion.
///
/// Recoverable problems (a malformed config section, a value the format code
/// cannot render, a rule naming a missing column) never surface here; they
/// are either recorded as [`ConfigWarning`](crate::ConfigWarning)s or handled
/// silently by the stage that meets them.
#[derive(Error, Debug)]
pub enum Csv2TexError {
    /// Failed to read a configuration file
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration text is not valid YAML
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Top-level configuration value is not a mapping
    #[error("configuration must be a mapping at the top level, found {found}")]
    ConfigNotMapping { found: String },

    /// Failed to read a CSV file
    #[error("failed to read CSV '{path}': {source}")]
    CsvRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row does not have one cell per column
    #[error("row {row} has {found} cells, expected {expected}")]
    RowShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A column requested by the caller does not exist in the table
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The caller selected no columns to emit
    #[error("please select at least one column")]
    NoColumns,

    /// An ad-hoc filter expression could not be parsed
    #[error("invalid filter '{expr}': {message}")]
    InvalidFilter { expr: String, message: String },

    /// An ad-hoc sort key could not be parsed
    #[error("invalid sort key '{0}': expected <column>[:asc|:desc]")]
    InvalidSortKey(String),
}
