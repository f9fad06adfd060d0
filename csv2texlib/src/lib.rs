//! # csv2texlib
//!
//! Turns CSV tables into publication-ready LaTeX tables, driven by a YAML
//! configuration of display names, number formats, sort orders, value
//! replacements, row filters and suffix annotations.
//!
//! ## Overview
//!
//! A conversion is a fixed chain of pure stages:
//!
//! - **Filter**: Hide excluded rows, mark rows left out of minimum detection
//! - **Sort**: Rank-mapped, stable multi-column ordering
//! - **Transform**: Replacements, format codes (`.3f`, `.2e`, `.1%`, `d`) and
//!   suffix marks per cell
//! - **Annotate**: Underline each column's minimum among eligible rows
//! - **Render**: Escape, insert extra columns and emit `hline` or `booktabs`
//!   rules
//!
//! ## Features
//!
//! - **One resolved configuration**: Legacy `model`-only keys are folded into
//!   the generalized sections once; malformed sections fall back to their
//!   defaults with a warning instead of failing the run
//! - **Typed cells**: Every cell is a number or a piece of text, decided at
//!   load time
//! - **Trusted vs. untrusted text**: Configured LaTeX passes through
//!   unescaped, data is always escaped
//! - **Pure Rust data types**: Returns structured data, no I/O side effects
//!   outside the explicit loaders
//!
//! ## Example
//!
//! ```rust
//! use csv2texlib::{convert, Configuration, Table};
//!
//! let table = Table::from_csv_str(
//!     "model,mse\nbase,0.312\ntuned,0.2551\ndebug,0.01\n",
//! ).unwrap();
//! let config = Configuration::from_yaml_str(r#"
//! display_names: {mse: 'MSE $\downarrow$'}
//! column_formats: {mse: .2f}
//! model_order: {tuned: 1, base: 2}
//! ignored_models: [debug]
//! "#).unwrap();
//!
//! let result = convert(&table, &config).unwrap();
//! assert!(result.latex.contains("\\textbf{MSE $\\downarrow$}"));
//! assert!(result.latex.contains("tuned & \\underline{$0.26$} \\\\"));
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod query;

pub use config::{
    ConfigWarning, Configuration, ExtraColumn, FormatKind, FormatSpec, LatexOptions, TableStyle,
};
pub use data::{CellValue, Table};
pub use error::Csv2TexError;
pub use output::{escape_latex, LatexTable};
pub use pipeline::{convert, convert_with, Conversion, ConvertOptions};
pub use query::{DisplayCell, DisplayTable, FilterResult, SortDirection, SortKey, ValueFilter};

/// Result type for csv2texlib operations
pub type Result<T> = std::result::Result<T, Csv2TexError>;
