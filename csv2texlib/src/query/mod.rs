//! Query processing: filter, sort, transform and annotate rows.
//!
//! This module handles the middle stages of the pipeline, between a loaded
//! [`Table`](crate::Table) and the LaTeX text. It provides:
//!
//! - **filter**: Which rows are shown and which count towards minima
//! - **sort**: Rank-mapped, stable multi-column ordering
//! - **transform**: Replacements, format codes and suffix marks per cell
//! - **minima**: Per-column minimum detection for underlining
//!
//! ## Example
//!
//! ```rust
//! use csv2texlib::query::{filter, sort, transform};
//! use csv2texlib::{Configuration, Table};
//!
//! let table = Table::from_csv_str("model,mse\nb,0.2\na,0.1\n").unwrap();
//! let config = Configuration::from_yaml_str("model_order: {a: 1, b: 2}\n").unwrap();
//!
//! let visible = table.select_rows(&filter(&table, &config).visible);
//! let display = transform(&sort(&visible, &config), &config);
//! assert_eq!(display.display_rows()[0], vec!["a", "0.100"]);
//! ```

pub mod filter;
pub mod minima;
pub mod sort;
pub mod transform;

pub use filter::{filter, filter_with, FilterResult, ValueFilter};
pub use minima::{annotate, annotate_with, Minima};
pub use sort::{sort, sort_order, sort_order_by_keys, sort_with, SortDirection, SortKey};
pub use transform::{
    column_header, match_suffix, transform, transform_cell, transform_with, DisplayCell,
    DisplayColumn, DisplayRow, DisplayTable,
};
