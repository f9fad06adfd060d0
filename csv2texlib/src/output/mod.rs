//! Output formatting: present display tables as LaTeX.
//!
//! This module handles the final stage of the pipeline. It provides:
//!
//! - **escape_latex**: Literal-safe escaping for untrusted text
//! - **LatexTable**: Header and body cells with markup applied, plus the
//!   rule style and layout options needed to emit the `table` float
//!
//! ## Example
//!
//! ```rust
//! use csv2texlib::output::render;
//! use csv2texlib::query::transform;
//! use csv2texlib::{Configuration, Table};
//!
//! let table = Table::from_csv_str("model,mse\nbase,0.25\n").unwrap();
//! let config = Configuration::default();
//! let latex = render(&transform(&table, &config), &config);
//! assert!(latex.contains("base & $0.250$ \\\\"));
//! ```

pub mod escape;
pub mod latex;

pub use escape::escape_latex;
pub use latex::{latex_cell, latex_header, render, LatexTable};
