//! Configuration: format codes, the resolved model and its loaders.
//!
//! This module turns a YAML document into the single read-only
//! [`Configuration`] every later stage consults. It provides:
//!
//! - **FormatSpec**: Parsed numeric format codes (`.3f`, `.2e`, `.1%`, `d`)
//! - **Configuration**: Merged generalized and legacy sections with defaults
//! - **ConfigWarning**: Recoverable problems found while resolving
//!
//! ## Example
//!
//! ```rust
//! use csv2texlib::{CellValue, Configuration};
//!
//! let config = Configuration::from_yaml_str(r#"
//! model_order: {base: 2, tuned: 1}
//! latex_model_names: {tuned: "Tuned$^*$"}
//! "#).unwrap();
//!
//! assert_eq!(config.sort_columns(), &["model"]);
//! assert_eq!(config.replacement("model", &CellValue::text("tuned")), Some("Tuned$^*$"));
//! ```

pub mod format;
pub mod loader;
pub mod model;
pub mod resolve;

pub use format::{render_cell, FormatKind, FormatSpec};
pub use model::{
    prettify_column_name, ConfigWarning, Configuration, ExtraColumn, FilterRules, LatexOptions,
    SortConfig, SuffixRule, TableStyle, ValueMatcher,
};
pub use resolve::LEGACY_COLUMN;
