//! Raw data: tagged cell values and tables.
//!
//! This module handles the first stage of the pipeline - holding the dataset
//! exactly as it was read. It provides:
//!
//! - **CellValue**: A number or a piece of text, decided once at load time
//! - **Table**: Named columns with row-aligned cells, CSV loading and stacking
//!
//! ## Example
//!
//! ```rust
//! use csv2texlib::{CellValue, Table};
//!
//! let table = Table::from_csv_str("model,mse\nbase,0.25\n").unwrap();
//! assert_eq!(table.cell(0, "mse"), Some(&CellValue::Number(0.25)));
//! ```

pub mod table;
pub mod value;

pub use table::Table;
pub use value::CellValue;
