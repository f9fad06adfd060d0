//! In-memory tables of named columns.
//!
//! A [`Table`] is the dataset every stage consumes. Stages never mutate a
//! table in place; anything that reorders or drops rows builds a new one.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::value::CellValue;
use crate::error::Csv2TexError;
use crate::Result;

/// Named columns with row-aligned cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and rows, checking every row's width.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Csv2TexError::RowShape {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at a row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Iterate over `(row_index, cell)` for one column.
    ///
    /// Returns `None` if the column does not exist.
    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = (usize, &'a CellValue)> + 'a> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().enumerate().map(move |(i, r)| (i, &r[col])))
    }

    /// Build a new table holding the given rows, in the given order.
    ///
    /// Out-of-range indices are skipped.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Read a table from CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut table = Table::new(headers);

        for record in csv_reader.records() {
            let record = record?;
            let row = record.iter().map(CellValue::parse).collect();
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Read a table from CSV text.
    pub fn from_csv_str(text: &str) -> Result<Table> {
        Self::from_csv_reader(text.as_bytes())
    }

    /// Read a table from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Csv2TexError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_csv_reader(file)
    }

    /// Stack several tables vertically.
    ///
    /// The result has the union of all columns in first-seen order. Cells for
    /// columns a source table lacks are empty text.
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
        let tables: Vec<Table> = tables.into_iter().collect();

        let columns: IndexSet<String> = tables
            .iter()
            .flat_map(|t| t.columns.iter().cloned())
            .collect();

        let mut rows = Vec::new();
        for table in &tables {
            let mapping: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for row in &table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|m| m.map(|i| row[i].clone()).unwrap_or_default())
                        .collect(),
                );
            }
        }

        Table {
            columns: columns.into_iter().collect(),
            rows,
        }
    }
}
