//! Value transformation: raw cells to display cells.
//!
//! Per cell, in order:
//! 1. An exact `value_replacements` hit replaces the value. The replacement
//!    is trusted LaTeX and final: no format code or suffix rule touches it.
//! 2. Otherwise the value is rendered with the column's format code (text
//!    cells come through verbatim).
//! 3. If the rendered text ends with a configured suffix, that suffix's LaTeX
//!    mark is attached. The longest matching suffix wins; ties go to the
//!    rule declared first.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::{prettify_column_name, render_cell, Configuration, SuffixRule};
use crate::data::{CellValue, Table};

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayColumn {
    /// Column key in the source table
    pub key: String,
    /// Header text
    pub header: String,
    /// Header came from configuration and is emitted as raw LaTeX
    pub header_is_latex: bool,
}

/// A cell ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    /// Rendered value or replacement text
    pub text: String,
    /// `text` is a configured replacement and is emitted as raw LaTeX
    pub is_latex: bool,
    /// `text` is a formatted number
    pub numeric: bool,
    /// LaTeX appended right after `text`
    pub suffix_mark: Option<String>,
    /// Cell holds its column's minimum
    pub is_min: bool,
}

impl DisplayCell {
    /// Text with its suffix mark, as shown in a preview.
    pub fn display(&self) -> String {
        match &self.suffix_mark {
            Some(mark) => format!("{}{}", self.text, mark),
            None => self.text.clone(),
        }
    }
}

/// A row of display cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// Index of the row this one was built from
    pub source: usize,
    pub cells: Vec<DisplayCell>,
}

/// A table whose cells hold final display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<DisplayColumn>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    /// Position of a column by key
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Preview strings, row by row.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(DisplayCell::display).collect())
            .collect()
    }

    /// Keep only the named columns, in the given order. Unknown keys are
    /// skipped.
    pub fn select_columns(&self, keys: &[String]) -> DisplayTable {
        let picked: Vec<usize> = keys.iter().filter_map(|k| self.column_index(k)).collect();
        DisplayTable {
            columns: picked.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| DisplayRow {
                    source: r.source,
                    cells: picked.iter().map(|&i| r.cells[i].clone()).collect(),
                })
                .collect(),
        }
    }

    /// Set `is_min` on every cell named by `minima` (column key to source
    /// row indices).
    pub fn mark_minima(&mut self, minima: &IndexMap<String, BTreeSet<usize>>) {
        let marks: Vec<(usize, &BTreeSet<usize>)> = minima
            .iter()
            .filter_map(|(key, rows)| self.column_index(key).map(|col| (col, rows)))
            .collect();
        for row in &mut self.rows {
            for (col, rows) in &marks {
                if rows.contains(&row.source) {
                    row.cells[*col].is_min = true;
                }
            }
        }
    }
}

/// Header for a column: its configured display name, or the prettified key.
pub fn column_header(key: &str, config: &Configuration) -> DisplayColumn {
    match config.display_name(key) {
        Some(name) => DisplayColumn {
            key: key.to_string(),
            header: name.to_string(),
            header_is_latex: true,
        },
        None => DisplayColumn {
            key: key.to_string(),
            header: prettify_column_name(key),
            header_is_latex: false,
        },
    }
}

/// Pick the suffix rule for a rendered value.
pub fn match_suffix<'a>(rendered: &str, rules: &'a [SuffixRule]) -> Option<&'a SuffixRule> {
    rules
        .iter()
        .filter(|r| !r.suffix.is_empty() && rendered.ends_with(r.suffix.as_str()))
        // max_by_key keeps the last maximum, so walk the rules backwards
        .rev()
        .max_by_key(|r| r.suffix.len())
}

/// Transform one cell of column `column`.
pub fn transform_cell(
    column: &str,
    cell: &CellValue,
    config: &Configuration,
    default_decimals: usize,
) -> DisplayCell {
    if let Some(replacement) = config.replacement(column, cell) {
        return DisplayCell {
            text: replacement.to_string(),
            is_latex: true,
            numeric: false,
            suffix_mark: None,
            is_min: false,
        };
    }

    let text = render_cell(cell, config.column_format(column), default_decimals);
    let suffix_mark = match_suffix(&text, config.suffix_rules(column)).map(|r| r.latex.clone());
    DisplayCell {
        numeric: cell.as_number().is_some_and(f64::is_finite),
        text,
        is_latex: false,
        suffix_mark,
        is_min: false,
    }
}

/// Transform every cell of a table, using the configured default decimals.
pub fn transform(table: &Table, config: &Configuration) -> DisplayTable {
    transform_with(table, config, config.default_decimal_places())
}

/// Transform every cell of a table with an explicit default precision.
///
/// `DisplayRow::source` is the row's index in `table`.
pub fn transform_with(table: &Table, config: &Configuration, default_decimals: usize) -> DisplayTable {
    let columns: Vec<DisplayColumn> = table
        .columns()
        .iter()
        .map(|key| column_header(key, config))
        .collect();

    let rows = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| DisplayRow {
            source: i,
            cells: table
                .columns()
                .iter()
                .zip(row)
                .map(|(key, cell)| transform_cell(key, cell, config, default_decimals))
                .collect(),
        })
        .collect();

    DisplayTable { columns, rows }
}
