//! Row ordering.
//!
//! Rows are ordered by the configured sort columns, primary first. Within a
//! column, values with a configured rank come first, in rank order; the rest
//! follow in natural order. Natural order is numeric when every unranked
//! value in the column is a number and textual otherwise, so the comparison
//! stays a total order on mixed columns.
//!
//! All sorts are stable: rows that compare equal keep their relative order.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::config::Configuration;
use crate::data::{CellValue, Table};
use crate::error::Csv2TexError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// An ad-hoc sort key, applied on top of the configured ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// Sort by a column, smallest first
    pub fn ascending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Sort by a column, largest first
    pub fn descending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

impl FromStr for SortKey {
    type Err = Csv2TexError;

    /// Parse `<column>` or `<column>:asc` / `<column>:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Csv2TexError::InvalidSortKey(s.to_string());
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, dir)) => (
                column,
                dir.trim()
                    .parse::<SortDirection>()
                    .map_err(|_| invalid())?,
            ),
            None => (s, SortDirection::Ascending),
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(invalid());
        }
        Ok(SortKey {
            column: column.to_string(),
            direction,
        })
    }
}

/// Per-row sort key for one column.
#[derive(Debug)]
enum Key<'a> {
    Ranked(i64),
    Number(f64),
    Text(Cow<'a, str>),
}

fn compare(a: &Key, b: &Key) -> Ordering {
    match (a, b) {
        (Key::Ranked(x), Key::Ranked(y)) => x.cmp(y),
        (Key::Ranked(_), _) => Ordering::Less,
        (_, Key::Ranked(_)) => Ordering::Greater,
        (Key::Number(x), Key::Number(y)) => x.total_cmp(y),
        (Key::Text(x), Key::Text(y)) => x.cmp(y),
        // Never produced for the same column
        (Key::Number(_), Key::Text(_)) => Ordering::Less,
        (Key::Text(_), Key::Number(_)) => Ordering::Greater,
    }
}

/// Build one key per row for a column, using `rank` where it gives one.
fn column_keys<'a>(
    table: &'a Table,
    col: usize,
    rank: impl Fn(&CellValue) -> Option<i64>,
) -> Vec<Key<'a>> {
    let ranks: Vec<Option<i64>> = table.rows().iter().map(|r| rank(&r[col])).collect();
    let numeric = table
        .rows()
        .iter()
        .zip(&ranks)
        .filter(|(_, rank)| rank.is_none())
        .all(|(r, _)| r[col].is_number());

    table
        .rows()
        .iter()
        .zip(ranks)
        .map(|(r, rank)| match (rank, &r[col]) {
            (Some(rank), _) => Key::Ranked(rank),
            (None, CellValue::Number(n)) if numeric => Key::Number(*n),
            (None, cell) => Key::Text(cell.as_text()),
        })
        .collect()
}

/// Row order under the configured sort columns, as original indices.
///
/// Sort columns missing from the table are skipped. With no usable sort
/// columns this is the identity permutation.
pub fn sort_order(table: &Table, config: &Configuration) -> Vec<usize> {
    let keys: Vec<Vec<Key>> = config
        .sort_columns()
        .iter()
        .filter_map(|column| match table.column_index(column) {
            Some(col) => Some(column_keys(table, col, |cell| config.sort_rank(column, cell))),
            None => {
                tracing::trace!(column = %column, "sort column not in table, skipped");
                None
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    if !keys.is_empty() {
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|k| compare(&k[a], &k[b]))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
    order
}

/// Row order under ad-hoc sort keys, as original indices.
///
/// Keys are applied to `table` as it stands; no rank mapping is used.
pub fn sort_order_by_keys(table: &Table, sort_keys: &[SortKey]) -> Vec<usize> {
    let keys: Vec<(SortDirection, Vec<Key>)> = sort_keys
        .iter()
        .filter_map(|key| match table.column_index(&key.column) {
            Some(col) => Some((key.direction, column_keys(table, col, |_| None))),
            None => {
                tracing::trace!(column = %key.column, "sort column not in table, skipped");
                None
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    if !keys.is_empty() {
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|(direction, k)| match direction {
                    SortDirection::Ascending => compare(&k[a], &k[b]),
                    SortDirection::Descending => compare(&k[b], &k[a]),
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
    order
}

/// Sort a table by its configured sort columns.
pub fn sort(table: &Table, config: &Configuration) -> Table {
    table.select_rows(&sort_order(table, config))
}

/// Sort a table by its configured sort columns, then stably by `keys`.
///
/// The ad-hoc keys take priority; rows they consider equal keep the
/// configured order.
pub fn sort_with(table: &Table, config: &Configuration, keys: &[SortKey]) -> Table {
    let sorted = sort(table, config);
    if keys.is_empty() {
        return sorted;
    }
    sorted.select_rows(&sort_order_by_keys(&sorted, keys))
}
