//! Minimum detection.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use super::filter::FilterResult;
use crate::config::Configuration;
use crate::data::Table;

/// Rows holding each column's minimum, by column key.
///
/// Columns without an entry get no underline.
pub type Minima = IndexMap<String, BTreeSet<usize>>;

/// Find, per column with underlining enabled, the rows holding the smallest
/// raw number among rows that are visible and not calc-excluded.
///
/// Every row equal to the minimum is marked, so ties mark several rows. Text
/// and NaN cells are ignored; a column with no eligible number gets no entry.
/// Row indices refer to `table`.
pub fn annotate(table: &Table, filtered: &FilterResult, config: &Configuration) -> Minima {
    annotate_with(table, filtered, |column| config.underline_enabled(column))
}

/// Like [`annotate`], with the per-column underline switch supplied by the
/// caller.
pub fn annotate_with(
    table: &Table,
    filtered: &FilterResult,
    underline: impl Fn(&str) -> bool,
) -> Minima {
    let eligible: Vec<usize> = filtered.eligible().collect();
    let mut minima = Minima::new();

    for (col, column) in table.columns().iter().enumerate() {
        if !underline(column) {
            continue;
        }

        let values: Vec<(usize, f64)> = eligible
            .iter()
            .filter_map(|&i| {
                let n = table.rows().get(i)?[col].as_number()?;
                (!n.is_nan()).then_some((i, n))
            })
            .collect();

        let Some(min) = values.iter().map(|(_, n)| *n).reduce(f64::min) else {
            continue;
        };
        let rows: BTreeSet<usize> = values
            .iter()
            .filter(|(_, n)| *n == min)
            .map(|(i, _)| *i)
            .collect();

        tracing::trace!(column = %column, min, marked = rows.len(), "column minimum");
        minima.insert(column.clone(), rows);
    }

    minima
}
