//! Row filtering.
//!
//! Decides, per row, whether it is shown and whether it takes part in
//! minimum detection. Rows are never removed here; the result is a pair of
//! index sets over the input table so later stages can still refer to the
//! original row positions.

use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::config::{Configuration, ValueMatcher};
use crate::data::{CellValue, Table};
use crate::error::Csv2TexError;

/// Outcome of filtering a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    /// Shown rows, ascending original indices
    pub visible: Vec<usize>,
    /// Rows left out of minimum detection; always includes every hidden row
    pub excluded_from_calc: BTreeSet<usize>,
}

impl FilterResult {
    /// Check if a row is shown
    pub fn is_visible(&self, row: usize) -> bool {
        self.visible.binary_search(&row).is_ok()
    }

    /// Check if a row takes part in minimum detection
    pub fn is_eligible(&self, row: usize) -> bool {
        self.is_visible(row) && !self.excluded_from_calc.contains(&row)
    }

    /// Shown rows that take part in minimum detection, ascending
    pub fn eligible(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .copied()
            .filter(|r| !self.excluded_from_calc.contains(r))
    }
}

/// An ad-hoc condition on one column. Rows failing it are hidden.
///
/// Parsed from `<column><op><value>`:
///
/// | Text          | Filter                                  |
/// |---------------|-----------------------------------------|
/// | `mse=0.1..0.5`| `Range` (inclusive on both ends)        |
/// | `model=base`  | `EqualTo` (also `==`)                   |
/// | `mse>0.1`     | `GreaterThan`                           |
/// | `mse<0.1`     | `LessThan`                              |
/// | `mse>=0.1`    | `Range` from `0.1` up                   |
/// | `mse<=0.1`    | `Range` up to `0.1`                     |
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueFilter {
    Range { column: String, min: f64, max: f64 },
    EqualTo { column: String, value: String },
    GreaterThan { column: String, value: f64 },
    LessThan { column: String, value: f64 },
}

impl ValueFilter {
    /// Column the filter applies to
    pub fn column(&self) -> &str {
        match self {
            ValueFilter::Range { column, .. }
            | ValueFilter::EqualTo { column, .. }
            | ValueFilter::GreaterThan { column, .. }
            | ValueFilter::LessThan { column, .. } => column,
        }
    }

    /// Check a cell. Numeric conditions never accept text cells.
    pub fn accepts(&self, cell: &CellValue) -> bool {
        match self {
            ValueFilter::EqualTo { value, .. } => {
                let numeric_eq = match (cell.as_number(), value.trim().parse::<f64>()) {
                    (Some(n), Ok(v)) => n == v,
                    _ => false,
                };
                numeric_eq || cell.lookup_keys().iter().any(|k| k == value)
            }
            ValueFilter::Range { min, max, .. } => {
                cell.as_number().is_some_and(|n| *min <= n && n <= *max)
            }
            ValueFilter::GreaterThan { value, .. } => cell.as_number().is_some_and(|n| n > *value),
            ValueFilter::LessThan { value, .. } => cell.as_number().is_some_and(|n| n < *value),
        }
    }
}

impl FromStr for ValueFilter {
    type Err = Csv2TexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| Csv2TexError::InvalidFilter {
            expr: s.to_string(),
            message: message.to_string(),
        };

        let op_start = s
            .find(['<', '>', '='])
            .ok_or_else(|| invalid("expected one of =, ==, <, <=, >, >="))?;
        let column = s[..op_start].trim();
        if column.is_empty() {
            return Err(invalid("missing column name"));
        }

        let rest = &s[op_start..];
        let (op, value) = ["==", ">=", "<=", "=", ">", "<"]
            .iter()
            .find_map(|op| rest.strip_prefix(op).map(|v| (*op, v.trim())))
            .ok_or_else(|| invalid("expected one of =, ==, <, <=, >, >="))?;
        if value.is_empty() {
            return Err(invalid("missing value"));
        }

        let number = |text: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|_| invalid(&format!("'{}' is not a number", text.trim())))
        };
        let column = column.to_string();

        let filter = match op {
            "=" | "==" => match value.split_once("..") {
                Some((lo, hi)) => {
                    let (min, max) = (number(lo)?, number(hi)?);
                    if min > max {
                        return Err(invalid("range start is greater than its end"));
                    }
                    ValueFilter::Range { column, min, max }
                }
                None => ValueFilter::EqualTo {
                    column,
                    value: value.to_string(),
                },
            },
            ">" => ValueFilter::GreaterThan {
                column,
                value: number(value)?,
            },
            "<" => ValueFilter::LessThan {
                column,
                value: number(value)?,
            },
            ">=" => ValueFilter::Range {
                column,
                min: number(value)?,
                max: f64::INFINITY,
            },
            _ => ValueFilter::Range {
                column,
                min: f64::NEG_INFINITY,
                max: number(value)?,
            },
        };
        Ok(filter)
    }
}

/// Filter a table by its configured exclusion rules.
pub fn filter(table: &Table, config: &Configuration) -> FilterResult {
    filter_with(table, config, &[])
}

/// Filter a table by its configured exclusion rules and extra ad-hoc
/// conditions.
///
/// A row is hidden if any configured `exclude_values` rule matches it or any
/// ad-hoc condition rejects it. Rules naming columns the table lacks are
/// skipped.
pub fn filter_with(table: &Table, config: &Configuration, extra: &[ValueFilter]) -> FilterResult {
    let hide_rules = bind_rules(table, config.exclude_values());
    let calc_rules = bind_rules(table, config.exclude_from_calculations());
    let conditions: Vec<(usize, &ValueFilter)> = extra
        .iter()
        .filter_map(|f| match table.column_index(f.column()) {
            Some(col) => Some((col, f)),
            None => {
                tracing::trace!(column = f.column(), "filter column not in table, skipped");
                None
            }
        })
        .collect();

    let mut result = FilterResult::default();
    for (i, row) in table.rows().iter().enumerate() {
        let hidden = any_rule_matches(&hide_rules, row)
            || conditions.iter().any(|(col, f)| !f.accepts(&row[*col]));
        if hidden {
            result.excluded_from_calc.insert(i);
            continue;
        }
        result.visible.push(i);
        if any_rule_matches(&calc_rules, row) {
            result.excluded_from_calc.insert(i);
        }
    }

    tracing::debug!(
        rows = table.row_count(),
        visible = result.visible.len(),
        excluded_from_calc = result.excluded_from_calc.len(),
        "filtered rows"
    );
    result
}

/// Resolve rule columns to indices, dropping columns the table lacks.
fn bind_rules<'a>(
    table: &Table,
    rules: &'a IndexMap<String, Vec<ValueMatcher>>,
) -> Vec<(usize, &'a [ValueMatcher])> {
    rules
        .iter()
        .filter_map(|(column, matchers)| match table.column_index(column) {
            Some(col) => Some((col, matchers.as_slice())),
            None => {
                tracing::trace!(column = %column, "filter column not in table, skipped");
                None
            }
        })
        .collect()
}

fn any_rule_matches(rules: &[(usize, &[ValueMatcher])], row: &[CellValue]) -> bool {
    rules
        .iter()
        .any(|(col, matchers)| matchers.iter().any(|m| m.matches_cell(&row[*col])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_csv_str(
            "model,cluster,mse\n\
             base,0,0.30\n\
             debug-small,1,0.10\n\
             tuned,2,0.20\n\
             baseline-x,3,0.05\n",
        )
        .unwrap()
    }

    #[test]
    fn test_no_rules_shows_everything() {
        let result = filter(&table(), &Configuration::default());
        assert_eq!(result.visible, vec![0, 1, 2, 3]);
        assert!(result.excluded_from_calc.is_empty());
    }

    #[test]
    fn test_hidden_rows_are_calc_excluded() {
        let config = Configuration::from_yaml_str(
            "row_filtering:\n  exclude_values:\n    model: [\"debug-*\"]\n",
        )
        .unwrap();
        let result = filter(&table(), &config);
        assert_eq!(result.visible, vec![0, 2, 3]);
        assert_eq!(result.excluded_from_calc, BTreeSet::from([1]));
        assert!(!result.is_visible(1));
        assert!(!result.is_eligible(1));
    }

    #[test]
    fn test_calc_exclusion_keeps_row_visible() {
        let config = Configuration::from_yaml_str(
            "row_filtering:\n  exclude_from_calculations:\n    model: [\"baseline-*\"]\n",
        )
        .unwrap();
        let result = filter(&table(), &config);
        assert_eq!(result.visible, vec![0, 1, 2, 3]);
        assert!(result.is_visible(3));
        assert!(!result.is_eligible(3));
        assert_eq!(result.eligible().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_glob_does_not_match_substrings() {
        let config = Configuration::from_yaml_str(
            "row_filtering:\n  exclude_values:\n    model: [\"base\"]\n",
        )
        .unwrap();
        let result = filter(&table(), &config);
        assert_eq!(result.visible, vec![1, 2, 3]);
    }

    #[test]
    fn test_numeric_cells_match_textual_rules() {
        let config = Configuration::from_yaml_str(
            "row_filtering:\n  exclude_values:\n    cluster: [\"2\", 3.0]\n",
        )
        .unwrap();
        let result = filter(&table(), &config);
        assert_eq!(result.visible, vec![0, 1]);
    }

    #[test]
    fn test_missing_column_rule_ignored() {
        let config = Configuration::from_yaml_str(
            "row_filtering:\n  exclude_values:\n    dataset: [\"*\"]\n",
        )
        .unwrap();
        let result = filter(&table(), &config);
        assert_eq!(result.visible.len(), 4);
    }

    #[test]
    fn test_value_filter_parse() {
        assert_eq!(
            "mse>0.1".parse::<ValueFilter>().unwrap(),
            ValueFilter::GreaterThan {
                column: "mse".into(),
                value: 0.1
            }
        );
        assert_eq!(
            " model == base ".parse::<ValueFilter>().unwrap(),
            ValueFilter::EqualTo {
                column: "model".into(),
                value: "base".into()
            }
        );
        assert_eq!(
            "mse=0.1..0.3".parse::<ValueFilter>().unwrap(),
            ValueFilter::Range {
                column: "mse".into(),
                min: 0.1,
                max: 0.3
            }
        );
        assert_eq!(
            "mse<=0.2".parse::<ValueFilter>().unwrap(),
            ValueFilter::Range {
                column: "mse".into(),
                min: f64::NEG_INFINITY,
                max: 0.2
            }
        );
    }

    #[test]
    fn test_value_filter_parse_errors() {
        for expr in ["mse", "=1", "mse>", "mse>abc", "mse=0.5..0.1", "mse=a..b"] {
            let err = expr.parse::<ValueFilter>().unwrap_err();
            assert!(matches!(err, Csv2TexError::InvalidFilter { .. }), "{expr}");
        }
    }

    #[test]
    fn test_ad_hoc_filters_hide_rows() {
        let filters = vec![
            "mse<0.25".parse::<ValueFilter>().unwrap(),
            "cluster>=1".parse::<ValueFilter>().unwrap(),
        ];
        let result = filter_with(&table(), &Configuration::default(), &filters);
        assert_eq!(result.visible, vec![1, 2, 3]);
        assert_eq!(result.excluded_from_calc, BTreeSet::from([0]));
    }

    #[test]
    fn test_equal_to_matches_numbers_and_text() {
        let two: ValueFilter = "cluster=2.0".parse().unwrap();
        assert!(two.accepts(&CellValue::number(2.0)));
        assert!(!two.accepts(&CellValue::number(3.0)));

        let base: ValueFilter = "model=base".parse().unwrap();
        assert!(base.accepts(&CellValue::text("base")));
        assert!(!base.accepts(&CellValue::text("base-2")));

        let gt: ValueFilter = "model>1".parse().unwrap();
        assert!(!gt.accepts(&CellValue::text("zzz")));
    }
}
