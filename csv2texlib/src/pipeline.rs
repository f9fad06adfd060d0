//! End-to-end conversion of one table.
//!
//! Stages run in a fixed order: filter, sort, transform, annotate minima,
//! render. The input table and configuration are only read; every stage
//! builds new values.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ConfigWarning, Configuration, TableStyle};
use crate::data::Table;
use crate::error::Csv2TexError;
use crate::output::LatexTable;
use crate::query::{
    annotate_with, filter_with, sort_order, sort_order_by_keys, transform_with, DisplayTable,
    FilterResult, Minima, SortKey, ValueFilter,
};
use crate::Result;

/// Per-invocation adjustments layered over the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Emitted columns, in order. All table columns when `None`.
    pub columns: Option<Vec<String>>,
    /// Header overrides by column key, emitted as raw LaTeX
    pub headers: IndexMap<String, String>,
    /// Underline switches by column key, ahead of the configured ones
    pub underline: IndexMap<String, bool>,
    /// Extra conditions; rows failing any are hidden
    pub filters: Vec<ValueFilter>,
    /// Sort keys applied on top of the configured ordering
    pub sort_keys: Vec<SortKey>,
    /// Replaces `default_decimal_places`
    pub decimal_places: Option<usize>,
    /// Replaces `table_style`
    pub table_style: Option<TableStyle>,
}

impl ConvertOptions {
    /// Create options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit only these columns, in this order.
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Override a column's header.
    pub fn header(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.headers.insert(column.into(), text.into());
        self
    }

    /// Override whether a column's minimum is underlined.
    pub fn underline(mut self, column: impl Into<String>, enabled: bool) -> Self {
        self.underline.insert(column.into(), enabled);
        self
    }

    /// Add a row condition.
    pub fn filter(mut self, filter: ValueFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a sort key. Earlier keys take priority.
    pub fn sort_key(mut self, key: SortKey) -> Self {
        self.sort_keys.push(key);
        self
    }

    /// Override the default decimal places.
    pub fn decimal_places(mut self, places: usize) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Override the rule style.
    pub fn table_style(mut self, style: TableStyle) -> Self {
        self.table_style = Some(style);
        self
    }
}

/// Everything one conversion produces.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Final display table, for previews
    pub display: DisplayTable,
    /// The `table` float
    pub latex: String,
    /// Row visibility over the input table
    pub filtered: FilterResult,
    /// Minimum rows per column, as input-table indices
    pub minima: Minima,
    /// Configuration problems that were worked around
    pub warnings: Vec<ConfigWarning>,
}

/// Convert a table with the configuration alone.
pub fn convert(table: &Table, config: &Configuration) -> Result<Conversion> {
    convert_with(table, config, &ConvertOptions::default())
}

/// Convert a table with per-invocation options.
///
/// Fails only on caller errors: an empty column selection or a selected
/// column the table lacks. Configuration problems were already recorded as
/// warnings when `config` was resolved.
pub fn convert_with(
    table: &Table,
    config: &Configuration,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let selected = selected_columns(table, options)?;

    let filtered = filter_with(table, config, &options.filters);
    let order = row_order(table, config, &filtered, &options.sort_keys);
    let sorted = table.select_rows(&order);

    let decimals = options
        .decimal_places
        .unwrap_or_else(|| config.default_decimal_places());
    let mut display = transform_with(&sorted, config, decimals);
    for row in &mut display.rows {
        row.source = order[row.source];
    }
    for column in &mut display.columns {
        if let Some(header) = options.headers.get(&column.key) {
            column.header = header.clone();
            column.header_is_latex = true;
        }
    }

    let minima = annotate_with(table, &filtered, |column| {
        options
            .underline
            .get(column)
            .copied()
            .unwrap_or_else(|| config.underline_enabled(column))
    });
    display.mark_minima(&minima);

    let display = match selected {
        Some(keys) => display.select_columns(&keys),
        None => display,
    };

    let style = options.table_style.unwrap_or_else(|| config.table_style());
    let latex = LatexTable::from_parts(&display, config.extra_columns(), style, config.latex())
        .render();

    let shown = display.rows.len();
    let columns = display.columns.len();
    tracing::debug!(
        rows = table.row_count(),
        shown,
        columns,
        underlined_columns = minima.len(),
        "converted table"
    );

    Ok(Conversion {
        display,
        latex,
        filtered,
        minima,
        warnings: config.warnings().to_vec(),
    })
}

fn selected_columns(table: &Table, options: &ConvertOptions) -> Result<Option<Vec<String>>> {
    match &options.columns {
        Some(columns) => {
            if columns.is_empty() {
                return Err(Csv2TexError::NoColumns);
            }
            if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
                return Err(Csv2TexError::UnknownColumn(missing.clone()));
            }
            Ok(Some(columns.clone()))
        }
        None if table.column_count() == 0 => Err(Csv2TexError::NoColumns),
        None => Ok(None),
    }
}

/// Visible rows in output order, as input-table indices.
fn row_order(
    table: &Table,
    config: &Configuration,
    filtered: &FilterResult,
    sort_keys: &[SortKey],
) -> Vec<usize> {
    let visible = table.select_rows(&filtered.visible);
    let by_config: Vec<usize> = sort_order(&visible, config)
        .into_iter()
        .map(|i| filtered.visible[i])
        .collect();
    if sort_keys.is_empty() {
        return by_config;
    }

    let ranked = table.select_rows(&by_config);
    sort_order_by_keys(&ranked, sort_keys)
        .into_iter()
        .map(|i| by_config[i])
        .collect()
}
