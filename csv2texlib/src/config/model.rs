//! The resolved, read-only configuration.
//!
//! A [`Configuration`] is built once per run by
//! [`Configuration::resolve`](crate::config::resolve) and then only read.
//! Legacy keys are already folded into the generalized sections by the time
//! one exists, so none of the accessors here know about legacy names.

use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use super::format::FormatSpec;
use crate::data::CellValue;

/// Fallback key inside `column_underline`.
pub const UNDERLINE_DEFAULT_KEY: &str = "default";

/// Prefixes dropped from column keys when no display name is configured.
const PRETTY_PREFIXES: [&str; 3] = ["data_", "model_", "result_"];

/// Rule style used for the tabular environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    /// `\hline` at top, after the header, and at the bottom
    #[default]
    Hline,
    /// `\toprule`, `\midrule`, `\bottomrule`
    Booktabs,
}

impl FromStr for TableStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hline" => Ok(TableStyle::Hline),
            "booktabs" => Ok(TableStyle::Booktabs),
            _ => Err(format!("Unknown table style: {}", s)),
        }
    }
}

/// A static column injected into the LaTeX output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraColumn {
    /// 0-indexed insert position, clamped to `0..=column count` at render time
    pub position: i64,
    /// Header text, emitted as raw LaTeX
    pub display_name: String,
    /// Cell text repeated on every row, emitted as raw LaTeX
    pub value: String,
}

/// An exclude-list entry: an exact value or a glob pattern.
///
/// `*` matches any run of characters, `?` a single character and `[..]` a
/// character class. The pattern must match the whole value.
#[derive(Debug, Clone)]
pub struct ValueMatcher {
    raw: String,
    pattern: Option<Pattern>,
}

impl ValueMatcher {
    /// Build a matcher that only accepts the exact value.
    pub fn exact(raw: impl Into<String>) -> Self {
        ValueMatcher {
            raw: raw.into(),
            pattern: None,
        }
    }

    /// Build a matcher, compiling wildcards if the value has any.
    ///
    /// Runs of `*` collapse into one. A pattern that does not compile
    /// degrades to an exact matcher and the compile error is returned
    /// alongside it.
    pub fn new(raw: impl Into<String>) -> (Self, Option<String>) {
        let raw = raw.into();
        if !raw.contains(['*', '?', '[']) {
            return (ValueMatcher::exact(raw), None);
        }

        let mut collapsed = String::with_capacity(raw.len());
        for c in raw.chars() {
            if !(c == '*' && collapsed.ends_with('*')) {
                collapsed.push(c);
            }
        }

        match Pattern::new(&collapsed) {
            Ok(pattern) => (
                ValueMatcher {
                    raw,
                    pattern: Some(pattern),
                },
                None,
            ),
            Err(e) => {
                let message = format!("invalid pattern '{}': {}", raw, e.msg);
                (ValueMatcher::exact(raw), Some(message))
            }
        }
    }

    /// The value as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check a single textual value.
    pub fn matches(&self, text: &str) -> bool {
        self.raw == text || self.pattern.as_ref().is_some_and(|p| p.matches(text))
    }

    /// Check a cell under every textual spelling it has.
    pub fn matches_cell(&self, cell: &CellValue) -> bool {
        cell.lookup_keys().iter().any(|k| self.matches(k))
    }
}

impl PartialEq for ValueMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for ValueMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Row ordering rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SortConfig {
    /// Sort columns, primary first
    pub columns: Vec<String>,
    /// Per-column rank of a raw value (as text)
    pub sort_orders: IndexMap<String, IndexMap<String, i64>>,
}

/// Row exclusion rules, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterRules {
    /// Matching rows are hidden
    pub exclude_values: IndexMap<String, Vec<ValueMatcher>>,
    /// Matching rows stay visible but are left out of minimum detection
    pub exclude_from_calculations: IndexMap<String, Vec<ValueMatcher>>,
}

/// A trailing-text rule: when a rendered value ends with `suffix`, `latex`
/// is appended after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub latex: String,
}

/// Layout options for the emitted LaTeX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatexOptions {
    /// `\caption{..}` text; no caption when `None`
    pub caption: Option<String>,
    /// `\label{..}` text
    pub label: Option<String>,
    /// Float placement specifier for the table environment
    pub placement: String,
    /// Emit a rule between every data row
    pub rule_between_rows: bool,
    /// Wrap header cells in `\textbf{}`
    pub bold_headers: bool,
    /// Wrap formatted numbers in `$..$`
    pub math_mode: bool,
    /// Alignment letter repeated for every column
    pub column_alignment: char,
}

impl Default for LatexOptions {
    fn default() -> Self {
        Self {
            caption: Some("Your Caption Here".to_string()),
            label: None,
            placement: "t".to_string(),
            rule_between_rows: false,
            bold_headers: true,
            math_mode: true,
            column_alignment: 'c',
        }
    }
}

/// A recoverable configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    /// Top-level key the problem was found under
    pub section: String,
    /// Human-readable description
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.section, self.message)
    }
}

/// The merged configuration every stage reads from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub(crate) display_names: IndexMap<String, String>,
    pub(crate) column_formats: IndexMap<String, FormatSpec>,
    pub(crate) column_underline: IndexMap<String, bool>,
    pub(crate) row_sorting: SortConfig,
    pub(crate) value_replacements: IndexMap<String, IndexMap<String, String>>,
    pub(crate) row_filtering: FilterRules,
    pub(crate) pattern_formatting: IndexMap<String, Vec<SuffixRule>>,
    pub(crate) extra_columns: Vec<ExtraColumn>,
    pub(crate) table_style: TableStyle,
    pub(crate) underline_min_values: bool,
    pub(crate) default_decimal_places: usize,
    pub(crate) latex: LatexOptions,
    #[serde(skip)]
    pub(crate) warnings: Vec<ConfigWarning>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            display_names: IndexMap::new(),
            column_formats: IndexMap::new(),
            column_underline: IndexMap::new(),
            row_sorting: SortConfig::default(),
            value_replacements: IndexMap::new(),
            row_filtering: FilterRules::default(),
            pattern_formatting: IndexMap::new(),
            extra_columns: Vec::new(),
            table_style: TableStyle::Hline,
            underline_min_values: true,
            default_decimal_places: 3,
            latex: LatexOptions::default(),
            warnings: Vec::new(),
        }
    }
}

impl Configuration {
    /// Configured display label for a column, if any.
    pub fn display_name(&self, column: &str) -> Option<&str> {
        self.display_names.get(column).map(String::as_str)
    }

    /// Parsed format code for a column, if one is configured.
    pub fn column_format(&self, column: &str) -> Option<&FormatSpec> {
        self.column_formats.get(column)
    }

    /// Decimal places used for numbers in columns without a format code.
    pub fn default_decimal_places(&self) -> usize {
        self.default_decimal_places
    }

    /// Whether the column's minimum should be underlined.
    ///
    /// Looks at the column's own entry, then the section's `default` entry,
    /// then the global `underline_min_values` switch.
    pub fn underline_enabled(&self, column: &str) -> bool {
        self.column_underline
            .get(column)
            .or_else(|| self.column_underline.get(UNDERLINE_DEFAULT_KEY))
            .copied()
            .unwrap_or(self.underline_min_values)
    }

    /// Sort columns, primary first.
    pub fn sort_columns(&self) -> &[String] {
        &self.row_sorting.columns
    }

    /// Check if the column has a rank mapping.
    pub fn has_rank_mapping(&self, column: &str) -> bool {
        self.row_sorting.sort_orders.contains_key(column)
    }

    /// Rank of a cell under the column's rank mapping.
    pub fn sort_rank(&self, column: &str, cell: &CellValue) -> Option<i64> {
        let ranks = self.row_sorting.sort_orders.get(column)?;
        cell.lookup_keys()
            .iter()
            .find_map(|k| ranks.get(k.as_str()).copied())
    }

    /// Replacement text for a cell, if one is configured.
    pub fn replacement(&self, column: &str, cell: &CellValue) -> Option<&str> {
        let replacements = self.value_replacements.get(column)?;
        cell.lookup_keys()
            .iter()
            .find_map(|k| replacements.get(k.as_str()))
            .map(String::as_str)
    }

    /// Suffix rules for a column in declaration order.
    pub fn suffix_rules(&self, column: &str) -> &[SuffixRule] {
        self.pattern_formatting
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Hide rules, keyed by column.
    pub fn exclude_values(&self) -> &IndexMap<String, Vec<ValueMatcher>> {
        &self.row_filtering.exclude_values
    }

    /// Minimum-detection exclusion rules, keyed by column.
    pub fn exclude_from_calculations(&self) -> &IndexMap<String, Vec<ValueMatcher>> {
        &self.row_filtering.exclude_from_calculations
    }

    /// Static columns injected at render time.
    pub fn extra_columns(&self) -> &[ExtraColumn] {
        &self.extra_columns
    }

    /// Rule style of the tabular.
    pub fn table_style(&self) -> TableStyle {
        self.table_style
    }

    /// LaTeX layout options.
    pub fn latex(&self) -> &LatexOptions {
        &self.latex
    }

    /// Problems found while resolving this configuration.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

/// Turn a column key into a header label.
///
/// Drops one leading `data_`, `model_` or `result_` prefix, then replaces
/// underscores with spaces and capitalizes each word.
pub fn prettify_column_name(column: &str) -> String {
    let stripped = PRETTY_PREFIXES
        .iter()
        .find_map(|p| column.strip_prefix(p).filter(|rest| !rest.is_empty()))
        .unwrap_or(column);

    stripped
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
