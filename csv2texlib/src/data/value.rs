//! Tagged cell values.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

/// A single table cell: either a number or a piece of text.
///
/// Every stage dispatches on this tag instead of guessing at types: only
/// `Number` cells are ever fed to a format code or considered for minima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric value (integers are stored as whole floats)
    Number(f64),
    /// Anything that did not parse as a number, including empty cells
    Text(String),
}

impl CellValue {
    /// Create a number cell
    pub fn number(value: f64) -> Self {
        CellValue::Number(value)
    }

    /// Create a text cell
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Interpret a raw CSV field.
    ///
    /// Surrounding whitespace is ignored when deciding whether the field is
    /// numeric; text cells keep the field verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Text(String::new());
        }
        match trimmed.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this is a number cell
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Check if this is a number cell
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Plain textual form of the cell.
    ///
    /// Whole numbers print without a fractional part (`2022`, not `2022.0`).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Number(n) => Cow::Owned(n.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// All textual spellings a configuration key may use for this value.
    ///
    /// YAML authors write `2022` or `2022.0` for the same whole number, so
    /// whole numbers offer both forms. The plain form always comes first.
    pub fn lookup_keys(&self) -> Vec<String> {
        match self {
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                let plain = n.to_string();
                let float = format!("{plain}.0");
                vec![plain, float]
            }
            other => vec![other.as_text().into_owned()],
        }
    }

    /// Natural ordering between two number cells.
    ///
    /// Returns `None` when either side is text; callers decide how to order
    /// mixed columns.
    pub fn numeric_cmp(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => Some(a.total_cmp(b)),
            _ => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.as_text();

        // Respect width and alignment from the formatter
        if let Some(width) = f.width() {
            if f.align() == Some(std::fmt::Alignment::Left) {
                write!(f, "{:<width$}", s, width = width)
            } else {
                write!(f, "{:>width$}", s, width = width)
            }
        } else {
            write!(f, "{}", s)
        }
    }
}
