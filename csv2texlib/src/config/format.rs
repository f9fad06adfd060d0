//! Compact numeric format codes.
//!
//! A column's format code is one of:
//!
//! | Code   | Meaning                                   | `0.856432` renders as |
//! |--------|-------------------------------------------|-----------------------|
//! | `.Nf`  | fixed decimal, `N` fractional digits      | `.3f` → `0.856`       |
//! | `.Ne`  | scientific, two-digit signed exponent     | `.2e` → `8.56e-01`    |
//! | `.N%`  | multiply by 100, `N` digits, append `%`   | `.1%` → `85.6%`       |
//! | `d`    | nearest integer, no grouping              | `d`   → `1`           |
//!
//! Rounding follows the standard library's float formatting, which rounds
//! the exact binary value half-to-even, identically for every kind.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data::CellValue;

/// Largest precision a format code may ask for.
pub(crate) const MAX_PRECISION: usize = 32;

/// Rendering style of a format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// `.Nf`
    FixedDecimal,
    /// `.Ne`
    Scientific,
    /// `.N%`
    Percentage,
    /// `d`
    Integer,
}

/// A parsed format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Rendering style
    pub kind: FormatKind,
    /// Digits after the decimal point (always 0 for `Integer`)
    pub precision: usize,
}

impl FormatSpec {
    /// Fixed-decimal format with the given precision
    pub fn fixed(precision: usize) -> Self {
        FormatSpec {
            kind: FormatKind::FixedDecimal,
            precision,
        }
    }

    /// Integer format
    pub fn integer() -> Self {
        FormatSpec {
            kind: FormatKind::Integer,
            precision: 0,
        }
    }

    /// Render a number, or `None` if this format cannot represent it.
    ///
    /// Non-finite values (NaN, infinities) are never rendered by a format
    /// code; callers fall back to the value's plain text.
    pub fn render(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return None;
        }
        let p = self.precision;
        let rendered = match self.kind {
            FormatKind::FixedDecimal => format!("{:.*}", p, value),
            FormatKind::Percentage => {
                let scaled = value * 100.0;
                if !scaled.is_finite() {
                    return None;
                }
                format!("{:.*}%", p, scaled)
            }
            FormatKind::Scientific => {
                let raw = format!("{:.*e}", p, value);
                let (mantissa, exponent) = raw.split_once('e')?;
                let exponent: i32 = exponent.parse().ok()?;
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            FormatKind::Integer => {
                let s = format!("{:.0}", value);
                if s == "-0" {
                    "0".to_string()
                } else {
                    s
                }
            }
        };
        Some(rendered)
    }
}

impl FromStr for FormatSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code == "d" {
            return Ok(FormatSpec::integer());
        }

        let unknown = || format!("Unknown format code: {}", s);
        let body = code.strip_prefix('.').ok_or_else(unknown)?;
        let kind = match body.chars().last() {
            Some('f') => FormatKind::FixedDecimal,
            Some('e') => FormatKind::Scientific,
            Some('%') => FormatKind::Percentage,
            _ => return Err(unknown()),
        };
        let digits = &body[..body.len() - 1];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(unknown());
        }
        let precision: usize = digits.parse().map_err(|_| unknown())?;
        if precision > MAX_PRECISION {
            return Err(format!(
                "Precision {} in format code '{}' exceeds {}",
                precision, s, MAX_PRECISION
            ));
        }

        Ok(FormatSpec { kind, precision })
    }
}

/// Render a cell for display.
///
/// Text cells come back verbatim whatever the format. Number cells use
/// `spec`, or fixed decimals with `default_decimals` when the column has no
/// usable code; if the format cannot render the number, its plain text is
/// used instead.
pub fn render_cell(cell: &CellValue, spec: Option<&FormatSpec>, default_decimals: usize) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => spec
            .copied()
            .unwrap_or_else(|| FormatSpec::fixed(default_decimals))
            .render(*n)
            .unwrap_or_else(|| cell.as_text().into_owned()),
    }
}
