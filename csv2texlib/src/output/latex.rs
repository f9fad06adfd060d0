//! LaTeX-ready table data and its rendering.
//!
//! The data flow is:
//! 1. Raw data (`Table`)
//! 2. Display table (filtered, sorted, transformed, minima marked)
//! 3. LatexTable (LaTeX-ready strings, extra columns inserted)
//!
//! LatexTable only decides markup: escaping, math mode, underlines and
//! rules. Every value decision was made in the query stage.

use serde::Serialize;

use super::escape::escape_latex;
use crate::config::{Configuration, ExtraColumn, LatexOptions, TableStyle};
use crate::query::{DisplayCell, DisplayColumn, DisplayTable};

/// Where a horizontal rule sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RulePosition {
    Top,
    AfterHeader,
    BetweenRows,
    Bottom,
}

fn rule(style: TableStyle, position: RulePosition) -> &'static str {
    match (style, position) {
        (TableStyle::Hline, _) => "\\hline",
        (TableStyle::Booktabs, RulePosition::Top) => "\\toprule",
        (TableStyle::Booktabs, RulePosition::AfterHeader | RulePosition::BetweenRows) => {
            "\\midrule"
        }
        (TableStyle::Booktabs, RulePosition::Bottom) => "\\bottomrule",
    }
}

/// LaTeX-ready table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatexTable {
    /// Header cells, markup applied
    pub headers: Vec<String>,
    /// Body cells, markup applied
    pub rows: Vec<Vec<String>>,
    pub style: TableStyle,
    pub options: LatexOptions,
}

impl LatexTable {
    /// Build from a display table and the configuration's extra columns,
    /// style and layout options.
    pub fn from_display(display: &DisplayTable, config: &Configuration) -> Self {
        Self::from_parts(
            display,
            config.extra_columns(),
            config.table_style(),
            config.latex(),
        )
    }

    /// Build from a display table and explicit render settings.
    ///
    /// Extra columns are inserted in declaration order, each at its position
    /// clamped to the column count at that point.
    pub fn from_parts(
        display: &DisplayTable,
        extra_columns: &[ExtraColumn],
        style: TableStyle,
        options: &LatexOptions,
    ) -> Self {
        let mut headers: Vec<String> = display
            .columns
            .iter()
            .map(|c| latex_header(c, options.bold_headers))
            .collect();
        let mut rows: Vec<Vec<String>> = display
            .rows
            .iter()
            .map(|r| r.cells.iter().map(|c| latex_cell(c, options.math_mode)).collect())
            .collect();

        for extra in extra_columns {
            let at = usize::try_from(extra.position).unwrap_or(0).min(headers.len());
            headers.insert(at, bold(&extra.display_name, options.bold_headers));
            for row in &mut rows {
                row.insert(at, extra.value.clone());
            }
        }

        LatexTable {
            headers,
            rows,
            style,
            options: options.clone(),
        }
    }

    /// Emit the full `table` float.
    pub fn render(&self) -> String {
        let opts = &self.options;
        let mut out = String::new();

        out.push_str(&format!("\\begin{{table}}[{}]\n", opts.placement));
        out.push_str("\\centering\n");
        if let Some(caption) = &opts.caption {
            out.push_str(&format!("\\caption{{{}}}\n", caption));
        }
        if let Some(label) = &opts.label {
            out.push_str(&format!("\\label{{{}}}\n", label));
        }

        let spec: String = std::iter::repeat(opts.column_alignment)
            .take(self.headers.len())
            .collect();
        out.push_str(&format!("\\begin{{tabular}}{{{}}}\n", spec));

        out.push_str(rule(self.style, RulePosition::Top));
        out.push('\n');
        out.push_str(&self.headers.join(" & "));
        out.push_str(" \\\\\n");
        out.push_str(rule(self.style, RulePosition::AfterHeader));
        out.push('\n');

        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 && opts.rule_between_rows {
                out.push_str(rule(self.style, RulePosition::BetweenRows));
                out.push('\n');
            }
            out.push_str(&row.join(" & "));
            out.push_str(" \\\\\n");
        }

        out.push_str(rule(self.style, RulePosition::Bottom));
        out.push('\n');
        out.push_str("\\end{tabular}\n");
        out.push_str("\\end{table}");
        out
    }
}

impl std::fmt::Display for LatexTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a display table to LaTeX using the configuration's settings.
pub fn render(display: &DisplayTable, config: &Configuration) -> String {
    LatexTable::from_display(display, config).render()
}

fn bold(text: &str, enabled: bool) -> String {
    if enabled {
        format!("\\textbf{{{}}}", text)
    } else {
        text.to_string()
    }
}

/// Header markup. Configured display names are raw LaTeX; prettified
/// fallbacks are escaped.
pub fn latex_header(column: &DisplayColumn, bold_headers: bool) -> String {
    if column.header_is_latex {
        bold(&column.header, bold_headers)
    } else {
        bold(&escape_latex(&column.header), bold_headers)
    }
}

/// Cell markup.
///
/// Replacement text and suffix marks are raw LaTeX; everything else is
/// escaped. Formatted numbers go into math mode when `math_mode` is set, and
/// minima are underlined outside of everything else.
pub fn latex_cell(cell: &DisplayCell, math_mode: bool) -> String {
    let mut body = if cell.is_latex {
        cell.text.clone()
    } else {
        escape_latex(&cell.text)
    };
    // upright exponent marker, otherwise math mode sets `e` as a variable
    if cell.numeric && math_mode && !cell.is_latex {
        body = body.replace('e', "\\mathrm{e}");
    }
    if let Some(mark) = &cell.suffix_mark {
        body.push_str(mark);
    }
    if cell.numeric && math_mode {
        body = format!("${}$", body);
    }
    if cell.is_min {
        body = format!("\\underline{{{}}}", body);
    }
    body
}
