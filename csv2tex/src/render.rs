//! Template rendering for CLI output using outstanding

use console::{measure_text_width, Style};
use csv2texlib::{ConfigWarning, Conversion, DisplayTable};
use outstanding::{render_auto, render_with_output, Theme};
use serde::Serialize;

/// Include template at compile time
const PREVIEW_TEMPLATE: &str = include_str!("../templates/preview_table.jinja");

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// One pre-padded preview cell
#[derive(Debug, Serialize)]
struct PreviewCell {
    text: String,
    /// Column minimum, styled as `minimum`
    is_min: bool,
}

/// Data context for the preview template
#[derive(Debug, Serialize)]
struct PreviewContext {
    /// Pre-padded header cells joined by two spaces
    header_line: String,
    /// Separator line (dashes per column)
    separator: String,
    rows: Vec<Vec<PreviewCell>>,
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new()
        .add("header", Style::new().bold())
        .add("minimum", Style::new().underlined())
}

/// Pad text to a display width, left-aligned. The last column is left
/// unpadded so lines carry no trailing spaces.
fn pad(text: &str, width: usize, last: bool) -> String {
    if last {
        return text.to_string();
    }
    let fill = width.saturating_sub(measure_text_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn preview_context(display: &DisplayTable) -> PreviewContext {
    let headers: Vec<&str> = display.columns.iter().map(|c| c.header.as_str()).collect();
    let rows = display.display_rows();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| measure_text_width(&r[i]))
                .chain(std::iter::once(measure_text_width(h)))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let last = widths.len().saturating_sub(1);

    let header_line = headers
        .iter()
        .zip(&widths)
        .enumerate()
        .map(|(i, (h, w))| pad(h, *w, i == last))
        .collect::<Vec<_>>()
        .join("  ");
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");

    let rows = display
        .rows
        .iter()
        .zip(&rows)
        .map(|(row, texts)| {
            texts
                .iter()
                .zip(&row.cells)
                .zip(&widths)
                .enumerate()
                .map(|(i, ((text, cell), w))| PreviewCell {
                    text: pad(text, *w, i == last),
                    is_min: cell.is_min,
                })
                .collect()
        })
        .collect();

    PreviewContext {
        header_line,
        separator,
        rows,
    }
}

/// Render a terminal preview of a display table.
///
/// Headers are bold and column minima are underlined; styling is dropped
/// in `OutputMode::Text` and when `Auto` is not writing to a terminal.
pub fn render_preview(display: &DisplayTable, output_mode: OutputMode) -> anyhow::Result<String> {
    let theme = create_theme();
    let context = preview_context(display);
    render_with_output(PREVIEW_TEMPLATE, &context, &theme, output_mode)
        .map_err(|e| anyhow::anyhow!("failed to render preview: {e}"))
}

/// Render the whole conversion as JSON using outstanding's auto dispatch
pub fn render_json(result: &Conversion) -> anyhow::Result<String> {
    let theme = create_theme();
    render_auto(PREVIEW_TEMPLATE, result, &theme, OutputMode::Json)
        .map_err(|e| anyhow::anyhow!("failed to render JSON: {e}"))
}

/// Print configuration warnings to stderr
pub fn print_warnings(warnings: &[ConfigWarning]) {
    let label = Style::new().yellow().bold().for_stderr();
    for warning in warnings {
        eprintln!("{} {}", label.apply_to("warning:"), warning);
    }
}
