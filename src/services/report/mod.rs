//! Markdown report rendering.

pub mod playwright;
pub mod schemathesis;

pub use playwright::{PlaywrightReport, render_playwright_report};
pub use schemathesis::{SchemathesisReport, render_schemathesis_all_passed, render_schemathesis_report};

/// Section heading for model-generated text.
pub const AI_INSIGHTS_HEADING: &str = "### 🤖 AI Insights";

/// Width of the `=` rules around interactive output.
const RULE_WIDTH: usize = 60;

/// Human-readable duration: `850ms`, `2.5s`, `3m 5s`.
pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}

/// Render items as a `1. ...` list, keeping at most `max` of them.
pub fn numbered_list<S: AsRef<str>>(items: &[S], max: usize) -> String {
    items
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape a value for use inside a markdown table cell.
pub(crate) fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Wrap a report in the banner used for terminal output.
pub fn decorate(title: &str, report: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n{title}\n{rule}\n\n{report}\n{rule}")
}
