//! Playwright run summary.

use std::fmt::Write;

use super::{AI_INSIGHTS_HEADING, format_duration, numbered_list, table_cell};
use crate::models::{FailureEntry, RunStats, SlowTest, SuiteCounts, TestStatus};

pub const REPORT_TITLE: &str = "## 🎭 Playwright E2E Test Summary";
pub const BANNER_TITLE: &str = "🎭 PLAYWRIGHT TEST RESULTS SUMMARY";
pub const NO_RESULTS_NOTICE: &str = "⚠️ No test results found. Tests may not have run.";
pub const UNPARSEABLE_NOTICE: &str = "⚠️ Could not parse any test results.";

const MAX_LISTED_FAILURES: usize = 10;
const MAX_ERROR_CHARS: usize = 200;
const MAX_RECOMMENDATIONS: usize = 8;
const MAX_NAMED_SUITES: usize = 3;

/// Skip rate above which skipped tests get a stronger recommendation.
const HIGH_SKIP_RATE: f64 = 20.0;
/// Average duration above which parallelization is suggested.
const SLOW_AVERAGE_MS: u64 = 10_000;
/// Pass rate below which stability is flagged.
const LOW_PASS_RATE: f64 = 80.0;
/// Minimum run size for the pass-rate recommendation.
const MIN_TESTS_FOR_PASS_RATE: usize = 5;

/// Inputs for one Playwright report.
#[derive(Debug, Clone)]
pub struct PlaywrightReport<'a> {
    stats: &'a RunStats,
    environment: Option<&'a [(String, String)]>,
    insights: Option<&'a str>,
    compact: bool,
}

impl<'a> PlaywrightReport<'a> {
    pub fn new(stats: &'a RunStats) -> Self {
        Self {
            stats,
            environment: None,
            insights: None,
            compact: false,
        }
    }

    /// Skip the suites and slowest-tests tables.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn environment(mut self, environment: Option<&'a [(String, String)]>) -> Self {
        self.environment = environment.filter(|env| !env.is_empty());
        self
    }

    pub fn insights(mut self, insights: Option<&'a str>) -> Self {
        self.insights = insights.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn render(&self) -> String {
        let stats = self.stats;
        let mut out = String::new();

        let _ = writeln!(out, "{}\n", REPORT_TITLE);
        out.push_str(&summary_section(stats));

        if let Some(environment) = self.environment {
            out.push_str(&environment_section(environment));
        }
        if !stats.failures.is_empty() {
            out.push_str(&failures_section(&stats.failures));
        }
        if !self.compact {
            if let Some(section) = suites_section(stats) {
                out.push_str(&section);
            }
            if let Some(section) = slowest_section(&stats.slowest) {
                out.push_str(&section);
            }
        }

        let _ = writeln!(
            out,
            "### 💡 Recommendations\n\n{}\n",
            numbered_list(&recommendations(stats), MAX_RECOMMENDATIONS)
        );

        if let Some(insights) = self.insights {
            let _ = writeln!(out, "{}\n\n{}\n", AI_INSIGHTS_HEADING, insights.trim());
        }

        out
    }
}

/// Render a full report with default options.
pub fn render_playwright_report(stats: &RunStats) -> String {
    PlaywrightReport::new(stats).render()
}

/// CI output when nothing could be summarized.
pub fn render_notice(notice: &str) -> String {
    format!("{}\n\n{}", REPORT_TITLE, notice)
}

/// Overall outcome line.
pub fn status_badge(stats: &RunStats) -> &'static str {
    if stats.has_failures() {
        "❌ **TESTS FAILED**"
    } else if stats.skipped > 0 && stats.passed == 0 {
        "⏭️ **ALL TESTS SKIPPED**"
    } else if stats.passed > 0 && stats.skipped > 0 {
        "✅ **TESTS PASSED** (some skipped)"
    } else if stats.passed > 0 {
        "✅ **ALL TESTS PASSED**"
    } else {
        "⚠️ **TESTS COMPLETED WITH ISSUES**"
    }
}

fn summary_section(stats: &RunStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "### {}\n", status_badge(stats));
    out.push_str("| Status | Count | Percentage |\n");
    out.push_str("|--------|-------|------------|\n");
    for status in TestStatus::ALL {
        let count = stats.count(status);
        let always_shown = matches!(status, TestStatus::Passed | TestStatus::Failed);
        if count > 0 || always_shown {
            let _ = writeln!(
                out,
                "| {} {} | {} | {:.1}% |",
                status.icon(),
                status.label(),
                count,
                stats.percentage(status)
            );
        }
    }
    let _ = writeln!(out, "| **Total** | **{}** | **100%** |\n", stats.total);

    out.push_str("### ⏱️ Performance Metrics\n\n");
    let _ = writeln!(
        out,
        "- **Total Duration:** {}",
        format_duration(stats.total_duration_ms)
    );
    let _ = writeln!(
        out,
        "- **Average Test Duration:** {}",
        format_duration(stats.avg_duration_ms)
    );
    let _ = writeln!(out, "- **Pass Rate:** {:.1}%", stats.pass_rate);
    if let Some(started_at) = stats.started_at {
        let _ = writeln!(
            out,
            "- **Started:** {}",
            started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out.push('\n');

    out
}

fn environment_section(environment: &[(String, String)]) -> String {
    let mut out = String::from("### 🌍 Environment\n\n| Key | Value |\n|-----|-------|\n");
    for (key, value) in environment {
        let _ = writeln!(out, "| {} | {} |", table_cell(key), table_cell(value));
    }
    out.push('\n');
    out
}

fn failures_section(failures: &[FailureEntry]) -> String {
    let mut out = String::from("### ❌ Failed Tests\n\n");

    for (i, failure) in failures.iter().take(MAX_LISTED_FAILURES).enumerate() {
        let _ = writeln!(
            out,
            "**{}. {} {}**",
            i + 1,
            failure.status.icon(),
            failure.name
        );
        let _ = writeln!(out, "- 📁 File: `{}`", failure.file);
        if let Some(error) = failure.error.as_deref().filter(|e| !e.is_empty()) {
            let _ = writeln!(out, "- 💬 Error: {}", flatten_error(error));
        }
        out.push('\n');
    }

    if failures.len() > MAX_LISTED_FAILURES {
        let _ = writeln!(
            out,
            "*... and {} more failures*\n",
            failures.len() - MAX_LISTED_FAILURES
        );
    }

    out
}

/// Single-line error, cut to a fixed length.
fn flatten_error(error: &str) -> String {
    error
        .replace('\n', " ")
        .trim()
        .chars()
        .take(MAX_ERROR_CHARS)
        .collect()
}

fn suites_section(stats: &RunStats) -> Option<String> {
    if stats.suites.len() < 2 {
        return None;
    }

    let mut out = String::from("### 📦 Test Suites\n\n");
    out.push_str("| Suite | ✅ | ❌ | 💔 | ⏭️ |\n");
    out.push_str("|-------|-----|-----|-----|-----|\n");
    for (suite, SuiteCounts { passed, failed, broken, skipped }) in &stats.suites {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            table_cell(suite),
            passed,
            failed,
            broken,
            skipped
        );
    }
    out.push('\n');
    Some(out)
}

fn slowest_section(slowest: &[SlowTest]) -> Option<String> {
    if slowest.is_empty() {
        return None;
    }

    let mut out = String::from("### 🐢 Slowest Tests\n\n");
    out.push_str("| Test | Duration | Steps |\n");
    out.push_str("|------|----------|-------|\n");
    for test in slowest {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            table_cell(&test.name),
            format_duration(test.duration_ms),
            test.steps_count
        );
    }
    out.push('\n');
    Some(out)
}

/// Deterministic recommendations driven by aggregate thresholds.
pub fn recommendations(stats: &RunStats) -> Vec<String> {
    let mut recs = Vec::new();

    if stats.failed > 0 {
        recs.push(format!(
            "Investigate and fix the {} failing test(s) before merging.",
            stats.failed
        ));
    }

    if stats.broken > 0 {
        recs.push(format!(
            "Review {} broken test(s) - these may indicate infrastructure or setup issues.",
            stats.broken
        ));
    }

    if stats.skipped > 0 {
        let skip_rate = stats.percentage(TestStatus::Skipped);
        if skip_rate > HIGH_SKIP_RATE {
            recs.push(format!(
                "High skip rate ({:.0}%) - review if skipped tests should be enabled or removed.",
                skip_rate
            ));
        } else {
            recs.push(format!(
                "Review {} skipped test(s) to ensure they are intentionally disabled.",
                stats.skipped
            ));
        }
    }

    if stats.avg_duration_ms > SLOW_AVERAGE_MS {
        recs.push(format!(
            "Average test duration is {} - consider parallelization or optimization.",
            format_duration(stats.avg_duration_ms)
        ));
    }

    if stats.pass_rate < LOW_PASS_RATE && stats.total > MIN_TESTS_FOR_PASS_RATE {
        recs.push(format!(
            "Pass rate is {:.0}% - prioritize test stability before adding new tests.",
            stats.pass_rate
        ));
    } else if stats.pass_rate == 100.0 {
        recs.push("All tests passing - consider adding more edge case coverage.".to_string());
    }

    let failing_suites = stats.failing_suites();
    if failing_suites.len() > 1 {
        let named: Vec<&str> = failing_suites.into_iter().take(MAX_NAMED_SUITES).collect();
        recs.push(format!(
            "Multiple suites have failures ({}) - check for shared dependencies.",
            named.join(", ")
        ));
    }

    if recs.is_empty() {
        recs.push("Test suite is healthy - continue monitoring for regressions.".to_string());
    }

    recs
}
