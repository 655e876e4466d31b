//! Reduction of parsed results into summary statistics and failure buckets.

use chrono::{DateTime, Utc};

use crate::models::{
    CategoryBucket, FailureCategory, FailureEntry, JunitFailure, RunStats, SlowTest, TestRecord,
    TestStatus,
};

/// Suite label used for results without one.
pub const DEFAULT_SUITE: &str = "Default";

/// Number of tests listed in the slowest-tests table.
pub const SLOWEST_TESTS_LIMIT: usize = 5;

/// Aggregate test records into summary statistics.
///
/// Pure and deterministic: the same records always yield the same stats.
pub fn aggregate_results(records: &[TestRecord]) -> RunStats {
    let mut stats = RunStats {
        total: records.len(),
        ..RunStats::default()
    };

    for record in records {
        match record.status {
            TestStatus::Passed => stats.passed += 1,
            TestStatus::Failed => stats.failed += 1,
            TestStatus::Broken => stats.broken += 1,
            TestStatus::Skipped => stats.skipped += 1,
            TestStatus::Unknown => stats.unknown += 1,
        }
        stats.total_duration_ms += record.duration_ms;

        let suite = if record.suite.is_empty() {
            DEFAULT_SUITE
        } else {
            record.suite.as_str()
        };
        stats
            .suites
            .entry(suite.to_string())
            .or_default()
            .record(record.status);

        if record.status.is_failure() {
            stats.failures.push(FailureEntry {
                name: record.name.clone(),
                file: record.file.clone(),
                error: record.error.clone(),
                status: record.status,
            });
        }
    }

    if stats.total > 0 {
        stats.pass_rate = stats.passed as f64 / stats.total as f64 * 100.0;
        stats.avg_duration_ms = stats.total_duration_ms / stats.total as u64;
    }

    stats.started_at = records
        .iter()
        .map(|r| r.start_ms)
        .filter(|&ms| ms > 0)
        .min()
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    stats.slowest = slowest_tests(records, SLOWEST_TESTS_LIMIT);

    stats
}

/// Longest-running tests with a positive duration, slowest first.
/// Ties keep input order.
fn slowest_tests(records: &[TestRecord], limit: usize) -> Vec<SlowTest> {
    let mut timed: Vec<&TestRecord> = records.iter().filter(|r| r.duration_ms > 0).collect();
    timed.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
    timed
        .into_iter()
        .take(limit)
        .map(|r| SlowTest {
            name: r.name.clone(),
            duration_ms: r.duration_ms,
            steps_count: r.steps_count,
        })
        .collect()
}

// ============================================================================
// Failure Categorization
// ============================================================================

/// Lower-cased text a rule is evaluated against.
struct FailureText {
    summary: String,
    details: String,
}

impl FailureText {
    fn new(failure: &JunitFailure) -> Self {
        Self {
            summary: failure.summary.to_lowercase(),
            details: failure.details.to_lowercase(),
        }
    }

    fn mentions_allow_header(&self) -> bool {
        self.details.contains("allow") && self.details.contains("header")
    }
}

type Rule = (fn(&FailureText) -> bool, FailureCategory);

/// Ordered classification rules; the first match wins.
const RULES: &[Rule] = &[
    (
        |t| t.summary.contains("missing header"),
        FailureCategory::MissingHeaderNotRejected,
    ),
    (
        |t| t.summary.contains("unsupported method") && t.mentions_allow_header(),
        FailureCategory::MissingAllowHeader,
    ),
    (
        |t| t.summary.contains("unsupported method"),
        FailureCategory::WrongStatusCode,
    ),
    (
        |t| t.summary.contains("schema-compliant") || t.summary.contains("rejected"),
        FailureCategory::SchemaCompliantRejected,
    ),
];

/// Category for a single failure.
pub fn categorize(failure: &JunitFailure) -> FailureCategory {
    let text = FailureText::new(failure);
    RULES
        .iter()
        .find(|(matches, _)| matches(&text))
        .map(|(_, category)| *category)
        .unwrap_or(FailureCategory::Other)
}

/// Group failures into buckets in fixed category order, dropping empty ones.
pub fn categorize_failures(failures: &[JunitFailure]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = FailureCategory::ALL
        .iter()
        .map(|&category| CategoryBucket {
            category,
            failures: Vec::new(),
        })
        .collect();

    for failure in failures {
        let category = categorize(failure);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.category == category) {
            bucket.failures.push(failure.clone());
        }
    }

    buckets.retain(|b| !b.is_empty());
    buckets
}

/// Find a bucket by category.
pub fn bucket(buckets: &[CategoryBucket], category: FailureCategory) -> Option<&CategoryBucket> {
    buckets.iter().find(|b| b.category == category)
}

/// Endpoints listed per category in the model prompt.
const MAX_PROMPT_ENDPOINTS: usize = 10;

/// Pre-categorized failure block handed to the language model.
///
/// The result is cut at `max_chars` on a line boundary.
pub fn format_failures_for_llm(failures: &[JunitFailure], max_chars: usize) -> String {
    let mut lines = Vec::new();

    for bucket in categorize_failures(failures) {
        let endpoints = bucket.unique_endpoints();
        lines.push(format!(
            "**{}:** ({} occurrences)",
            bucket.category.label(),
            bucket.len()
        ));
        for endpoint in endpoints.iter().take(MAX_PROMPT_ENDPOINTS) {
            lines.push(format!("  - {}", endpoint));
        }
        if endpoints.len() > MAX_PROMPT_ENDPOINTS {
            lines.push(format!(
                "  - ... and {} more endpoints",
                endpoints.len() - MAX_PROMPT_ENDPOINTS
            ));
        }
        lines.push(String::new());
    }

    let mut text = String::new();
    for line in lines {
        if text.chars().count() + line.chars().count() + 1 > max_chars {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    text.trim_end().to_string()
}
