//! Aggregate statistics for one Playwright run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TestStatus;

/// Per-suite status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteCounts {
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub skipped: usize,
}

impl SuiteCounts {
    /// Count one more result. Unknown statuses are not tracked per suite.
    pub fn record(&mut self, status: TestStatus) {
        match status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Broken => self.broken += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Unknown => {}
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.broken > 0
    }
}

/// A failed or broken test, as listed in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub name: String,
    pub file: String,
    pub error: Option<String>,
    pub status: TestStatus,
}

/// A test ranked by duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowTest {
    pub name: String,
    pub duration_ms: u64,
    pub steps_count: usize,
}

/// Summary statistics derived from a set of test records.
///
/// The five status counters always sum to `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub skipped: usize,
    pub unknown: usize,
    /// Percentage of passed tests (0 when there are none)
    pub pass_rate: f64,
    pub total_duration_ms: u64,
    pub avg_duration_ms: u64,
    /// Earliest recorded start time
    pub started_at: Option<DateTime<Utc>>,
    /// Suite label to counts, "Default" for unlabeled results
    pub suites: BTreeMap<String, SuiteCounts>,
    /// Failed and broken tests in input order
    pub failures: Vec<FailureEntry>,
    /// Longest-running tests, slowest first
    pub slowest: Vec<SlowTest>,
}

impl RunStats {
    /// Count for a single status.
    pub fn count(&self, status: TestStatus) -> usize {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Failed => self.failed,
            TestStatus::Broken => self.broken,
            TestStatus::Skipped => self.skipped,
            TestStatus::Unknown => self.unknown,
        }
    }

    /// Percentage of `total` for a single status.
    pub fn percentage(&self, status: TestStatus) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(status) as f64 / self.total as f64 * 100.0
        }
    }

    /// True when any test failed or broke.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.broken > 0
    }

    /// Suites with at least one failed test.
    pub fn suites_with_failed(&self) -> Vec<&str> {
        self.suites
            .iter()
            .filter(|(_, counts)| counts.failed > 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Suites with at least one failed or broken test.
    pub fn failing_suites(&self) -> Vec<&str> {
        self.suites
            .iter()
            .filter(|(_, counts)| counts.has_failures())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
