//! Test result model representing one parsed test execution.

use serde::{Deserialize, Serialize};

/// Test execution status, as reported by Allure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Broken,
    Skipped,
    Unknown,
}

impl TestStatus {
    /// Every status, in report order.
    pub const ALL: [TestStatus; 5] = [
        Self::Passed,
        Self::Failed,
        Self::Broken,
        Self::Skipped,
        Self::Unknown,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Broken => "broken",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Self {
        match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "broken" => Self::Broken,
            "skipped" => Self::Skipped,
            _ => Self::Unknown, // Anything Allure adds later lands here
        }
    }

    /// Capitalized label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Broken => "Broken",
            Self::Skipped => "Skipped",
            Self::Unknown => "Unknown",
        }
    }

    /// Allure-style status icon.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Passed => "✅",
            Self::Failed => "❌",
            Self::Broken => "💔",
            Self::Skipped => "⏭️",
            Self::Unknown => "❓",
        }
    }

    /// Whether this status counts as a failure for exit codes and reports.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Broken)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized outcome of a single test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Test title
    pub name: String,
    /// Fully qualified test name
    pub full_name: String,
    /// Execution status
    pub status: TestStatus,
    /// Start timestamp in epoch milliseconds (0 when absent)
    pub start_ms: i64,
    /// Execution duration in milliseconds, never negative
    pub duration_ms: u64,
    /// Owning suite label (empty when absent)
    pub suite: String,
    /// Source file / package label (empty when absent)
    pub file: String,
    /// Error text for failed and broken tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of steps, nested steps included
    pub steps_count: usize,
}
