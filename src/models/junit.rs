//! Schemathesis JUnit results and failure categories.

use std::collections::BTreeSet;

use serde::Serialize;

/// One failing test case from a JUnit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JunitFailure {
    /// Test case name, e.g. `GET /notes/{note_id}`
    pub endpoint: String,
    /// One-line summary of the failed checks
    pub summary: String,
    /// Cleaned failure message
    pub details: String,
}

/// Totals and failures from one or more JUnit files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JunitSummary {
    pub total_tests: u64,
    pub total_failures: u64,
    pub failures: Vec<JunitFailure>,
}

impl JunitSummary {
    /// Fold another file's results into this one.
    pub fn merge(&mut self, other: JunitSummary) {
        self.total_tests += other.total_tests;
        self.total_failures += other.total_failures;
        self.failures.extend(other.failures);
    }
}

/// Closed set of failure categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FailureCategory {
    MissingHeaderNotRejected,
    MissingAllowHeader,
    WrongStatusCode,
    SchemaCompliantRejected,
    Other,
}

impl FailureCategory {
    pub const ALL: [FailureCategory; 5] = [
        Self::MissingHeaderNotRejected,
        Self::MissingAllowHeader,
        Self::WrongStatusCode,
        Self::SchemaCompliantRejected,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingHeaderNotRejected => "Missing header not rejected (401 vs 406)",
            Self::MissingAllowHeader => "Missing Allow header on 405",
            Self::WrongStatusCode => "Wrong status code (404 vs 405)",
            Self::SchemaCompliantRejected => "Schema-compliant request rejected",
            Self::Other => "Other failures",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failures that fell into one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBucket {
    pub category: FailureCategory,
    pub failures: Vec<JunitFailure>,
}

impl CategoryBucket {
    /// Number of failures (not endpoints) in the bucket.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Distinct endpoints, sorted.
    pub fn unique_endpoints(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|f| f.endpoint.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
