//! Domain models for test results and their summaries.

pub mod junit;
pub mod run_stats;
pub mod test_result;

// Re-export commonly used types
pub use junit::{CategoryBucket, FailureCategory, JunitFailure, JunitSummary};
pub use run_stats::{FailureEntry, RunStats, SlowTest, SuiteCounts};
pub use test_result::{TestRecord, TestStatus};

/// Ordered key/value pairs describing the environment a run executed in.
pub type RunEnvironment = Vec<(String, String)>;
