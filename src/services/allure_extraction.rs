//! Allure JSON extraction for Playwright `*-result.json` files.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{RunEnvironment, TestRecord, TestStatus};
use crate::services::results_dir;

/// File-name pattern of Allure result documents.
pub const RESULT_FILE_PATTERN: &str = "*-result.json";

/// Allure environment file written next to the results.
pub const ENVIRONMENT_FILE: &str = "environment.properties";

/// Traces are cut to this many characters when no message is present.
const MAX_TRACE_CHARS: usize = 500;

// ============================================================================
// Allure JSON Schema Structs
// ============================================================================

/// One Allure result document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub status: Option<String>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    #[serde(default)]
    pub labels: Vec<AllureLabel>,
    pub status_details: Option<AllureStatusDetails>,
    #[serde(default)]
    pub steps: Vec<AllureStep>,
}

/// Allure label (`suite`, `parentSuite`, `package`, ...).
#[derive(Debug, Deserialize)]
pub struct AllureLabel {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Failure detail attached to a result.
#[derive(Debug, Default, Deserialize)]
pub struct AllureStatusDetails {
    pub message: Option<String>,
    pub trace: Option<String>,
}

/// A test step; steps nest arbitrarily deep.
#[derive(Debug, Deserialize)]
pub struct AllureStep {
    #[serde(default)]
    pub steps: Vec<AllureStep>,
}

impl AllureResult {
    fn label(&self, name: &str) -> Option<&str> {
        // Later labels override earlier ones with the same name
        self.labels
            .iter()
            .rev()
            .find(|l| l.name.as_deref() == Some(name))
            .and_then(|l| l.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

// ============================================================================
// Extraction Logic
// ============================================================================

/// Find all Allure result files in a results directory.
pub fn find_result_files(results_dir: &Path) -> Vec<PathBuf> {
    results_dir::find_files(results_dir, RESULT_FILE_PATTERN)
}

/// Parse one Allure result document into a record.
pub fn parse_result_str(content: &str) -> Result<TestRecord, serde_json::Error> {
    let result: AllureResult = serde_json::from_str(content)?;
    Ok(to_record(result))
}

/// Parse one Allure result file into a record.
pub fn parse_result_file(path: &Path) -> AppResult<TestRecord> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::parse(path, format!("failed to read file: {}", e)))?;
    parse_result_str(&content).map_err(|e| AppError::parse(path, e))
}

/// Parse every file, skipping (and logging) the ones that fail.
pub fn parse_result_files(files: &[PathBuf]) -> Vec<TestRecord> {
    let mut records = Vec::with_capacity(files.len());

    for file in files {
        match parse_result_file(file) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Could not parse {}: {}", display_name(file), e),
        }
    }

    info!("Parsed {} of {} result file(s)", records.len(), files.len());
    records
}

fn to_record(result: AllureResult) -> TestRecord {
    let name = result
        .name
        .clone()
        .unwrap_or_else(|| "Unknown test".to_string());
    let full_name = result.full_name.clone().unwrap_or_else(|| name.clone());
    let status = TestStatus::parse(result.status.as_deref().unwrap_or("unknown"));

    let start = result.start.unwrap_or(0.0);
    let stop = result.stop.unwrap_or(0.0);
    let duration_ms = if stop > start {
        (stop - start) as u64
    } else {
        0
    };

    let suite = result
        .label("parentSuite")
        .or_else(|| result.label("suite"))
        .unwrap_or_default()
        .to_string();
    let file = result.label("package").unwrap_or_default().to_string();

    let error = if status.is_failure() {
        extract_error(result.status_details.as_ref())
    } else {
        None
    };

    TestRecord {
        name,
        full_name,
        status,
        start_ms: start as i64,
        duration_ms,
        suite,
        file,
        error,
        steps_count: count_steps(&result.steps),
    }
}

/// Status message, else the head of the trace.
fn extract_error(details: Option<&AllureStatusDetails>) -> Option<String> {
    let details = details?;

    if let Some(message) = details.message.as_deref().filter(|m| !m.is_empty()) {
        return Some(message.to_string());
    }

    details
        .trace
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().take(MAX_TRACE_CHARS).collect())
}

/// Count steps recursively, nested steps included.
pub fn count_steps(steps: &[AllureStep]) -> usize {
    steps.len() + steps.iter().map(|s| count_steps(&s.steps)).sum::<usize>()
}

/// Read `environment.properties` from the results directory, if present.
pub fn load_environment(results_dir: &Path) -> Option<RunEnvironment> {
    let path = results_dir.join(ENVIRONMENT_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return None,
    };

    let environment = parse_properties(&content);
    if environment.is_empty() {
        None
    } else {
        Some(environment)
    }
}

/// Parse Java-style `key=value` properties, keeping file order.
pub fn parse_properties(content: &str) -> RunEnvironment {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
            let key = key.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.trim().to_string()))
            }
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAILED_RESULT: &str = r#"{
        "name": "should create a note",
        "fullName": "notes.spec.ts#Notes should create a note",
        "status": "failed",
        "start": 1700000000000,
        "stop": 1700000002500,
        "labels": [
            {"name": "suite", "value": "Notes"},
            {"name": "parentSuite", "value": "chromium"},
            {"name": "package", "value": "tests/notes.spec.ts"}
        ],
        "statusDetails": {"message": "expect(received).toBe(expected)", "trace": "at notes.spec.ts:12"},
        "steps": [
            {"name": "open page", "steps": [{"name": "goto", "steps": []}]},
            {"name": "click", "steps": []}
        ]
    }"#;

    #[test]
    fn test_parse_failed_result() {
        let record = parse_result_str(FAILED_RESULT).unwrap();
        assert_eq!(record.name, "should create a note");
        assert_eq!(record.full_name, "notes.spec.ts#Notes should create a note");
        assert_eq!(record.status, TestStatus::Failed);
        assert_eq!(record.duration_ms, 2500);
        assert_eq!(record.suite, "chromium");
        assert_eq!(record.file, "tests/notes.spec.ts");
        assert_eq!(
            record.error.as_deref(),
            Some("expect(received).toBe(expected)")
        );
        assert_eq!(record.steps_count, 3);
    }

    #[test]
    fn test_defaults_for_sparse_document() {
        let record = parse_result_str("{}").unwrap();
        assert_eq!(record.name, "Unknown test");
        assert_eq!(record.full_name, "Unknown test");
        assert_eq!(record.status, TestStatus::Unknown);
        assert_eq!(record.duration_ms, 0);
        assert_eq!(record.suite, "");
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_negative_duration_is_floored_at_zero() {
        let record =
            parse_result_str(r#"{"name": "t", "status": "passed", "start": 5000, "stop": 4000}"#)
                .unwrap();
        assert_eq!(record.duration_ms, 0);
    }

    #[test]
    fn test_suite_label_used_without_parent_suite() {
        let record = parse_result_str(
            r#"{"name": "t", "status": "passed", "labels": [{"name": "suite", "value": "Login"}]}"#,
        )
        .unwrap();
        assert_eq!(record.suite, "Login");
    }

    #[test]
    fn test_broken_result_falls_back_to_truncated_trace() {
        let trace = "x".repeat(800);
        let doc = format!(
            r#"{{"name": "t", "status": "broken", "statusDetails": {{"message": "", "trace": "{}"}}}}"#,
            trace
        );
        let record = parse_result_str(&doc).unwrap();
        assert_eq!(record.error.map(|e| e.len()), Some(500));
    }

    #[test]
    fn test_passed_result_has_no_error() {
        let record = parse_result_str(
            r#"{"name": "t", "status": "passed", "statusDetails": {"message": "flaky retry"}}"#,
        )
        .unwrap();
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_malformed_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a-result.json");
        let bad = dir.path().join("b-result.json");
        std::fs::write(&good, FAILED_RESULT).unwrap();
        std::fs::write(&bad, "{ not json").unwrap();

        let records = parse_result_files(&find_result_files(dir.path()));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "should create a note");
    }

    #[test]
    fn test_parse_properties() {
        let env = parse_properties("# comment\nBrowser=chromium\n\nBase.URL = http://localhost:3000\n! other\n=orphan\n");
        assert_eq!(
            env,
            vec![
                ("Browser".to_string(), "chromium".to_string()),
                ("Base.URL".to_string(), "http://localhost:3000".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_environment_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_environment(dir.path()), None);
    }
}
