//! Playwright results: Allure JSON to markdown.

use e2e_tools::services::aggregation::aggregate_results;
use e2e_tools::services::allure_extraction::{find_result_files, load_environment, parse_result_files};
use e2e_tools::services::report::{PlaywrightReport, render_playwright_report};
use e2e_tools::services::results_dir::find_latest_run;

use super::fixtures::{RUN_START_MS, write_allure_result, write_file, write_reference_run};

#[test]
fn test_reference_run_statistics() {
    let dir = tempfile::tempdir().unwrap();
    write_reference_run(dir.path());

    let records = parse_result_files(&find_result_files(dir.path()));
    let stats = aggregate_results(&records);

    assert_eq!(stats.total, 10);
    assert_eq!(stats.passed, 7);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.pass_rate, 70.0);
    assert_eq!(stats.total_duration_ms, 5000);
    assert_eq!(stats.avg_duration_ms, 500);
    assert_eq!(
        stats.started_at.map(|t| t.timestamp_millis()),
        Some(RUN_START_MS)
    );

    let report = render_playwright_report(&stats);
    assert!(report.contains("### ❌ **TESTS FAILED**"));
    assert!(report.contains("**2. ❌ logs in**"));
    assert!(report.contains("- 💬 Error: Error: logs in failed expected visible"));
    assert!(report.contains("### 📦 Test Suites"));
    assert!(report.contains("- **Started:** 2023-11-14 22:13:20 UTC"));
}

#[test]
fn test_malformed_file_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    write_reference_run(dir.path());
    write_file(dir.path(), "zzzz-result.json", "{\"name\": ");

    let files = find_result_files(dir.path());
    assert_eq!(files.len(), 11);
    assert_eq!(parse_result_files(&files).len(), 10);
}

#[test]
fn test_latest_run_and_environment() {
    let base = tempfile::tempdir().unwrap();
    let old = base.path().join("run-2025-01-01T00-00-00");
    let new = base.path().join("run-2025-06-01T00-00-00");
    std::fs::create_dir_all(&old).unwrap();
    std::fs::create_dir_all(&new).unwrap();
    write_allure_result(&old, 0, "stale", "failed", "Old", 10);
    write_allure_result(&new, 0, "fresh", "passed", "New", 10);
    write_file(&new, "environment.properties", "Browser=firefox\nBase URL=http://localhost:5173\n");

    let results = find_latest_run(base.path());
    assert_eq!(results, new);

    let stats = aggregate_results(&parse_result_files(&find_result_files(&results)));
    let environment = load_environment(&results);
    let report = PlaywrightReport::new(&stats)
        .environment(environment.as_deref())
        .render();

    assert!(report.contains("### ✅ **ALL TESTS PASSED**"));
    assert!(report.contains("| Browser | firefox |"));
    assert!(report.contains("| Base URL | http://localhost:5173 |"));
    assert!(report.contains("1. All tests passing - consider adding more edge case coverage."));
}
