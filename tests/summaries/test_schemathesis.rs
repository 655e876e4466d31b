//! Schemathesis results: JUnit XML to markdown.

use e2e_tools::models::FailureCategory;
use e2e_tools::services::aggregation::categorize_failures;
use e2e_tools::services::junit_extraction::{find_junit_files, parse_junit_files};
use e2e_tools::services::openapi::OpenApiIndex;
use e2e_tools::services::report::SchemathesisReport;

use super::fixtures::{JUNIT_WITH_FAILURES, write_file, write_openapi};

#[test]
fn test_failures_are_categorized() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "junit.xml", JUNIT_WITH_FAILURES);

    let summary = parse_junit_files(&find_junit_files(dir.path()));
    assert_eq!(summary.total_tests, 20);
    assert_eq!(summary.total_failures, 4);
    assert_eq!(summary.failures.len(), 4);

    let schema = summary
        .failures
        .iter()
        .find(|f| f.endpoint == "POST /users")
        .unwrap();
    assert!(schema.details.contains("[HTML response]"));
    assert!(!schema.details.contains("curl"));

    let buckets = categorize_failures(&summary.failures);
    let found: Vec<(FailureCategory, Vec<&str>)> = buckets
        .iter()
        .map(|b| (b.category, b.unique_endpoints()))
        .collect();
    assert_eq!(
        found,
        vec![
            (FailureCategory::MissingHeaderNotRejected, vec!["GET /notes/{note_id}"]),
            (FailureCategory::MissingAllowHeader, vec!["PUT /notes"]),
            (FailureCategory::WrongStatusCode, vec!["PATCH /notes/42"]),
            (FailureCategory::SchemaCompliantRejected, vec!["POST /users"]),
        ]
    );
}

#[test]
fn test_files_are_merged_and_bad_files_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "junit-1.xml", JUNIT_WITH_FAILURES);
    write_file(dir.path(), "junit-2.xml", JUNIT_WITH_FAILURES);
    write_file(dir.path(), "junit-3.xml", "<testsuites><testsuite>");
    write_file(dir.path(), "report.xml", JUNIT_WITH_FAILURES);

    let summary = parse_junit_files(&find_junit_files(dir.path()));
    assert_eq!(summary.total_tests, 40);
    assert_eq!(summary.failures.len(), 8);
}

#[test]
fn test_report_with_openapi_context() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "junit.xml", JUNIT_WITH_FAILURES);
    let openapi = OpenApiIndex::load(&write_openapi(dir.path())).unwrap();

    let summary = parse_junit_files(&find_junit_files(dir.path()));
    let report = SchemathesisReport::new(&summary).openapi(Some(&openapi)).render();

    assert!(report.contains("- **4 failures** across 20 tests"));
    assert!(report.contains("- **2 paths** defined in spec"));
    assert!(report.contains("- **Methods:** DELETE: 1, GET: 2, POST: 1, PUT: 1"));
    assert!(report.contains("- **Failing endpoints not in spec:** 1"));
    assert!(report.contains(
        "1. Add `Allow` header to all 405 responses listing supported methods (RFC 9110 requirement). Affected: PUT /notes"
    ));
    assert!(report.contains("(2 paths defined)"));
    assert!(!report.contains("AI Insights"));
}
