//! End-to-end runs of the command-line tools.

use std::path::Path;
use std::process::{Command, Output};

use super::fixtures::{JUNIT_ALL_PASSED, JUNIT_WITH_FAILURES, write_file, write_reference_run};

fn run(bin: &str, e2e_dir: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env("E2E_DIR", e2e_dir)
        .env_remove("RUST_LOG")
        .env_remove("ENV")
        .env_remove("LLM_SERVER_URL")
        .output()
        .expect("binary should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn playwright(e2e_dir: &Path, args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_summarize-playwright"), e2e_dir, args)
}

fn schemathesis(e2e_dir: &Path, args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_summarize-schemathesis"), e2e_dir, args)
}

#[test]
fn test_playwright_ci_with_failures() {
    let root = tempfile::tempdir().unwrap();
    let results = root.path().join("results");
    std::fs::create_dir_all(&results).unwrap();
    write_reference_run(&results);

    let output = playwright(root.path(), &["--ci", "-r", results.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("❌ **TESTS FAILED**"));
    assert!(out.contains("| ✅ Passed | 7 |"));
    assert!(!out.contains("AI Insights"));
}

#[test]
fn test_playwright_ci_without_results() {
    let root = tempfile::tempdir().unwrap();
    let results = root.path().join("empty");
    std::fs::create_dir_all(&results).unwrap();

    let output = playwright(root.path(), &["--ci", "-r", results.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No test results found"));
}

#[test]
fn test_playwright_missing_directory() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("nope");

    let output = playwright(root.path(), &["--ci", "-r", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_playwright_positional_results_path() {
    let root = tempfile::tempdir().unwrap();
    let results = root.path().join("results");
    std::fs::create_dir_all(&results).unwrap();
    write_reference_run(&results);

    let output = playwright(root.path(), &["--ci", results.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("| **Total** | **10** | **100%** |"));
}

#[test]
fn test_schemathesis_ci_with_failures() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "junit.xml", JUNIT_WITH_FAILURES);

    let output = schemathesis(root.path(), &["--ci", "-r", root.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("## 🔬 Schemathesis API Test Summary"));
    assert!(out.contains("- **4 failures** across 20 tests"));
    assert!(out.contains("## 🔧 Recommendations"));
}

#[test]
fn test_schemathesis_ci_all_passed() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "junit.xml", JUNIT_ALL_PASSED);

    let output = schemathesis(root.path(), &["--ci", "-r", root.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("✅ **All 3 tests passed!** No failures detected."));
}

#[test]
fn test_schemathesis_without_junit_files() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "report.txt", "not junit");

    let output = schemathesis(root.path(), &["--ci", "-r", root.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_llm_once_requires_prompt() {
    let root = tempfile::tempdir().unwrap();

    let output = run(env!("CARGO_BIN_EXE_run-llm-once"), root.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_fuzz_run_requires_credentials() {
    let root = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_run-schemathesis"))
        .env("E2E_DIR", root.path())
        .env_remove("ENV")
        .env_remove("API_URL")
        .env_remove("EMAIL")
        .env_remove("PASSWORD")
        .output()
        .expect("binary should start");

    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout(&output).contains("Running Schemathesis"));
}
