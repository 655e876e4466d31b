//! Result fixtures written into temporary directories.

use serde_json::json;
use std::path::{Path, PathBuf};

pub const RUN_START_MS: i64 = 1_700_000_000_000;

/// Write one Allure result document.
pub fn write_allure_result(dir: &Path, id: usize, name: &str, status: &str, suite: &str, duration_ms: i64) {
    let start = RUN_START_MS + id as i64 * 1_000;
    let mut doc = json!({
        "uuid": format!("uuid-{id}"),
        "name": name,
        "fullName": format!("{}.spec.ts#{}", suite.to_lowercase(), name),
        "status": status,
        "start": start,
        "stop": start + duration_ms,
        "labels": [
            {"name": "suite", "value": suite},
            {"name": "package", "value": format!("tests/{}.spec.ts", suite.to_lowercase())}
        ],
        "steps": [{"name": "step", "steps": []}]
    });
    if status == "failed" || status == "broken" {
        doc["statusDetails"] = json!({
            "message": format!("Error: {name} failed\nexpected visible"),
            "trace": "at tests/spec.ts:10:5"
        });
    }
    std::fs::write(
        dir.join(format!("{id:04}-result.json")),
        serde_json::to_vec_pretty(&doc).expect("fixture should serialize"),
    )
    .expect("fixture should be written");
}

/// The reference run: 7 passed, 2 failed, 1 skipped, 500 ms each.
pub fn write_reference_run(dir: &Path) {
    for i in 0..7 {
        write_allure_result(dir, i, &format!("passes case {i}"), "passed", "Notes", 500);
    }
    write_allure_result(dir, 7, "creates a note", "failed", "Notes", 500);
    write_allure_result(dir, 8, "logs in", "failed", "Auth", 500);
    write_allure_result(dir, 9, "exports notes", "skipped", "Notes", 500);
}

pub const JUNIT_WITH_FAILURES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites failures="4" tests="20">
  <testsuite name="schemathesis" failures="4" tests="20">
    <testcase name="GET /notes"/>
    <testcase name="PUT /notes">
      <failure message="- Unsupported methods&#10;&#10;    Missing `Allow` header in 405 response"/>
    </testcase>
    <testcase name="PATCH /notes/42">
      <failure message="- Unsupported methods&#10;&#10;    Expected 405, got 404"/>
    </testcase>
    <testcase name="GET /notes/{note_id}">
      <failure message="- Missing header not rejected; Unsupported methods&#10;&#10;    Expected 406, got 401"/>
    </testcase>
    <testcase name="POST /users">
      <failure>- API rejected schema-compliant request

    `&lt;!doctype html&gt;&lt;body&gt;bad&lt;/body&gt;`

Reproduce with:
    curl -X POST http://localhost:8000/users</failure>
    </testcase>
  </testsuite>
</testsuites>"#;

pub const JUNIT_ALL_PASSED: &str = r#"<testsuites failures="0" tests="3">
  <testsuite name="schemathesis" failures="0" tests="3">
    <testcase name="GET /notes"/>
    <testcase name="POST /notes"/>
    <testcase name="GET /health"/>
  </testsuite>
</testsuites>"#;

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("fixture should be written");
    path
}

pub fn write_openapi(dir: &Path) -> PathBuf {
    let spec = json!({
        "openapi": "3.1.0",
        "info": {"title": "NoteTaker", "version": "1.0.0"},
        "paths": {
            "/notes": {"get": {}, "post": {}},
            "/notes/{note_id}": {"get": {}, "put": {}, "delete": {}}
        }
    });
    write_file(dir, "openapi.json", &spec.to_string())
}
