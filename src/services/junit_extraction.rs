//! JUnit XML extraction for Schemathesis reports.
//!
//! Schemathesis writes one `testcase` per operation; failing operations carry a
//! `failure` element whose message lists the failed checks as `- ` bullets,
//! often followed by a full HTML response body and a curl reproduction line.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{JunitFailure, JunitSummary};
use crate::services::results_dir;

/// File-name pattern of Schemathesis JUnit reports.
pub const JUNIT_FILE_PATTERN: &str = "junit*.xml";

const MAX_SUMMARY_CATEGORIES: usize = 3;
const MAX_FALLBACK_SUMMARY_CHARS: usize = 100;

static TRUNCATED_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)`<!doctype html>.*?// Output truncated\.\.\.`").expect("valid regex")
});
static HTML_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)`<!doctype html>.*?`").expect("valid regex"));
static CURL_REPRODUCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Reproduce with:\s*\n\s*curl[^\n]+").expect("valid regex"));
static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- (.+)$").expect("valid regex"));

/// Find all JUnit XML files in a results directory.
pub fn find_junit_files(results_dir: &Path) -> Vec<PathBuf> {
    results_dir::find_files(results_dir, JUNIT_FILE_PATTERN)
}

/// Make a raw failure message compact: unescape HTML entities, replace
/// embedded HTML bodies with placeholders, drop curl reproduction lines.
pub fn clean_failure_message(raw_message: &str) -> String {
    let msg = html_escape::decode_html_entities(raw_message);
    let msg = TRUNCATED_HTML.replace_all(&msg, "[HTML response truncated]");
    let msg = HTML_BODY.replace_all(&msg, "[HTML response]");
    let msg = CURL_REPRODUCE.replace_all(&msg, "");
    let msg = EXTRA_NEWLINES.replace_all(&msg, "\n\n");
    msg.trim().to_string()
}

/// One-line summary of a failure message.
///
/// Uses up to three `- ` bullet lines (the failed checks); otherwise the first
/// meaningful line.
pub fn extract_failure_summary(raw_message: &str) -> String {
    let categories: Vec<&str> = BULLET_LINE
        .captures_iter(raw_message)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('\r'))
        .take(MAX_SUMMARY_CATEGORIES)
        .collect();
    if !categories.is_empty() {
        return categories.join("; ");
    }

    raw_message
        .split('\n')
        .filter(|line| !line.starts_with("Reproduce"))
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_FALLBACK_SUMMARY_CHARS).collect())
        .unwrap_or_else(|| "Unknown failure".to_string())
}

/// Parse a JUnit document into totals and failures.
///
/// Totals come from the root element (`testsuites` or `testsuite`) attributes;
/// failures from every `testcase` that has a `failure` child.
pub fn parse_junit_str(xml: &str) -> AppResult<JunitSummary> {
    let mut reader = Reader::from_str(xml);
    let mut summary = JunitSummary::default();
    let mut seen_root = false;
    let mut depth = 0usize;

    // Name of the testcase we are inside, if any
    let mut current_case: Option<String> = None;
    // `message` attribute and accumulated text of the failure being read
    let mut failure: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if !seen_root {
                    seen_root = true;
                    read_root_totals(&e, &mut summary)?;
                }
                match e.name().as_ref() {
                    b"testcase" => current_case = Some(case_name(&e)?),
                    b"failure" if current_case.is_some() => {
                        let message = attribute(&e, b"message")?.unwrap_or_default();
                        failure = Some((message, String::new()));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if !seen_root {
                    seen_root = true;
                    read_root_totals(&e, &mut summary)?;
                }
                if e.name().as_ref() == b"failure"
                    && let Some(endpoint) = current_case.take()
                {
                    // Only the first failure of a testcase counts
                    let message = attribute(&e, b"message")?.unwrap_or_default();
                    summary.failures.push(build_failure(&endpoint, &message));
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = failure.as_mut() {
                    let decoded = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    text.push_str(&decoded);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = failure.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"failure" => {
                        if let (Some(endpoint), Some((message, text))) =
                            (current_case.take(), failure.take())
                        {
                            let raw = if message.is_empty() { text } else { message };
                            summary.failures.push(build_failure(&endpoint, &raw));
                        }
                    }
                    b"testcase" => current_case = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(AppError::InvalidInput(
            "JUnit document has no root element".to_string(),
        ));
    }
    if depth > 0 {
        return Err(AppError::InvalidInput(
            "JUnit document ended before its root element was closed".to_string(),
        ));
    }

    Ok(summary)
}

/// Parse one JUnit file.
pub fn parse_junit_file(path: &Path) -> AppResult<JunitSummary> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::parse(path, format!("failed to read file: {}", e)))?;
    parse_junit_str(&content).map_err(|e| AppError::parse(path, e))
}

/// Parse and merge every file, skipping (and logging) the ones that fail.
pub fn parse_junit_files(files: &[PathBuf]) -> JunitSummary {
    let mut merged = JunitSummary::default();

    for file in files {
        info!("Parsing: {}", file.display());
        match parse_junit_file(file) {
            Ok(summary) => merged.merge(summary),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    merged
}

fn build_failure(endpoint: &str, raw_message: &str) -> JunitFailure {
    JunitFailure {
        endpoint: endpoint.to_string(),
        summary: extract_failure_summary(raw_message),
        details: clean_failure_message(raw_message),
    }
}

fn case_name(e: &BytesStart<'_>) -> AppResult<String> {
    Ok(attribute(e, b"name")?.unwrap_or_else(|| "Unknown endpoint".to_string()))
}

fn read_root_totals(e: &BytesStart<'_>, summary: &mut JunitSummary) -> AppResult<()> {
    summary.total_tests = attribute(e, b"tests")?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    summary.total_failures = attribute(e, b"failures")?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> AppResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| AppError::InvalidInput(format!("bad attribute: {}", err)))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            return Ok(Some(value));
        }
    }
    Ok(None)
}
