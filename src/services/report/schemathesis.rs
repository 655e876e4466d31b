//! Schemathesis API fuzzing summary.

use std::fmt::Write;

use super::{AI_INSIGHTS_HEADING, numbered_list};
use crate::models::{CategoryBucket, FailureCategory, JunitSummary};
use crate::services::aggregation::{bucket, categorize_failures};
use crate::services::openapi::OpenApiIndex;

pub const REPORT_TITLE: &str = "## 🔬 Schemathesis API Test Summary";
pub const BANNER_TITLE: &str = "📊 SCHEMATHESIS RESULTS SUMMARY";

pub const MODEL_DISCLAIMER: &str = "> ⚠️ **Disclaimer:** AI insights are generated by a small 0.5B parameter model and may occasionally be shallow or imprecise. Always verify recommendations against actual test results.";

const MAX_SUMMARY_ENDPOINTS: usize = 5;
const MAX_AFFECTED_ENDPOINTS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 10;

/// Inputs for one Schemathesis report.
#[derive(Debug, Clone)]
pub struct SchemathesisReport<'a> {
    summary: &'a JunitSummary,
    openapi: Option<&'a OpenApiIndex>,
    insights: Option<&'a str>,
}

impl<'a> SchemathesisReport<'a> {
    pub fn new(summary: &'a JunitSummary) -> Self {
        Self {
            summary,
            openapi: None,
            insights: None,
        }
    }

    pub fn openapi(mut self, openapi: Option<&'a OpenApiIndex>) -> Self {
        self.openapi = openapi.filter(|index| !index.is_empty());
        self
    }

    pub fn insights(mut self, insights: Option<&'a str>) -> Self {
        self.insights = insights.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn render(&self) -> String {
        let buckets = categorize_failures(&self.summary.failures);
        let mut out = String::new();

        let _ = writeln!(out, "{}\n", REPORT_TITLE);
        out.push_str(&summary_section(self.summary, &buckets, self.openapi));
        out.push('\n');

        let _ = writeln!(
            out,
            "## 🔧 Recommendations\n\n{}\n",
            numbered_list(&recommendations(&buckets, self.openapi), MAX_RECOMMENDATIONS)
        );

        if let Some(insights) = self.insights {
            let _ = writeln!(
                out,
                "{}\n\n{}\n\n{}\n",
                AI_INSIGHTS_HEADING,
                insights.trim(),
                MODEL_DISCLAIMER
            );
        }

        out
    }
}

/// Render a full report with no OpenAPI context and no insights.
pub fn render_schemathesis_report(summary: &JunitSummary) -> String {
    SchemathesisReport::new(summary).render()
}

/// CI output when every test passed.
pub fn render_schemathesis_all_passed(total_tests: u64) -> String {
    format!(
        "{}\n\n✅ **All {} tests passed!** No failures detected.",
        REPORT_TITLE, total_tests
    )
}

fn summary_section(
    summary: &JunitSummary,
    buckets: &[CategoryBucket],
    openapi: Option<&OpenApiIndex>,
) -> String {
    let mut out = String::from("## Summary\n");
    let _ = writeln!(
        out,
        "- **{} failures** across {} tests\n",
        summary.total_failures, summary.total_tests
    );

    for bucket in buckets {
        let endpoints = bucket.unique_endpoints();
        let mut listed = endpoints
            .iter()
            .take(MAX_SUMMARY_ENDPOINTS)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if endpoints.len() > MAX_SUMMARY_ENDPOINTS {
            let _ = write!(listed, " (+{} more)", endpoints.len() - MAX_SUMMARY_ENDPOINTS);
        }
        let _ = writeln!(out, "- **{}:** {}", bucket.category.label(), listed);
    }

    if let Some(index) = openapi {
        out.push_str("\n## OpenAPI Spec\n");
        let _ = writeln!(out, "- **{} paths** defined in spec", index.path_count());
        let methods = index
            .method_counts()
            .into_iter()
            .map(|(method, count)| format!("{}: {}", method, count))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "- **Methods:** {}", methods);

        let undocumented =
            index.undocumented(summary.failures.iter().map(|f| f.endpoint.as_str()));
        if !undocumented.is_empty() {
            let _ = writeln!(
                out,
                "- **Failing endpoints not in spec:** {}",
                undocumented.len()
            );
        }
    }

    out
}

/// `Affected: a, b, c...` for the first few endpoints of a bucket.
fn affected(bucket: &CategoryBucket) -> String {
    let endpoints = bucket.unique_endpoints();
    let listed = endpoints
        .iter()
        .take(MAX_AFFECTED_ENDPOINTS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let more = if bucket.len() > MAX_AFFECTED_ENDPOINTS {
        "..."
    } else {
        ""
    };
    format!("Affected: {}{}", listed, more)
}

/// Deterministic recommendations driven by the failure categories present.
pub fn recommendations(buckets: &[CategoryBucket], openapi: Option<&OpenApiIndex>) -> Vec<String> {
    let mut recs = Vec::new();

    if let Some(b) = bucket(buckets, FailureCategory::MissingAllowHeader) {
        recs.push(format!(
            "Add `Allow` header to all 405 responses listing supported methods (RFC 9110 requirement). {}",
            affected(b)
        ));
        recs.push(
            "Configure your web server/framework (e.g., FastAPI, nginx) to automatically include `Allow` header on 405 responses."
                .to_string(),
        );
    }

    if let Some(b) = bucket(buckets, FailureCategory::WrongStatusCode) {
        recs.push(format!(
            "Return HTTP 405 (Method Not Allowed) instead of 404 for unsupported methods. {}",
            affected(b)
        ));
        recs.push(
            "Add a catch-all route handler that returns 405 for undefined methods on existing paths."
                .to_string(),
        );
        if let Some(index) = openapi {
            recs.push(format!(
                "Cross-check your router configuration against the OpenAPI spec ({} paths defined).",
                index.path_count()
            ));
        }
    }

    if bucket(buckets, FailureCategory::MissingHeaderNotRejected).is_some() {
        recs.push(
            "Return HTTP 406 (Not Acceptable) when required Accept/Content-Type headers are missing."
                .to_string(),
        );
        recs.push("Add middleware to validate required headers before processing requests.".to_string());
    }

    if bucket(buckets, FailureCategory::SchemaCompliantRejected).is_some() {
        recs.push(
            "Review request validation logic - schema-compliant requests should not be rejected."
                .to_string(),
        );
        recs.push("Ensure OpenAPI schema matches actual API validation rules.".to_string());
    }

    if openapi.is_some() {
        recs.push(
            "Update OpenAPI spec to document all supported methods per endpoint, or update API to match spec."
                .to_string(),
        );
    }

    recs.push(
        "Add integration tests that verify correct HTTP status codes for unsupported methods."
            .to_string(),
    );

    recs
}
