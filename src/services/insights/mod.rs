//! Optional insights from a small local language model.
//!
//! Generation runs through llama.cpp, either a `llama-server` instance or the
//! `llama-cli` executable. Any failure along the way only drops the insights
//! section from the report.

mod llama_cli;
mod llama_server;

pub use llama_cli::LlamaCli;
pub use llama_server::LlamaServer;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use crate::config::LlmSettings;
use crate::error::AppResult;
use crate::models::{JunitFailure, RunStats};
use crate::services::aggregation::format_failures_for_llm;
use crate::services::report::format_duration;

/// Sampling configuration for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Context window in tokens
    pub n_ctx: u32,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repeat_penalty: Option<f32>,
    /// Generation ends at the first occurrence of any of these
    pub stop: Vec<String>,
}

impl GenerationParams {
    pub fn playwright() -> Self {
        Self {
            n_ctx: 4096,
            max_tokens: 300,
            temperature: 0.15,
            top_p: Some(0.9),
            top_k: Some(40),
            repeat_penalty: Some(1.3),
            stop: to_strings(&["===", "---", "Data:", "\n\n\n"]),
        }
    }

    pub fn schemathesis() -> Self {
        Self {
            n_ctx: 8200,
            max_tokens: 230,
            temperature: 0.1,
            top_p: None,
            top_k: None,
            repeat_penalty: Some(0.8),
            stop: to_strings(&["===", "---", "Input:"]),
        }
    }

    /// Loose settings for ad-hoc prompts.
    pub fn one_shot() -> Self {
        Self {
            n_ctx: 256,
            max_tokens: 2056,
            temperature: 2.0,
            top_p: None,
            top_k: None,
            repeat_penalty: None,
            stop: Vec::new(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A backend that completes a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend description for logs.
    fn describe(&self) -> String;

    /// Raw completion text for `prompt`, without the prompt itself.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String>;
}

/// Pick the backend configured for this machine.
///
/// A server URL wins; otherwise the CLI is used when the model file exists.
/// `None` means no model is available.
pub fn local_generator(settings: &LlmSettings) -> Option<Box<dyn TextGenerator>> {
    if let Some(url) = settings.server_url.as_deref() {
        return match LlamaServer::new(url) {
            Ok(server) => Some(Box::new(server)),
            Err(e) => {
                warn!("LLM server unavailable: {}", e);
                None
            }
        };
    }

    if !settings.model_path.is_file() {
        info!(
            "Model file not found at {}, skipping AI insights",
            settings.model_path.display()
        );
        return None;
    }

    Some(Box::new(LlamaCli::new(
        &settings.cli_binary,
        &settings.model_path,
    )))
}

/// Cut `text` at the earliest stop sequence.
pub fn apply_stop_sequences(text: &str, stop: &[String]) -> String {
    let end = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .unwrap_or(text.len());
    text[..end].to_string()
}

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("valid numbered line regex"));

/// Keep only `N.` list items, up to `max_items`.
///
/// Lines starting with one of `echo_prefixes` or containing one of
/// `echo_markers` are echoed prompt text and dropped.
pub fn post_process_numbered(
    text: &str,
    echo_prefixes: &[&str],
    echo_markers: &[&str],
    max_items: usize,
) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !echo_prefixes.iter().any(|p| line.starts_with(p)))
        .filter(|line| !echo_markers.iter().any(|m| line.contains(m)))
        .filter(|line| NUMBERED_LINE.is_match(line))
        .take(max_items)
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Prompts
// ============================================================================

/// Which report the insights are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Playwright,
    Schemathesis,
}

impl InsightKind {
    pub fn params(&self) -> GenerationParams {
        match self {
            Self::Playwright => GenerationParams::playwright(),
            Self::Schemathesis => GenerationParams::schemathesis(),
        }
    }

    /// Prompt markers the model tends to echo back.
    pub fn echo_prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Playwright => &["Data:"],
            Self::Schemathesis => &["Issues:", "Input:"],
        }
    }

    /// Prompt headings the model echoes anywhere in a line.
    pub fn echo_markers(&self) -> &'static [&'static str] {
        match self {
            Self::Playwright => &[],
            Self::Schemathesis => &["## Recommendations", "Recommendations:"],
        }
    }

    pub fn max_items(&self) -> usize {
        match self {
            Self::Playwright => 5,
            Self::Schemathesis => 10,
        }
    }
}

const PLAYWRIGHT_SYSTEM_PROMPT: &str = "You are a QA engineer analyzing Playwright test results.

Generate 3-5 brief, actionable insights based on the test data below.

Rules:
- Output only a numbered list (1., 2., 3., ...).
- Each item must be one sentence.
- Focus on patterns, root causes, and next steps.
- Be specific - mention test names or suites when relevant.
- No repetition, no fluff, no greetings.";

const SCHEMATHESIS_SYSTEM_PROMPT: &str = "You are an expert in HTTP semantics and OpenAPI.

From the issues below, produce 8–10 recommendations that:
- Fix incorrect status codes
- Align behavior with the OpenAPI spec
- Improve validation and error handling

Rules:
- Output only a numbered list (1., 2., 3., 4., 5., …).
- One sentence per item.
- Mention HTTP codes and OpenAPI when relevant.
- No extra commentary, no headings.";

const SCHEMATHESIS_FEW_SHOT: &str = "Example:
Issues: Unsupported methods return 404 instead of 405. Missing headers return 401 instead of 406.
Recommendations:
1. Return HTTP 405 for unsupported HTTP methods.
2. Return HTTP 406 when required headers are missing.
3. Update OpenAPI spec to match actual behavior.";

/// Upper bound on the failure block embedded in the Schemathesis prompt.
pub const MAX_FAILURE_CHARS: usize = 3000;

const MAX_PROMPT_FAILURES: usize = 5;
const MAX_PROMPT_SUITES: usize = 3;

/// Prompt embedding a one-line summary of a Playwright run.
pub fn playwright_prompt(stats: &RunStats) -> String {
    let mut summary = format!(
        "Tests: {} total, {} passed, {} failed, {} skipped. Pass rate: {:.0}%. Duration: {}.",
        stats.total,
        stats.passed,
        stats.failed,
        stats.skipped,
        stats.pass_rate,
        format_duration(stats.total_duration_ms)
    );

    if !stats.failures.is_empty() {
        let names: Vec<&str> = stats
            .failures
            .iter()
            .take(MAX_PROMPT_FAILURES)
            .map(|f| f.name.as_str())
            .collect();
        summary.push_str(&format!(" Failed tests: {}.", names.join(", ")));
    }

    let suites = stats.suites_with_failed();
    if !suites.is_empty() {
        let named: Vec<&str> = suites.into_iter().take(MAX_PROMPT_SUITES).collect();
        summary.push_str(&format!(" Failing suites: {}.", named.join(", ")));
    }

    format!(
        "{}\n\nData: {}\n\nInsights:",
        PLAYWRIGHT_SYSTEM_PROMPT, summary
    )
}

/// Few-shot prompt embedding the categorized failures.
pub fn schemathesis_prompt(failures: &[JunitFailure]) -> String {
    format!(
        "{}\n\n{}\n\nIssues: {}\nRecommendations:",
        SCHEMATHESIS_SYSTEM_PROMPT,
        SCHEMATHESIS_FEW_SHOT,
        format_failures_for_llm(failures, MAX_FAILURE_CHARS)
    )
}

/// Run the model and return the cleaned list, or `None` when there is
/// nothing usable.
pub async fn generate_insights(
    generator: &dyn TextGenerator,
    kind: InsightKind,
    prompt: &str,
) -> Option<String> {
    let params = kind.params();
    info!("Generating insights with {}", generator.describe());

    let raw = match generator.generate(prompt, &params).await {
        Ok(text) => text,
        Err(e) => {
            warn!("AI insights unavailable: {}", e);
            return None;
        }
    };

    let cleaned = post_process_numbered(
        &apply_stop_sequences(raw.trim(), &params.stop),
        kind.echo_prefixes(),
        kind.echo_markers(),
        kind.max_items(),
    );
    if cleaned.is_empty() {
        warn!("Model output contained no numbered items");
        None
    } else {
        Some(cleaned)
    }
}

/// Insights from whichever local backend is configured, if any.
pub async fn local_insights(settings: &LlmSettings, kind: InsightKind, prompt: &str) -> Option<String> {
    let generator = local_generator(settings)?;
    generate_insights(generator.as_ref(), kind, prompt).await
}
