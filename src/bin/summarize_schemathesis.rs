//! Summarize Schemathesis JUnit XML results as markdown.
//!
//! Usage:
//!   summarize-schemathesis
//!   summarize-schemathesis --ci
//!   summarize-schemathesis --results ./allure-results --openapi ./openapi.json

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use e2e_tools::config::{self, EnvFile, Environment, LlmSettings, paths};
use e2e_tools::logging;
use e2e_tools::services::insights::{InsightKind, local_insights, schemathesis_prompt};
use e2e_tools::services::junit_extraction::{find_junit_files, parse_junit_files};
use e2e_tools::services::openapi::OpenApiIndex;
use e2e_tools::services::report::{self, SchemathesisReport, schemathesis};
use e2e_tools::services::results_dir;

#[derive(Parser)]
#[command(name = "summarize-schemathesis")]
#[command(version)]
#[command(about = "Summarize Schemathesis JUnit XML results")]
struct Cli {
    /// CI mode: clean markdown output, no LLM, no progress messages
    #[arg(long)]
    ci: bool,

    /// Path to the results directory (default: latest run)
    #[arg(short, long, value_name = "DIR")]
    results: Option<PathBuf>,

    /// Path to the OpenAPI JSON document
    #[arg(short, long, value_name = "FILE")]
    openapi: Option<PathBuf>,

    /// Skip LLM insights
    #[arg(long)]
    no_llm: bool,

    #[arg(hide = true)]
    legacy_results: Option<PathBuf>,

    #[arg(hide = true)]
    legacy_openapi: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::default_level(cli.ci));

    let root = config::e2e_root();
    let results = results_dir::resolve(
        cli.legacy_results.or(cli.results),
        &paths::schemathesis_results(&root),
    );
    let openapi_path = cli
        .legacy_openapi
        .or(cli.openapi)
        .unwrap_or_else(|| paths::openapi_file(&root));

    if !results.exists() {
        error!("Results directory not found: {}", results.display());
        return ExitCode::FAILURE;
    }

    let files = find_junit_files(&results);
    if files.is_empty() {
        error!("No JUnit XML files found in: {}", results.display());
        return ExitCode::FAILURE;
    }
    info!("Found {} JUnit XML file(s) in {}", files.len(), results.display());

    let summary = parse_junit_files(&files);
    info!(
        "Total: {} tests, {} failures",
        summary.total_tests, summary.total_failures
    );

    if summary.failures.is_empty() {
        if cli.ci {
            println!("{}", schemathesis::render_schemathesis_all_passed(summary.total_tests));
        } else {
            println!("No failures found. Nothing to summarize.");
        }
        return ExitCode::SUCCESS;
    }

    let openapi = OpenApiIndex::load(&openapi_path);

    let insights = if cli.ci || cli.no_llm {
        None
    } else {
        let env_file = EnvFile::for_environment(&root, Environment::from_env());
        let settings = LlmSettings::from_env_file(&env_file).with_root(&root);
        local_insights(
            &settings,
            InsightKind::Schemathesis,
            &schemathesis_prompt(&summary.failures),
        )
        .await
    };

    let rendered = SchemathesisReport::new(&summary)
        .openapi(openapi.as_ref())
        .insights(insights.as_deref())
        .render();

    if cli.ci {
        println!("{}", rendered);
    } else {
        println!("{}", report::decorate(schemathesis::BANNER_TITLE, &rendered));
    }

    ExitCode::FAILURE
}
