//! Summarize Playwright Allure JSON results as markdown.
//!
//! Usage:
//!   summarize-playwright                    # latest run, with AI insights
//!   summarize-playwright --ci               # clean markdown for CI step summaries
//!   summarize-playwright -r ./allure-results --compact

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use e2e_tools::config::{self, EnvFile, Environment, LlmSettings, paths};
use e2e_tools::logging;
use e2e_tools::services::aggregation::aggregate_results;
use e2e_tools::services::allure_extraction::{find_result_files, load_environment, parse_result_files};
use e2e_tools::services::insights::{InsightKind, local_insights, playwright_prompt};
use e2e_tools::services::report::{self, PlaywrightReport, playwright};
use e2e_tools::services::results_dir;

#[derive(Parser)]
#[command(name = "summarize-playwright")]
#[command(version)]
#[command(about = "Summarize Playwright Allure JSON results")]
struct Cli {
    /// CI mode: clean markdown output, no LLM, no progress messages
    #[arg(long)]
    ci: bool,

    /// Path to the allure-results directory (default: latest run)
    #[arg(short, long, value_name = "DIR")]
    results: Option<PathBuf>,

    /// Skip LLM insights
    #[arg(long)]
    no_llm: bool,

    /// Skip the suites and slowest-tests sections
    #[arg(long)]
    compact: bool,

    #[arg(hide = true)]
    legacy_results: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::default_level(cli.ci));

    let root = config::e2e_root();
    let results = results_dir::resolve(
        cli.legacy_results.or(cli.results),
        &paths::playwright_results(&root),
    );

    if !results.exists() {
        error!("Results directory not found: {}", results.display());
        return ExitCode::FAILURE;
    }

    let files = find_result_files(&results);
    if files.is_empty() {
        if cli.ci {
            println!("{}", playwright::render_notice(playwright::NO_RESULTS_NOTICE));
        } else {
            warn!("No result files found in: {}", results.display());
        }
        return ExitCode::SUCCESS;
    }
    info!("Found {} test result(s) in {}", files.len(), results.display());

    let records = parse_result_files(&files);
    if records.is_empty() {
        if cli.ci {
            println!("{}", playwright::render_notice(playwright::UNPARSEABLE_NOTICE));
        } else {
            warn!("No valid results to summarize");
        }
        return ExitCode::SUCCESS;
    }

    let stats = aggregate_results(&records);
    info!(
        "Total: {} tests, {} passed, {} failed",
        stats.total, stats.passed, stats.failed
    );

    let environment = load_environment(&results);

    let insights = if cli.ci || cli.no_llm {
        None
    } else {
        let env_file = EnvFile::for_environment(&root, Environment::from_env());
        let settings = LlmSettings::from_env_file(&env_file).with_root(&root);
        local_insights(&settings, InsightKind::Playwright, &playwright_prompt(&stats)).await
    };

    let rendered = PlaywrightReport::new(&stats)
        .compact(cli.compact)
        .environment(environment.as_deref())
        .insights(insights.as_deref())
        .render();

    if cli.ci {
        println!("{}", rendered);
    } else {
        println!("{}", report::decorate(playwright::BANNER_TITLE, &rendered));
    }

    if stats.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
