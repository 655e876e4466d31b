//! Authenticated Schemathesis fuzz run.
//!
//! Reads `API_URL`, `EMAIL`, `PASSWORD` (and optionally `OPENAPI_FILE`,
//! `SCHEMATHESIS_MAX_EXAMPLES`) from the env file selected by `ENV`, logs in,
//! then runs Schemathesis with the token and a JUnit report.
//!
//! Usage:
//!   run-schemathesis
//!   run-schemathesis -- --workers 4

use std::process::ExitCode;

use clap::Parser;
use secrecy::SecretString;
use tracing::error;

use e2e_tools::config::{self, EnvFile, Environment, FuzzConfig};
use e2e_tools::logging;
use e2e_tools::services::auth::AuthClient;
use e2e_tools::services::schemathesis_runner::{SchemathesisRun, list_results, next_steps};

const RULE_WIDTH: usize = 70;

#[derive(Parser)]
#[command(name = "run-schemathesis")]
#[command(version)]
#[command(about = "Run Schemathesis against the API with an authenticated session")]
struct Cli {
    /// Extra arguments passed through to Schemathesis
    #[arg(last = true, value_name = "SCHEMATHESIS_ARGS")]
    extra_args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("info");

    let rule = "=".repeat(RULE_WIDTH);
    println!("{rule}\n🔬 Schemathesis API Fuzz Testing with Authentication\n{rule}");

    let root = config::e2e_root();
    let env_file = EnvFile::for_environment(&root, Environment::from_env());
    let config = match FuzzConfig::from_env_file(&env_file, &root) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            error!("Please set these in the e2e .env file or as environment variables.");
            return ExitCode::FAILURE;
        }
    };

    println!("\n📋 Configuration:");
    println!("   Base URL:     {}", config.base_url);
    println!("   Email:        {}", config.email);
    println!("   OpenAPI:      {}", config.openapi_file.display());
    println!("   Results Dir:  {}", config.results_dir.display());
    println!("   Max Examples: {}", config.max_examples);

    let token = match login(&config).await {
        Ok(token) => token,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("✅ Authentication successful");

    let run = SchemathesisRun::new(&config, token).extra_args(cli.extra_args);
    println!("\n🧪 Running Schemathesis...");
    println!("   Command: {}\n", run.display_command());
    println!("{rule}");

    let exit_code = match run.execute().await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("{rule}");

    match list_results(run.results_dir()) {
        Ok(files) if files.is_empty() => {
            println!("\n⚠️  Results directory is empty: {}", run.results_dir().display());
        }
        Ok(files) => {
            println!("\n📁 Results in {}:", run.results_dir().display());
            for file in files {
                println!("   - {} ({} bytes)", file.name, file.size);
            }
        }
        Err(e) => println!("\n⚠️  Could not list {}: {}", run.results_dir().display(), e),
    }

    println!("\n{rule}");
    if exit_code == 0 {
        println!("✅ Schemathesis tests completed successfully");
    } else {
        println!("⚠️  Schemathesis tests completed with exit code {}", exit_code);
        println!("   (Non-zero exit code indicates API issues were found)");
    }
    println!("{rule}");
    println!("\n{}", next_steps(&config.results_dir, &config.report_dir));

    ExitCode::from(u8::try_from(exit_code).unwrap_or(1))
}

async fn login(config: &FuzzConfig) -> e2e_tools::error::AppResult<SecretString> {
    let client = AuthClient::new(&config.base_url)?;
    Ok(client.login(&config.email, &config.password).await?)
}
