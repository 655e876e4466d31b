//! Send one prompt to the local model and print the completion.
//!
//! Usage:
//!   run-llm-once '<prompt>'

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use e2e_tools::config::{self, EnvFile, Environment, LlmSettings};
use e2e_tools::logging;
use e2e_tools::services::insights::{GenerationParams, apply_stop_sequences, local_generator};

#[derive(Parser)]
#[command(name = "run-llm-once")]
#[command(version)]
#[command(about = "Run a single prompt through the local language model")]
struct Cli {
    /// Prompt text
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("warn");

    let Some(prompt) = cli.prompt.filter(|p| !p.is_empty()) else {
        eprintln!("Usage: run-llm-once '<prompt>'");
        return ExitCode::FAILURE;
    };

    let root = config::e2e_root();
    let env_file = EnvFile::for_environment(&root, Environment::from_env());
    let settings = LlmSettings::from_env_file(&env_file).with_root(&root);

    let Some(generator) = local_generator(&settings) else {
        error!(
            "No model available: set LLM_SERVER_URL or place a model at {}",
            settings.model_path.display()
        );
        return ExitCode::FAILURE;
    };

    let params = GenerationParams::one_shot();
    match generator.generate(&prompt, &params).await {
        Ok(text) => {
            println!("{}", apply_stop_sequences(&text, &params.stop).trim());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
