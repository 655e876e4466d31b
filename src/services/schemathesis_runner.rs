//! Invocation of the Schemathesis CLI against the API under test.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{AUTH_TOKEN_HEADER, FuzzConfig};
use crate::error::{AppError, AppResult};

/// Executable invoked for a run.
pub const SCHEMATHESIS_BIN: &str = "schemathesis";

/// Environment variable pointing Schemathesis plugins at the results folder.
pub const ALLURE_RESULTS_ENV: &str = "ALLURE_RESULTS_DIR";

const REDACTED: &str = "***";

/// One Schemathesis invocation.
#[derive(Debug, Clone)]
pub struct SchemathesisRun {
    program: String,
    openapi_file: PathBuf,
    base_url: String,
    token: SecretString,
    results_dir: PathBuf,
    max_examples: u32,
    extra_args: Vec<String>,
}

impl SchemathesisRun {
    pub fn new(config: &FuzzConfig, token: SecretString) -> Self {
        Self {
            program: SCHEMATHESIS_BIN.to_string(),
            openapi_file: config.openapi_file.clone(),
            base_url: config.base_url.clone(),
            token,
            results_dir: config.results_dir.clone(),
            max_examples: config.max_examples,
            extra_args: Vec::new(),
        }
    }

    /// Arguments appended after the fixed flags.
    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Use a different executable (a wrapper script, a venv path).
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    fn header_arg(&self, token: &str) -> String {
        format!("{}:{}", AUTH_TOKEN_HEADER, token)
    }

    fn args_with_token(&self, token: &str) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            self.openapi_file.display().to_string(),
            "-u".to_string(),
            self.base_url.clone(),
            "-H".to_string(),
            self.header_arg(token),
            "--report".to_string(),
            "junit".to_string(),
            "--report-dir".to_string(),
            self.results_dir.display().to_string(),
            "--checks".to_string(),
            "all".to_string(),
            "-n".to_string(),
            self.max_examples.to_string(),
            "--continue-on-failure".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Arguments passed to the executable, token included.
    pub fn command_args(&self) -> Vec<String> {
        self.args_with_token(self.token.expose_secret())
    }

    /// Printable command line with the token masked.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args_with_token(REDACTED));
        parts.join(" ")
    }

    /// Delete and recreate the results directory.
    pub fn reset_results_dir(&self) -> AppResult<()> {
        if self.results_dir.exists() {
            std::fs::remove_dir_all(&self.results_dir)?;
        }
        std::fs::create_dir_all(&self.results_dir)?;
        Ok(())
    }

    /// Run Schemathesis to completion and return its exit code.
    ///
    /// Output is passed through to the terminal.
    pub async fn execute(&self) -> AppResult<i32> {
        self.reset_results_dir()?;
        info!("Running: {}", self.display_command());

        let status = Command::new(&self.program)
            .args(self.command_args())
            .env(ALLURE_RESULTS_ENV, &self.results_dir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| AppError::Process(format!("failed to start {}: {}", self.program, e)))?;

        match status.code() {
            Some(code) => Ok(code),
            None => {
                warn!("{} terminated by signal", self.program);
                Ok(1)
            }
        }
    }
}

/// A file left in the results directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub name: String,
    pub size: u64,
}

/// Files in the results directory, sorted by name.
pub fn list_results(results_dir: &Path) -> AppResult<Vec<ResultFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(results_dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        files.push(ResultFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Allure commands for turning the results into a report.
pub fn next_steps(results_dir: &Path, report_dir: &Path) -> String {
    let results = results_dir.display();
    let report = report_dir.display();
    format!(
        "💡 Next steps:\n   Generate Allure report: allure generate {results} -o {report} --clean\n   View Allure report:     allure open {report}\n   Or serve directly:      allure serve {results}"
    )
}
