use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{GenerationParams, TextGenerator};
use crate::error::{AppError, AppResult};

/// Upper bound on one CLI generation, model load included.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs a GGUF model through llama.cpp's `llama-cli`.
#[derive(Debug, Clone)]
pub struct LlamaCli {
    binary: String,
    model_path: PathBuf,
}

impl LlamaCli {
    pub fn new(binary: &str, model_path: &Path) -> Self {
        Self {
            binary: binary.to_string(),
            model_path: model_path.to_path_buf(),
        }
    }

    /// Arguments for one non-interactive completion.
    pub fn args(&self, prompt: &str, params: &GenerationParams) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            self.model_path.display().to_string(),
            "-p".to_string(),
            prompt.to_string(),
            "-n".to_string(),
            params.max_tokens.to_string(),
            "-c".to_string(),
            params.n_ctx.to_string(),
            "--temp".to_string(),
            params.temperature.to_string(),
        ];

        if let Some(top_p) = params.top_p {
            args.extend(["--top-p".to_string(), top_p.to_string()]);
        }
        if let Some(top_k) = params.top_k {
            args.extend(["--top-k".to_string(), top_k.to_string()]);
        }
        if let Some(penalty) = params.repeat_penalty {
            args.extend(["--repeat-penalty".to_string(), penalty.to_string()]);
        }

        args.extend(
            ["-no-cnv", "--no-display-prompt", "--no-warmup"]
                .iter()
                .map(|flag| flag.to_string()),
        );
        args
    }
}

#[async_trait]
impl TextGenerator for LlamaCli {
    fn describe(&self) -> String {
        format!("{} ({})", self.binary, self.model_path.display())
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String> {
        debug!("Spawning {} for {} token(s)", self.binary, params.max_tokens);

        let child = Command::new(&self.binary)
            .args(self.args(prompt, params))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Model(format!("failed to start {}: {}", self.binary, e)))?;

        let output = tokio::time::timeout(GENERATION_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                AppError::Model(format!(
                    "{} did not finish within {}s",
                    self.binary,
                    GENERATION_TIMEOUT.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            return Err(AppError::Model(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                last_line.unwrap_or("no output")
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
