//! Configuration loaded from a dotenv-style file with process-environment fallback.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::{info, warn};

/// HTTP header carrying the API token during fuzz runs.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Default values used when neither the env file nor the environment set a key.
pub mod defaults {
    pub const MAX_EXAMPLES: u32 = 50;
    pub const OPENAPI_FILE: &str = "openapi.json";
    pub const PLAYWRIGHT_RESULTS_DIR: &str = "allure-results";
    pub const SCHEMATHESIS_DIR: &str = "schemathesis";
    pub const LLM_MODEL_PATH: &str = "models/Qwen2.5-0.5B-Instruct-Q4_0.gguf";
    pub const LLAMA_CLI_BIN: &str = "llama-cli";
}

/// Target environment selected through `ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string. Anything unrecognised is local.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "dev" | "development" => Self::Development,
            _ => Self::Local,
        }
    }

    /// Read `ENV` from the process environment (default: local).
    pub fn from_env() -> Self {
        env::var("ENV")
            .map(|v| Self::parse(&v))
            .unwrap_or(Self::Local)
    }

    /// Name of the dotenv file holding this environment's settings.
    pub fn env_file_name(&self) -> &'static str {
        match self {
            Self::Local => ".env",
            Self::Development => ".env.dev",
            Self::Production => ".env.prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Development => write!(f, "dev"),
            Self::Production => write!(f, "prod"),
        }
    }
}

/// Root of the e2e tree: `E2E_DIR`, else the current directory.
pub fn e2e_root() -> PathBuf {
    env::var("E2E_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default locations inside the e2e tree.
pub mod paths {
    use std::path::{Path, PathBuf};

    use super::defaults;

    pub fn openapi_file(root: &Path) -> PathBuf {
        root.join(defaults::OPENAPI_FILE)
    }

    pub fn playwright_results(root: &Path) -> PathBuf {
        root.join(defaults::PLAYWRIGHT_RESULTS_DIR)
    }

    pub fn schemathesis_results(root: &Path) -> PathBuf {
        root.join(defaults::SCHEMATHESIS_DIR).join("allure-results")
    }

    pub fn schemathesis_report(root: &Path) -> PathBuf {
        root.join(defaults::SCHEMATHESIS_DIR).join("allure-report")
    }
}

/// Key/value pairs read from a dotenv-style file.
///
/// Lookups prefer the file's values and fall back to the process
/// environment. The process environment itself is never modified.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    path: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Load the env file for `environment` from the e2e root.
    pub fn for_environment(root: &Path, environment: Environment) -> Self {
        info!("Environment: {}", environment);
        Self::load(&root.join(environment.env_file_name()))
    }

    /// Load `KEY=VALUE` pairs from `path`.
    ///
    /// A missing file yields an empty mapping; callers then fall back to the
    /// process environment. Malformed lines are skipped.
    pub fn load(path: &Path) -> Self {
        let mut vars = HashMap::new();

        if !path.exists() {
            warn!(
                "{} not found, using system environment variables",
                path.display()
            );
            return Self {
                path: None,
                vars,
            };
        }

        info!("Loading environment from: {}", path.display());

        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    match item {
                        Ok((key, value)) => {
                            vars.insert(key, value);
                        }
                        Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
                    }
                }
            }
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }

        Self {
            path: Some(path.to_path_buf()),
            vars,
        }
    }

    /// Build from an in-memory mapping.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { path: None, vars }
    }

    /// Path the values were read from, if the file existed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of keys read from the file.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Look up a key: file value first, then process environment.
    /// Empty values are treated as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .or_else(|| env::var(key).ok().filter(|v| !v.is_empty()))
    }
}

/// Settings for an authenticated Schemathesis run.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// API base URL
    pub base_url: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: SecretString,
    /// OpenAPI document handed to Schemathesis
    pub openapi_file: PathBuf,
    /// Maximum generated examples per endpoint
    pub max_examples: u32,
    /// Directory receiving the JUnit report
    pub results_dir: PathBuf,
    /// Directory an Allure report would be generated into
    pub report_dir: PathBuf,
}

impl FuzzConfig {
    /// Resolve fuzz-run settings.
    ///
    /// Variables:
    /// - `API_URL`: API base URL - REQUIRED
    /// - `EMAIL` / `PASSWORD`: login credentials - REQUIRED
    /// - `OPENAPI_FILE`: OpenAPI document, relative to the e2e root (default: openapi.json)
    /// - `SCHEMATHESIS_MAX_EXAMPLES`: examples per endpoint (default: 50)
    ///
    /// Every missing item is reported at once.
    pub fn from_env_file(env_file: &EnvFile, root: &Path) -> Result<Self, ConfigError> {
        let base_url = env_file.get("API_URL");
        let email = env_file.get("EMAIL");
        let password = env_file.get("PASSWORD");

        let openapi_file = match env_file.get("OPENAPI_FILE") {
            Some(value) => {
                let path = PathBuf::from(&value);
                if path.is_absolute() {
                    path
                } else {
                    root.join(path)
                }
            }
            None => paths::openapi_file(root),
        };

        let max_examples = match env_file.get("SCHEMATHESIS_MAX_EXAMPLES") {
            Some(value) => value.trim().parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue("SCHEMATHESIS_MAX_EXAMPLES must be a valid number")
            })?,
            None => defaults::MAX_EXAMPLES,
        };

        let mut errors = Vec::new();
        if base_url.is_none() {
            errors.push("API_URL not set".to_string());
        }
        if email.is_none() {
            errors.push("EMAIL not set".to_string());
        }
        if password.is_none() {
            errors.push("PASSWORD not set".to_string());
        }
        if !openapi_file.exists() {
            errors.push(format!("OpenAPI file not found: {}", openapi_file.display()));
        }

        match (base_url, email, password) {
            (Some(base_url), Some(email), Some(password)) if errors.is_empty() => Ok(FuzzConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                email,
                password: SecretString::from(password),
                openapi_file,
                max_examples,
                results_dir: paths::schemathesis_results(root),
                report_dir: paths::schemathesis_report(root),
            }),
            _ => Err(ConfigError::Validation(errors)),
        }
    }
}

/// Where the local language model lives and how to reach it.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// GGUF model file (`LLM_MODEL_PATH`)
    pub model_path: PathBuf,
    /// llama.cpp server base URL (`LLM_SERVER_URL`), preferred when set
    pub server_url: Option<String>,
    /// llama.cpp CLI executable (`LLAMA_CLI_BIN`)
    pub cli_binary: String,
}

impl LlmSettings {
    /// Resolve model settings from an env file with process fallback.
    pub fn from_env_file(env_file: &EnvFile) -> Self {
        Self {
            model_path: env_file
                .get("LLM_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(defaults::LLM_MODEL_PATH)),
            server_url: env_file.get("LLM_SERVER_URL"),
            cli_binary: env_file
                .get("LLAMA_CLI_BIN")
                .unwrap_or_else(|| defaults::LLAMA_CLI_BIN.to_string()),
        }
    }

    /// Anchor a relative model path at the e2e root.
    pub fn with_root(mut self, root: &Path) -> Self {
        if self.model_path.is_relative() {
            self.model_path = root.join(&self.model_path);
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Configuration errors:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}
