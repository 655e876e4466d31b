use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerationParams, TextGenerator};
use crate::error::{AppError, AppResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

// ============================================================================
// llama.cpp `/completion` API
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f32>,
    stop: &'a [String],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Completes prompts through a running `llama-server`.
#[derive(Debug, Clone)]
pub struct LlamaServer {
    base_url: String,
    http_client: reqwest::Client,
}

impl LlamaServer {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn completion_url(&self) -> String {
        format!("{}/completion", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for LlamaServer {
    fn describe(&self) -> String {
        format!("llama-server at {}", self.base_url)
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String> {
        let request = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            repeat_penalty: params.repeat_penalty,
            stop: &params.stop,
            stream: false,
        };
        debug!("POST {}", self.completion_url());

        let response = self
            .http_client
            .post(self.completion_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Model(format!(
                "llama-server returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("invalid completion response: {}", e)))?;

        Ok(completion.content.trim().to_string())
    }
}
