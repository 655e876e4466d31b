//! E2E tests: insights through a llama.cpp server.

use e2e_tools::config::LlmSettings;
use e2e_tools::services::insights::{
    GenerationParams, InsightKind, LlamaServer, TextGenerator, local_insights,
};
use std::path::PathBuf;

use super::mock_api_server::{LoginBehaviour, MockApi};

#[actix_rt::test]
async fn test_completion_request_carries_sampling_params() {
    let mock = MockApi::start(LoginBehaviour::Success).await;
    mock.set_completion("  1. Return 405.\n");

    let server = LlamaServer::new(&mock.base_url).unwrap();
    let text = server
        .generate("Issues: x", &GenerationParams::playwright())
        .await
        .expect("completion should succeed");
    assert_eq!(text, "1. Return 405.");

    let requests = mock.completion_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request["prompt"], "Issues: x");
    assert_eq!(request["n_predict"], 300);
    assert_eq!(request["top_k"], 40);
    assert_eq!(request["stream"], false);
    assert_eq!(request["stop"][2], "Data:");
}

#[actix_rt::test]
async fn test_local_insights_prefers_server_and_cleans_output() {
    let mock = MockApi::start(LoginBehaviour::Success).await;
    mock.set_completion(
        "Recommendations:\n1. Return HTTP 405 for unsupported methods.\nIssues: echoed\n2. Add Allow headers.\n---\n3. cut",
    );

    let settings = LlmSettings {
        model_path: PathBuf::from("/nonexistent/model.gguf"),
        server_url: Some(mock.base_url.clone()),
        cli_binary: "llama-cli".to_string(),
    };
    let insights = local_insights(&settings, InsightKind::Schemathesis, "prompt").await;
    assert_eq!(
        insights.as_deref(),
        Some("1. Return HTTP 405 for unsupported methods.\n2. Add Allow headers.")
    );
}

#[actix_rt::test]
async fn test_unreachable_server_omits_insights() {
    let settings = LlmSettings {
        model_path: PathBuf::from("/nonexistent/model.gguf"),
        server_url: Some("http://127.0.0.1:9".to_string()),
        cli_binary: "llama-cli".to_string(),
    };
    assert_eq!(
        local_insights(&settings, InsightKind::Playwright, "prompt").await,
        None
    );
}
