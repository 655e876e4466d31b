//! Login against the API under test to obtain an `x-auth-token`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

/// Total timeout for the login request.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Login endpoint, relative to the API base URL.
const LOGIN_PATH: &str = "/users/login";

/// Authentication failures. Every variant is fatal for the fuzz run.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Login failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid login response: {0}")]
    InvalidBody(String),

    #[error("Login failed: {0}")]
    Rejected(String),

    #[error("No token received from login response")]
    MissingToken,
}

// ============================================================================
// Login Response
// ============================================================================

/// `success` is accepted with any truthy JSON value (`true`, `1`, `"yes"`).
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: Value,
    message: Option<Value>,
    data: Option<LoginData>,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Token from a 200 login response body.
fn parse_login_body(body: &str) -> Result<SecretString, AuthError> {
    let parsed: LoginResponse =
        serde_json::from_str(body).map_err(|e| AuthError::InvalidBody(e.to_string()))?;

    if !is_truthy(&parsed.success) {
        let message = match parsed.message {
            Some(Value::String(m)) if !m.is_empty() => m,
            Some(Value::Null) | Some(Value::String(_)) | None => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        };
        return Err(AuthError::Rejected(message));
    }

    let token = parsed
        .data
        .and_then(|d| d.token)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    Ok(SecretString::from(token))
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: Option<String>,
}

/// Client for the form-encoded login endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    login_url: String,
    http_client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(LOGIN_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        Ok(Self {
            login_url: format!("{}{}", base_url.trim_end_matches('/'), LOGIN_PATH),
            http_client,
        })
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Exchange credentials for a token. A single attempt, no retries.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, AuthError> {
        info!("Authenticating at: {}", self.login_url);

        let response = self
            .http_client
            .post(&self.login_url)
            .form(&[("email", email), ("password", password.expose_secret())])
            .send()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            warn!("Login rejected with HTTP {}", status.as_u16());
            return Err(AuthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token = parse_login_body(&body)?;
        info!("Authentication successful");
        Ok(token)
    }
}
