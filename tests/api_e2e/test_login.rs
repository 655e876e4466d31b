//! E2E tests: login against the API under test.

use e2e_tools::services::auth::{AuthClient, AuthError};
use secrecy::{ExposeSecret, SecretString};

use super::mock_api_server::{ISSUED_TOKEN, LoginBehaviour, MockApi, VALID_EMAIL, VALID_PASSWORD};

async fn login_with(behaviour: LoginBehaviour, password: &str) -> Result<SecretString, AuthError> {
    let mock = MockApi::start(behaviour).await;
    let client = AuthClient::new(&mock.base_url).expect("client should build");
    client
        .login(VALID_EMAIL, &SecretString::from(password.to_string()))
        .await
}

#[actix_rt::test]
async fn test_login_returns_token() {
    let token = login_with(LoginBehaviour::Success, VALID_PASSWORD)
        .await
        .expect("login should succeed");
    assert_eq!(token.expose_secret(), ISSUED_TOKEN);
}

#[actix_rt::test]
async fn test_wrong_password_reports_status_and_body() {
    let err = login_with(LoginBehaviour::Success, "wrong")
        .await
        .unwrap_err();
    match err {
        AuthError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid credentials");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[actix_rt::test]
async fn test_server_error_is_status_error() {
    let err = login_with(LoginBehaviour::ServerError, VALID_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Login failed with status 500: boom");
}

#[actix_rt::test]
async fn test_unsuccessful_login_carries_message() {
    let err = login_with(
        LoginBehaviour::SuccessFalse(Some("Account locked".to_string())),
        VALID_PASSWORD,
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Login failed: Account locked");

    let err = login_with(LoginBehaviour::SuccessFalse(None), VALID_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Login failed: Unknown error");
}

#[actix_rt::test]
async fn test_missing_token_is_rejected() {
    let err = login_with(LoginBehaviour::MissingToken, VALID_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
}

#[actix_rt::test]
async fn test_non_json_body_is_rejected() {
    let err = login_with(LoginBehaviour::NotJson, VALID_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidBody(_)));
}
