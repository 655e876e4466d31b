//! API E2E test suite.
//!
//! Exercises the login client and the llama-server backend against an
//! in-process mock server. No external services needed.
//!
//! Run with: cargo test --test api_e2e

mod mock_api_server;

mod test_login;
mod test_llama_server;
