//! E2E report tooling library.
//!
//! Runs authenticated Schemathesis fuzzing and turns Playwright (Allure JSON)
//! and Schemathesis (JUnit XML) results into markdown summaries, optionally
//! with insights from a small local language model.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
