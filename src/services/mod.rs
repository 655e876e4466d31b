//! Business logic services.

pub mod aggregation;
pub mod allure_extraction;
pub mod auth;
pub mod insights;
pub mod junit_extraction;
pub mod openapi;
pub mod report;
pub mod results_dir;
pub mod schemathesis_runner;

pub use aggregation::{aggregate_results, categorize_failures, format_failures_for_llm};
pub use auth::{AuthClient, AuthError};
pub use insights::{InsightKind, TextGenerator, generate_insights, local_generator};
pub use openapi::OpenApiIndex;
pub use schemathesis_runner::SchemathesisRun;
