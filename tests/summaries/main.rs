//! Summary pipeline test suite.
//!
//! Feeds fixture result files through parsing, aggregation and rendering,
//! and runs the summarizer binaries against them.
//!
//! Run with: cargo test --test summaries

mod fixtures;

mod test_cli;
mod test_playwright;
mod test_schemathesis;
