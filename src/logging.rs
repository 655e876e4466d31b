//! Tracing setup shared by the binaries.
//!
//! Logs go to stderr so stdout carries only the markdown report.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Default level for a binary: quiet in CI, informative otherwise.
pub fn default_level(ci: bool) -> &'static str {
    if ci { "error" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), "error");
        assert_eq!(default_level(false), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
