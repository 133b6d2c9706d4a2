//! `tracing` subscriber setup for the binary.
//!
//! Filter directives come from `EMBER_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_DIRECTIVE`]. Events go to stderr so stdout carries only the
//! run summary.

use std::env;

use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`.
pub const ENV_VAR: &str = "EMBER_LOG";

/// Directive used when neither variable is set or parses.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Build the filter from the given directive sources, first valid one wins.
pub fn resolve_filter(ember_log: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    [ember_log, rust_log]
        .into_iter()
        .flatten()
        .filter(|d| !d.trim().is_empty())
        .find_map(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    let ember_log = env::var(ENV_VAR).ok();
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(ember_log.as_deref(), rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ember_log_takes_precedence() {
        let filter = resolve_filter(Some("ember_store=debug"), Some("trace"));
        assert_eq!(filter.to_string(), "ember_store=debug");
    }

    #[test]
    fn falls_back_to_rust_log_then_default() {
        assert_eq!(resolve_filter(None, Some("info")).to_string(), "info");
        assert_eq!(resolve_filter(Some("  "), None).to_string(), "warn");
        assert_eq!(resolve_filter(None, None).to_string(), "warn");
    }
}
