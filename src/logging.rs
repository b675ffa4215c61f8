//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered by the RUST_LOG environment
//! variable. Stdout stays clean for command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// RUST_LOG wins when set. Otherwise only warnings are shown, or debug
/// output from this crate when `verbose` is true. Events are printed one per
/// line to stderr.
///
/// # Example RUST_LOG values
/// - `RUST_LOG=debug` - Show resolution and classification decisions
/// - `RUST_LOG=whaletown::doctor=trace` - Trace the orphan check only
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init(verbose: bool) -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .try_init()
        .map_err(|e| crate::WhaletownError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,whaletown=debug"
    } else {
        "warn"
    }
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_helper() {
        init_test();
        init_test();
    }

    #[test]
    fn test_second_init_fails() {
        init_test();
        assert!(init(false).is_err());
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert!(default_directive(true).contains("whaletown=debug"));
    }

    #[test]
    fn test_logging_macros() {
        init_test();
        tracing::debug!(session = "wt-whaletown-witness", "Structured message");
    }
}
