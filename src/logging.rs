//! Tracing setup
//!
//! Filter precedence: `--verbose` (debug), then `RUST_LOG`, then the
//! configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for gateway output
///
/// Call early in main() before any logging occurs. Safe to call twice; the
/// second call is a no-op.
pub fn init_tracing(verbose: bool, level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(filter(verbose, level))
        .try_init();
}

fn filter(verbose: bool, level: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_level() {
        assert_eq!(filter(true, "warn").to_string(), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, "info");
        init_tracing(true, "info");
    }
}
