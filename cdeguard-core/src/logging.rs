//! Logging setup for CdeGuard binaries.

use tracing_subscriber::EnvFilter;

use crate::Result;

/// Initializes structured logging for a binary entry point.
///
/// The verbosity flags set the default level (0=INFO, 1=DEBUG, 2+=TRACE;
/// `quiet` forces ERROR), and `RUST_LOG` overrides it when set so a single
/// module can be turned up without drowning the run in TRACE output.
///
/// # Errors
/// Returns a `Configuration` error when a global subscriber is already
/// installed.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| {
            crate::error::CdeGuardError::configuration(format!(
                "Failed to initialize logging: {e}"
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    // A global subscriber can only be installed once per test process, so
    // only the level mapping is checked here.

    #[test]
    fn test_verbosity_mapping() {
        let level = |quiet: bool, verbose: u8| match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };

        assert_eq!(level(true, 3), "error");
        assert_eq!(level(false, 0), "info");
        assert_eq!(level(false, 1), "debug");
        assert_eq!(level(false, 2), "trace");
        assert_eq!(level(false, 10), "trace");
    }
}
